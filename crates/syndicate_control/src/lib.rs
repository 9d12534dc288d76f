//! `syndicate_control`: drives a game: the [`Session`] orchestrator and
//! automated order sources.

mod error;
mod narrate;
mod session;

use serde::{Deserialize, Serialize};
use syndicate_core::odds::{steal_loot, steal_success_chance};
use syndicate_core::{Action, Character, CharacterId, Constants, GameState, Sector, SectorId};

pub use error::ControlError;
pub use narrate::{narrate_day, BriefingRequest, DayNarration, PendingDay};
pub use session::{
    draft_candidate, Briefing, Candidate, OrderReceipt, Session, DEFAULT_CONTENT_TIMEOUT,
};

/// One order ready to hand to [`Session::give_order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedOrder {
    pub character: CharacterId,
    pub action: Action,
    pub sector: Option<SectorId>,
}

pub trait OrderSource {
    /// Orders for every member still waiting on one today.
    fn next_orders(&mut self, state: &GameState, constants: &Constants) -> Vec<PlannedOrder>;
}

/// Plays the Boss without asking anyone:
/// 1. Rest members below half condition.
/// 2. Send one member to scout the calmest sector when no scouting is fresh.
/// 3. Everyone else steals where the expected take is highest.
///
/// Never executes anyone.
pub struct AutoBoss;

const REST_BELOW_CONDITION: u32 = 50;

/// Members waiting on orders, sorted by id for determinism.
fn collect_waiting(state: &GameState) -> Vec<&Character> {
    let mut waiting: Vec<&Character> = state
        .roster
        .iter()
        .filter(|c| c.awaiting_orders(state.day))
        .collect();
    waiting.sort_by(|a, b| a.id.0.cmp(&b.id.0));
    waiting
}

fn has_fresh_intel(state: &GameState, constants: &Constants) -> bool {
    state.sectors.iter().any(|s| {
        s.last_scouted_day
            .is_some_and(|day| state.day.saturating_sub(day) <= constants.scout_info_fresh_days)
    })
}

/// Calmest sector, lowest id on ties.
fn calmest_sector(state: &GameState) -> Option<SectorId> {
    state
        .sectors
        .iter()
        .min_by(|a, b| {
            a.alert_level
                .total_cmp(&b.alert_level)
                .then(a.id.cmp(&b.id))
        })
        .map(|s| s.id)
}

/// Chance-weighted loot for `member` in `sector`.
fn expected_take(member: &Character, sector: &Sector) -> f64 {
    let chance = steal_success_chance(member, sector).clamp(0.0, 100.0) / 100.0;
    chance * steal_loot(sector) as f64
}

fn best_target(member: &Character, state: &GameState) -> Option<SectorId> {
    state
        .sectors
        .iter()
        .max_by(|a, b| {
            expected_take(member, a)
                .total_cmp(&expected_take(member, b))
                .then(b.id.cmp(&a.id))
        })
        .map(|s| s.id)
}

impl OrderSource for AutoBoss {
    fn next_orders(&mut self, state: &GameState, constants: &Constants) -> Vec<PlannedOrder> {
        let mut scout_needed = !has_fresh_intel(state, constants);
        let mut orders = Vec::new();

        for member in collect_waiting(state) {
            let (action, sector) = if member.condition < REST_BELOW_CONDITION {
                (Action::Rest, None)
            } else if scout_needed {
                scout_needed = false;
                (Action::Scout, calmest_sector(state))
            } else {
                (Action::Steal, best_target(member, state))
            };
            if action.needs_sector() && sector.is_none() {
                continue;
            }
            orders.push(PlannedOrder {
                character: member.id.clone(),
                action,
                sector,
            });
        }
        orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syndicate_core::test_fixtures::{base_constants, state_with_members};

    #[test]
    fn tired_members_rest() {
        let constants = base_constants();
        let mut state = state_with_members(&constants, &["Ada"]);
        state.roster[0].condition = 49;
        let orders = AutoBoss.next_orders(&state, &constants);
        assert_eq!(orders[0].action, Action::Rest);
        assert_eq!(orders[0].sector, None);
    }

    #[test]
    fn one_scout_then_thieves() {
        let constants = base_constants();
        let state = state_with_members(&constants, &["Ada", "Bo", "Cy"]);
        let orders = AutoBoss.next_orders(&state, &constants);

        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].action, Action::Scout);
        assert_eq!(orders[0].sector, Some(SectorId(0)));
        for order in &orders[1..] {
            assert_eq!(order.action, Action::Steal);
            // Sector A is at alert 0: full chance and full loot.
            assert_eq!(order.sector, Some(SectorId(0)));
        }
    }

    #[test]
    fn fresh_intel_skips_scouting() {
        let constants = base_constants();
        let mut state = state_with_members(&constants, &["Ada"]);
        state.sectors[1].last_scouted_day = Some(state.day - 1);
        let orders = AutoBoss.next_orders(&state, &constants);
        assert_eq!(orders[0].action, Action::Steal);
    }

    #[test]
    fn members_with_orders_are_skipped() {
        let constants = base_constants();
        let mut state = state_with_members(&constants, &["Ada", "Bo"]);
        state.roster[0].action = Some(Action::Rest);
        let orders = AutoBoss.next_orders(&state, &constants);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].character.0, "thief_bo");
    }
}

//! The Boss's desk: one game in progress plus the content provider calls
//! that decorate it.
//!
//! Every method that touches the provider comes in two halves so a caller
//! holding the session behind a lock can release it while the provider works.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use syndicate_content::{
    action_reaction_or_fallback, profile_or_fallback, ActionReaction, CharacterSketch,
    ContentProvider, Profile, ProfileHints,
};
use syndicate_core::views::{
    roster_entries, roster_stats, sector_views, RosterEntry, RosterStats, SectorView,
};
use syndicate_core::{
    apply_command, generate_character_id, phase, recruitment_cost, resolve_day, settle_day,
    Action, CharacterId, Command, Constants, GameError, GameState, NewsItem, Phase, Recruit,
    Roller, SectorId, SettlementReport,
};

use crate::error::ControlError;
use crate::narrate::{narrate_day, DayNarration, PendingDay};
use crate::PlannedOrder;

/// Default budget for each provider call at the end of a day.
pub const DEFAULT_CONTENT_TIMEOUT: Duration = Duration::from_secs(30);

/// A generated recruit shown to the Boss before the hire is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub profile: Profile,
    pub portrait: String,
}

/// What the office shows when a member walks in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    pub character: CharacterId,
    pub name: String,
    pub portrait: String,
    pub narration: String,
    pub dialogue: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub reaction: ActionReaction,
    /// The order waits on a map selection.
    pub awaiting_sector: bool,
}

/// Profile (with fallback) then portrait (without one).
pub async fn draft_candidate(
    provider: &dyn ContentProvider,
    hints: &ProfileHints,
) -> Result<Candidate, ControlError> {
    let profile = profile_or_fallback(provider, hints).await;
    let portrait = provider
        .generate_portrait(&profile)
        .await
        .map_err(ControlError::Portrait)?;
    Ok(Candidate { profile, portrait })
}

pub struct Session {
    state: GameState,
    constants: Constants,
    content_timeout: Option<Duration>,
}

impl Session {
    pub fn new(state: GameState, constants: Constants) -> Self {
        Self {
            state,
            constants,
            content_timeout: Some(DEFAULT_CONTENT_TIMEOUT),
        }
    }

    /// `None` waits on the provider indefinitely.
    #[must_use]
    pub fn with_content_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.content_timeout = timeout;
        self
    }

    pub fn content_timeout(&self) -> Option<Duration> {
        self.content_timeout
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == Phase::GameOver
    }

    // --- Read models ---------------------------------------------------

    pub fn stats(&self) -> RosterStats {
        roster_stats(&self.state)
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        roster_entries(&self.state)
    }

    pub fn sector_views(&self) -> Vec<SectorView> {
        sector_views(&self.state, &self.constants)
    }

    /// Newest first.
    pub fn news(&self) -> &[NewsItem] {
        &self.state.news
    }

    pub fn can_end_day(&self) -> bool {
        phase::can_end_day(&self.state)
    }

    // --- Recruitment -----------------------------------------------------

    /// Phase and funds check, done before paying for any generation.
    pub fn check_can_recruit(&self) -> Result<i64, ControlError> {
        phase::require(
            &self.state,
            &[Phase::Recruitment, Phase::Assignment],
            "recruiting",
        )?;
        let cost = recruitment_cost(&self.state, &self.constants);
        if self.state.cash < cost {
            return Err(GameError::InsufficientFunds {
                needed: cost,
                available: self.state.cash,
            }
            .into());
        }
        Ok(cost)
    }

    pub async fn draft_recruit(
        &self,
        provider: &dyn ContentProvider,
        hints: &ProfileHints,
    ) -> Result<Candidate, ControlError> {
        self.check_can_recruit()?;
        draft_candidate(provider, hints).await
    }

    pub fn confirm_recruit(
        &mut self,
        candidate: Candidate,
        rng: &mut impl Rng,
    ) -> Result<CharacterId, ControlError> {
        let id = generate_character_id(rng);
        let Candidate { profile, portrait } = candidate;
        let name = profile.name.clone();
        apply_command(
            &mut self.state,
            &self.constants,
            Command::Recruit {
                id: id.clone(),
                recruit: Recruit {
                    name: profile.name,
                    personality: profile.personality,
                    background: profile.background,
                    portrait,
                    dialogue: profile.dialogue,
                },
            },
        )?;
        tracing::info!(day = self.state.day, %id, %name, cash = self.state.cash, "recruit hired");
        Ok(id)
    }

    pub fn cancel_recruit(&mut self) -> Result<(), ControlError> {
        Ok(apply_command(
            &mut self.state,
            &self.constants,
            Command::CancelRecruit,
        )?)
    }

    // --- Briefings and orders -----------------------------------------------

    /// Open a member's morning report. The opening narration is shown once.
    pub fn open_briefing(&mut self, id: &CharacterId) -> Result<Briefing, ControlError> {
        phase::require(&self.state, &[Phase::Assignment], "opening a briefing")?;
        let day = self.state.day;
        let member = self
            .state
            .character_mut(id)
            .ok_or_else(|| GameError::UnknownCharacter(id.clone()))?;
        if !member.awaiting_orders(day) {
            return Err(GameError::NotEligible(id.clone()).into());
        }
        let narration = member
            .opening_narration
            .take()
            .unwrap_or_else(|| format!("{} stood before you.", member.name));
        Ok(Briefing {
            character: id.clone(),
            name: member.name.clone(),
            portrait: member.portrait.clone(),
            narration,
            dialogue: member.dialogue.clone(),
        })
    }

    /// Validate an order without applying it; returns what the provider needs.
    pub fn order_sketch(&self, id: &CharacterId) -> Result<CharacterSketch, ControlError> {
        phase::require(&self.state, &[Phase::Assignment], "giving orders")?;
        let member = self
            .state
            .character(id)
            .ok_or_else(|| GameError::UnknownCharacter(id.clone()))?;
        if !member.awaiting_orders(self.state.day) {
            return Err(GameError::NotEligible(id.clone()).into());
        }
        Ok(CharacterSketch::from(member))
    }

    /// Apply an order. Steal and Scout leave the session on the map.
    pub fn apply_order(&mut self, id: &CharacterId, action: Action) -> Result<bool, ControlError> {
        apply_command(
            &mut self.state,
            &self.constants,
            Command::AssignAction {
                character: id.clone(),
                action,
            },
        )?;
        Ok(self.state.phase == Phase::MapSelection)
    }

    pub async fn issue_order(
        &mut self,
        provider: &dyn ContentProvider,
        id: &CharacterId,
        action: Action,
    ) -> Result<OrderReceipt, ControlError> {
        let sketch = self.order_sketch(id)?;
        let reaction = action_reaction_or_fallback(provider, &sketch, action).await;
        let awaiting_sector = self.apply_order(id, action)?;
        Ok(OrderReceipt {
            reaction,
            awaiting_sector,
        })
    }

    pub fn select_sector(&mut self, sector: SectorId) -> Result<(), ControlError> {
        Ok(apply_command(
            &mut self.state,
            &self.constants,
            Command::SelectSector { sector },
        )?)
    }

    pub fn cancel_sector_selection(&mut self) -> Result<(), ControlError> {
        Ok(apply_command(
            &mut self.state,
            &self.constants,
            Command::CancelSectorSelection,
        )?)
    }

    /// Order plus target in one step, for automated play.
    pub fn give_order(&mut self, order: &PlannedOrder) -> Result<(), ControlError> {
        if self.apply_order(&order.character, order.action)? {
            match order.sector {
                Some(sector) => self.select_sector(sector)?,
                None => {
                    self.cancel_sector_selection()?;
                    return Err(GameError::NoPendingOrder.into());
                }
            }
        }
        Ok(())
    }

    // --- End of day ------------------------------------------------------------

    /// Lock the desk and resolve the day on a copy of the state.
    ///
    /// The live state sits in `EndOfDay` (refusing every command) until
    /// [`Session::commit_day`] swaps in the resolved copy.
    pub fn begin_day(&mut self, roller: &mut impl Roller) -> Result<PendingDay, ControlError> {
        phase::begin_end_day(&mut self.state)?;
        let mut resolved = self.state.clone();
        let outcome = resolve_day(&mut resolved, &self.constants, roller);
        Ok(PendingDay::new(resolved, outcome))
    }

    /// Apply the narration, settle the day and open the report.
    pub fn commit_day(
        &mut self,
        pending: PendingDay,
        narration: DayNarration,
    ) -> Result<SettlementReport, ControlError> {
        if self.state.phase != Phase::EndOfDay || self.state.report.is_some() {
            return Err(phase::PhaseError::NotAllowed {
                phase: self.state.phase,
                action: "committing a day",
            }
            .into());
        }
        if pending.day() != self.state.day {
            return Err(ControlError::StaleDay {
                pending: pending.day(),
                current: self.state.day,
            });
        }

        let (mut resolved, outcome) = pending.into_parts();
        for (id, briefing) in narration.briefings {
            if let Some(member) = resolved.character_mut(&id) {
                member.opening_narration = Some(briefing.narration);
                member.dialogue = briefing.dialogue;
            }
        }
        let report = settle_day(&mut resolved, &outcome, narration.news)?;
        self.state = resolved;

        if report.bankrupt {
            tracing::warn!(day = report.day, cash = self.state.cash, "syndicate bankrupt");
        } else {
            tracing::info!(
                day = report.day,
                income = report.income,
                expenses = report.expenses,
                cash = self.state.cash,
                "day settled"
            );
        }
        Ok(report)
    }

    /// `begin_day`, narration and `commit_day` in one go.
    pub async fn end_day(
        &mut self,
        provider: Arc<dyn ContentProvider>,
        roller: &mut impl Roller,
    ) -> Result<SettlementReport, ControlError> {
        let pending = self.begin_day(roller)?;
        let narration = narrate_day(provider, &pending, self.content_timeout).await;
        self.commit_day(pending, narration)
    }

    pub fn dismiss_report(&mut self) -> Result<(), ControlError> {
        Ok(apply_command(
            &mut self.state,
            &self.constants,
            Command::DismissReport,
        )?)
    }
}

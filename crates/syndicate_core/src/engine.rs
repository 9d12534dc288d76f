use serde::{Deserialize, Serialize};

use crate::format::format_amount;
use crate::odds::{arrest_chance, steal_loot, steal_success_chance};
use crate::phase::{conclude_day, PhaseError};
use crate::roll::{passes, Roller};
use crate::{
    Action, CharacterId, CharacterStatus, Constants, GameState, NewsCategory, NewsItem, SectorId,
    SettlementReport,
};

const STAT_MAX: u32 = 100;
const ALERT_MAX: f64 = 100.0;
const STEAL_LOYALTY_GAIN: u32 = 5;
const STEAL_LOYALTY_LOSS: u32 = 10;
const SUCCESS_SECTOR_ALERT: f64 = 10.0;
const FAILURE_SECTOR_ALERT: f64 = 15.0;
const SUCCESS_GLOBAL_ALERT: f64 = 2.0;
const FAILURE_GLOBAL_ALERT: f64 = 5.0;
const ARREST_GLOBAL_ALERT: f64 = 15.0;
const EXECUTE_LOYALTY_GAIN: u32 = 15;
const EXECUTE_SUCCESS_PENALTY: u32 = 5;
const SUCCESS_RATE_FLOOR: u32 = 10;

/// Event summary used for members with nothing in the day's log.
pub const QUIET_DAY: &str = "Had a quiet day yesterday.";

/// One member's resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DayEvent {
    Rested {
        character: CharacterId,
        name: String,
        recovery: u32,
    },
    Stole {
        character: CharacterId,
        name: String,
        sector: SectorId,
        sector_name: String,
        loot: i64,
    },
    HeistFailed {
        character: CharacterId,
        name: String,
        sector: SectorId,
        sector_name: String,
        arrested: bool,
    },
    Scouted {
        character: CharacterId,
        name: String,
        sector: SectorId,
        sector_name: String,
    },
    Executed {
        character: CharacterId,
        name: String,
    },
}

impl DayEvent {
    pub fn character(&self) -> &CharacterId {
        match self {
            Self::Rested { character, .. }
            | Self::Stole { character, .. }
            | Self::HeistFailed { character, .. }
            | Self::Scouted { character, .. }
            | Self::Executed { character, .. } => character,
        }
    }

    /// Short line fed to the news narration.
    pub fn report_line(&self) -> String {
        match self {
            Self::Rested { name, .. } => format!("{name} took a rest."),
            Self::Stole {
                sector_name, loot, ..
            } => format!(
                "Successfully stole ${} from {sector_name} sector.",
                format_amount(*loot)
            ),
            Self::HeistFailed {
                name,
                sector_name,
                arrested,
                ..
            } => {
                let mut line = format!("{name}'s operation in {sector_name} sector failed.");
                if *arrested {
                    line.push_str(&format!(
                        " Furthermore, {name} has been arrested by the police!"
                    ));
                }
                line
            }
            Self::Scouted {
                name, sector_name, ..
            } => format!("{name} scouted the {sector_name} sector."),
            Self::Executed { name, .. } => {
                format!("{name} was eliminated due to internal syndicate affairs.")
            }
        }
    }

    /// News log entries, in the order they happened.
    pub fn news(&self, day: u32) -> Vec<NewsItem> {
        let item = |message: String, category: NewsCategory| NewsItem {
            day,
            message,
            category,
        };
        match self {
            Self::Rested { name, recovery, .. } => vec![item(
                format!("{name} rested and recovered their condition. (Condition +{recovery})"),
                NewsCategory::Neutral,
            )],
            Self::Stole {
                name,
                sector_name,
                loot,
                ..
            } => vec![item(
                format!(
                    "{name} stole ${} from {sector_name} sector. (Loyalty +{STEAL_LOYALTY_GAIN})",
                    format_amount(*loot)
                ),
                NewsCategory::Success,
            )],
            Self::HeistFailed {
                name,
                sector_name,
                arrested,
                ..
            } => {
                let mut items = vec![item(
                    format!(
                        "{name}'s operation in {sector_name} sector failed. (Loyalty -{STEAL_LOYALTY_LOSS})"
                    ),
                    NewsCategory::Failure,
                )];
                if *arrested {
                    items.push(item(
                        format!(
                            "{name} was arrested by the police after a failed operation. \
                             The syndicate has taken a major blow."
                        ),
                        NewsCategory::Arrest,
                    ));
                }
                items
            }
            Self::Scouted {
                name, sector_name, ..
            } => vec![item(
                format!("{name} scouted the {sector_name} sector and brought back new information."),
                NewsCategory::Neutral,
            )],
            Self::Executed { name, .. } => vec![item(
                format!(
                    "By the Boss's order, {name} was executed. \
                     Other members are now more obedient out of fear."
                ),
                NewsCategory::System,
            )],
        }
    }
}

/// Everything one resolution pass produced, before narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOutcome {
    pub day: u32,
    pub income: i64,
    pub expenses: i64,
    pub events: Vec<DayEvent>,
    /// Cash went negative; the day settles into `GameOver`.
    pub bankrupt: bool,
}

impl DayOutcome {
    /// The day's news block, oldest first.
    pub fn news(&self) -> Vec<NewsItem> {
        self.events.iter().flat_map(|e| e.news(self.day)).collect()
    }

    pub fn report_lines(&self) -> Vec<String> {
        self.events.iter().map(DayEvent::report_line).collect()
    }

    /// First news message mentioning `name`, else the quiet-day placeholder.
    pub fn event_summary_for(&self, name: &str) -> String {
        self.news()
            .into_iter()
            .find(|item| item.message.contains(name))
            .map_or_else(|| QUIET_DAY.to_string(), |item| item.message)
    }
}

/// Resolve one day in place.
///
/// Order of operations:
/// 1. Charge living costs for every active member (roster at day start).
/// 2. Resolve each member's action in roster order.
/// 3. Flag bankruptcy if cash ended below zero.
///
/// Does not clear orders, advance the day, or touch the phase; see [`settle_day`].
pub fn resolve_day(
    state: &mut GameState,
    constants: &Constants,
    roller: &mut impl Roller,
) -> DayOutcome {
    let expenses = charge_living_costs(state, constants);
    let mut outcome = DayOutcome {
        day: state.day,
        income: 0,
        expenses,
        events: Vec::new(),
        bankrupt: false,
    };

    for index in 0..state.roster.len() {
        let member = &state.roster[index];
        if member.status.is_terminal() {
            continue;
        }
        let Some(action) = member.action else {
            continue;
        };
        let event = match action {
            Action::Rest => Some(rest(state, index, constants)),
            Action::Steal => steal(state, index, constants, roller, &mut outcome.income),
            Action::Scout => scout(state, index, constants),
            Action::Execute => Some(execute(state, index)),
        };
        outcome.events.extend(event);
    }

    outcome.bankrupt = state.cash < 0;
    outcome
}

/// Close out a resolved day: clear orders, promote new recruits, prepend the
/// day's news, store the settlement report and advance the day counter.
///
/// A bankrupt day commits everything but does not open the next day; the
/// phase moves to `GameOver` instead.
pub fn settle_day(
    state: &mut GameState,
    outcome: &DayOutcome,
    narration: String,
) -> Result<SettlementReport, PhaseError> {
    conclude_day(state, outcome.bankrupt)?;

    for member in &mut state.roster {
        member.action = None;
        member.assigned_sector = None;
        if member.status == CharacterStatus::Recruited {
            member.status = CharacterStatus::Idle;
        }
    }
    state.pending_order = None;
    state.news.splice(0..0, outcome.news());

    let report = SettlementReport {
        day: outcome.day,
        narration,
        income: outcome.income,
        expenses: outcome.expenses,
        bankrupt: outcome.bankrupt,
    };
    state.report = Some(report.clone());
    if !outcome.bankrupt {
        state.day += 1;
    }
    Ok(report)
}

fn charge_living_costs(state: &mut GameState, constants: &Constants) -> i64 {
    let active = state.active_members().count() as i64;
    let cost = active * constants.daily_cost_per_member;
    state.cash -= cost;
    cost
}

fn raise_alert(level: f64, by: f64) -> f64 {
    (level + by).min(ALERT_MAX)
}

fn assigned_sector_index(state: &GameState, index: usize) -> Option<usize> {
    let sector_id = state.roster[index].assigned_sector?;
    state.sectors.iter().position(|s| s.id == sector_id)
}

fn rest(state: &mut GameState, index: usize, constants: &Constants) -> DayEvent {
    let member = &mut state.roster[index];
    member.condition = (member.condition + constants.rest_recovery).min(STAT_MAX);
    DayEvent::Rested {
        character: member.id.clone(),
        name: member.name.clone(),
        recovery: constants.rest_recovery,
    }
}

fn steal(
    state: &mut GameState,
    index: usize,
    constants: &Constants,
    roller: &mut impl Roller,
    income: &mut i64,
) -> Option<DayEvent> {
    let sector_index = assigned_sector_index(state, index)?;
    let chance = steal_success_chance(&state.roster[index], &state.sectors[sector_index]);
    let sector = &mut state.sectors[sector_index];
    let member = &mut state.roster[index];

    let event = if passes(roller.roll(), chance) {
        let loot = steal_loot(sector);
        state.cash += loot;
        *income += loot;
        member.loyalty = (member.loyalty + STEAL_LOYALTY_GAIN).min(STAT_MAX);
        sector.alert_level = raise_alert(sector.alert_level, SUCCESS_SECTOR_ALERT);
        state.global_alert = raise_alert(state.global_alert, SUCCESS_GLOBAL_ALERT);
        DayEvent::Stole {
            character: member.id.clone(),
            name: member.name.clone(),
            sector: sector.id,
            sector_name: sector.name.clone(),
            loot,
        }
    } else {
        member.loyalty = member.loyalty.saturating_sub(STEAL_LOYALTY_LOSS);
        sector.alert_level = raise_alert(sector.alert_level, FAILURE_SECTOR_ALERT);
        state.global_alert = raise_alert(state.global_alert, FAILURE_GLOBAL_ALERT);
        // Arrest odds read the alert after the failure penalty.
        let arrested = passes(roller.roll(), arrest_chance(sector.alert_level));
        if arrested {
            member.status = CharacterStatus::Arrested;
            state.global_alert = raise_alert(state.global_alert, ARREST_GLOBAL_ALERT);
        }
        DayEvent::HeistFailed {
            character: member.id.clone(),
            name: member.name.clone(),
            sector: sector.id,
            sector_name: sector.name.clone(),
            arrested,
        }
    };

    member.condition = member.condition.saturating_sub(constants.steal_fatigue);
    Some(event)
}

fn scout(state: &mut GameState, index: usize, constants: &Constants) -> Option<DayEvent> {
    let sector_index = assigned_sector_index(state, index)?;
    let day = state.day;
    let sector = &mut state.sectors[sector_index];
    sector.scouted_info = Some(format!(
        "Alert {}%, Est. Loot ${}",
        sector.alert_level.round() as i64,
        format_amount(sector.base_loot)
    ));
    sector.last_scouted_day = Some(day);

    let member = &mut state.roster[index];
    member.condition = member.condition.saturating_sub(constants.scout_fatigue);
    Some(DayEvent::Scouted {
        character: member.id.clone(),
        name: member.name.clone(),
        sector: sector.id,
        sector_name: sector.name.clone(),
    })
}

fn execute(state: &mut GameState, index: usize) -> DayEvent {
    let member = &mut state.roster[index];
    member.status = CharacterStatus::Executed;
    let event = DayEvent::Executed {
        character: member.id.clone(),
        name: member.name.clone(),
    };

    for (other_index, other) in state.roster.iter_mut().enumerate() {
        if other_index == index || other.status.is_terminal() {
            continue;
        }
        other.loyalty = (other.loyalty + EXECUTE_LOYALTY_GAIN).min(STAT_MAX);
        other.success_rate = other
            .success_rate
            .saturating_sub(EXECUTE_SUCCESS_PENALTY)
            .max(SUCCESS_RATE_FLOOR);
    }
    event
}

//! Type definitions for `syndicate_core`.
//!
//! All public records, enums, and ID newtypes used by the simulation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(CharacterId);

/// Stable index of a sector on the city map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectorId(pub u32);

impl std::fmt::Display for SectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sector_{:02}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterStatus {
    /// Joined today; takes orders from the next day on.
    Recruited,
    Idle,
    Arrested,
    Executed,
}

impl CharacterStatus {
    /// Arrested and Executed members never come back.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Arrested | Self::Executed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Rest,
    Steal,
    Scout,
    Execute,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Rest, Action::Steal, Action::Scout, Action::Execute];

    /// Steal and Scout go through the map before the order sticks.
    pub fn needs_sector(self) -> bool {
        matches!(self, Self::Steal | Self::Scout)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rest => "Rest",
            Self::Steal => "Steal",
            Self::Scout => "Scout",
            Self::Execute => "Execute",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Rest => "Recovers the member's condition. Consumes one day.",
            Self::Steal => {
                "Select a sector on the map to steal money. Carries a risk of being discovered."
            }
            Self::Scout => {
                "Gathers intelligence on police activity and potential loot in a specific sector."
            }
            Self::Execute => {
                "Executes a member. Increases other members' loyalty, but decreases their success rate."
            }
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Success,
    Failure,
    Neutral,
    Arrest,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Recruitment,
    Assignment,
    /// Transient: a Steal/Scout order is waiting for its target sector.
    MapSelection,
    EndOfDay,
    GameOver,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub personality: String,
    pub background: String,
    /// Opaque image reference handed back by the content provider.
    pub portrait: String,
    pub loyalty: u32,
    pub success_rate: u32,
    pub condition: u32,
    pub dialogue: Vec<String>,
    /// Set by the daily briefing, taken when the Boss opens the briefing.
    pub opening_narration: Option<String>,
    pub status: CharacterStatus,
    pub action: Option<Action>,
    pub assigned_sector: Option<SectorId>,
    pub recruited_on_day: u32,
}

impl Character {
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Active, recruited before `day`, and without an order yet.
    pub fn awaiting_orders(&self, day: u32) -> bool {
        self.is_active() && self.recruited_on_day < day && self.action.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub name: String,
    pub alert_level: f64,
    pub base_loot: i64,
    pub scouted_info: Option<String>,
    pub last_scouted_day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub day: u32,
    pub message: String,
    pub category: NewsCategory,
}

/// An order that is waiting on a map selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub character: CharacterId,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub day: u32,
    pub narration: String,
    pub income: i64,
    pub expenses: i64,
    pub bankrupt: bool,
}

impl SettlementReport {
    pub fn net(&self) -> i64 {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaState {
    pub seed: u64,
    pub session_id: Uuid,
    pub schema_version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    /// May dip below zero only at the bankruptcy check.
    pub cash: i64,
    pub day: u32,
    pub global_alert: f64,
    pub phase: Phase,
    pub pending_order: Option<PendingOrder>,
    pub roster: Vec<Character>,
    pub sectors: Vec<Sector>,
    /// Newest first.
    pub news: Vec<NewsItem>,
    /// The open settlement report, shown until dismissed.
    pub report: Option<SettlementReport>,
}

impl GameState {
    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.roster.iter().find(|c| &c.id == id)
    }

    pub fn character_mut(&mut self, id: &CharacterId) -> Option<&mut Character> {
        self.roster.iter_mut().find(|c| &c.id == id)
    }

    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == id)
    }

    pub fn sector_mut(&mut self, id: SectorId) -> Option<&mut Sector> {
        self.sectors.iter_mut().find(|s| s.id == id)
    }

    pub fn active_members(&self) -> impl Iterator<Item = &Character> {
        self.roster.iter().filter(|c| c.is_active())
    }
}

/// A generated member waiting for the Boss to confirm the hire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruit {
    pub name: String,
    pub personality: String,
    pub background: String,
    pub portrait: String,
    pub dialogue: Vec<String>,
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// Tunable economy and world-generation numbers, loaded from `constants.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub initial_cash: i64,
    /// The first member joins for free.
    pub recruitment_cost: i64,
    pub sector_count: u32,
    pub daily_cost_per_member: i64,
    pub initial_loyalty: u32,
    pub initial_success_rate: u32,
    pub initial_condition: u32,
    pub initial_global_alert: f64,
    /// Sector alert at world-gen is uniform in `[0, sector_alert_max_initial)`.
    pub sector_alert_max_initial: f64,
    pub sector_loot_base: i64,
    /// Base loot is `sector_loot_base + floor(uniform(0,1) * sector_loot_spread)`.
    pub sector_loot_spread: i64,
    pub rest_recovery: u32,
    pub scout_fatigue: u32,
    pub steal_fatigue: u32,
    /// Scouted info stays on the map while `day - last_scouted_day <= scout_info_fresh_days`.
    pub scout_info_fresh_days: u32,
}

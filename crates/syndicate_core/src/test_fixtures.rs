//! Shared test fixtures for syndicate_core and downstream crates.
//!
//! `base_constants()` mirrors the shipped `content/constants.json`.
//! `base_state()` is an empty syndicate on day 1 with three sectors at alert
//! 0, 30 and 90. `state_with_members()` adds idle members hired the day before.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::roll::Roller;
use crate::{
    Character, CharacterId, CharacterStatus, Constants, GameState, MetaState, Phase, Sector,
    SectorId,
};

/// A draw that passes any positive chance.
pub const PASS: f64 = 0.0;
/// A draw that fails every chance up to 100.
pub const FAIL: f64 = 99.999;

pub fn base_constants() -> Constants {
    Constants {
        initial_cash: 5_000,
        recruitment_cost: 500,
        sector_count: 16,
        daily_cost_per_member: 100,
        initial_loyalty: 50,
        initial_success_rate: 50,
        initial_condition: 100,
        initial_global_alert: 10.0,
        sector_alert_max_initial: 20.0,
        sector_loot_base: 1_000,
        sector_loot_spread: 1_500,
        rest_recovery: 30,
        scout_fatigue: 10,
        steal_fatigue: 20,
        scout_info_fresh_days: 1,
    }
}

pub fn make_sector(index: u32, alert_level: f64, base_loot: i64) -> Sector {
    let letter = char::from(b'A' + (index % 26) as u8);
    Sector {
        id: SectorId(index),
        name: format!("Sector {letter}"),
        alert_level,
        base_loot,
        scouted_info: None,
        last_scouted_day: None,
    }
}

/// An idle member with the starting stats from `constants`.
pub fn make_character(id: &str, name: &str, constants: &Constants, recruited_on_day: u32) -> Character {
    Character {
        id: CharacterId(id.to_string()),
        name: name.to_string(),
        personality: "Calm".to_string(),
        background: "Ex-locksmith".to_string(),
        portrait: format!("portrait://{id}"),
        loyalty: constants.initial_loyalty,
        success_rate: constants.initial_success_rate,
        condition: constants.initial_condition,
        dialogue: vec![format!("{name} reporting, Boss.")],
        opening_narration: None,
        status: CharacterStatus::Idle,
        action: None,
        assigned_sector: None,
        recruited_on_day,
    }
}

pub fn base_state(constants: &Constants) -> GameState {
    GameState {
        meta: MetaState {
            seed: 42,
            session_id: Uuid::nil(),
            schema_version: 1,
        },
        cash: constants.initial_cash,
        day: 1,
        global_alert: constants.initial_global_alert,
        phase: Phase::Assignment,
        pending_order: None,
        roster: Vec::new(),
        sectors: vec![
            make_sector(0, 0.0, 2_000),
            make_sector(1, 30.0, 2_000),
            make_sector(2, 90.0, 2_000),
        ],
        news: Vec::new(),
        report: None,
    }
}

/// Day 2, Assignment phase, one idle member per name (id `thief_<lowercase name>`).
pub fn state_with_members(constants: &Constants, names: &[&str]) -> GameState {
    let mut state = base_state(constants);
    state.day = 2;
    state.roster = names
        .iter()
        .map(|name| make_character(&member_id(name).0, name, constants, 1))
        .collect();
    state
}

pub fn member_id(name: &str) -> CharacterId {
    CharacterId(format!("thief_{}", name.to_lowercase()))
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// Replays a fixed list of draws; panics when a test asks for more.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    rolls: VecDeque<f64>,
}

impl ScriptedRolls {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Roller for ScriptedRolls {
    fn roll(&mut self) -> f64 {
        self.rolls
            .pop_front()
            .expect("scripted rolls exhausted: the engine drew more than the test expected")
    }
}

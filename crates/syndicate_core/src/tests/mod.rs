use super::*;
use crate::test_fixtures::{
    base_constants, base_state, make_character, make_rng, member_id, state_with_members,
    ScriptedRolls, FAIL, PASS,
};

mod integration;
mod rest;
mod settle;

// --- Shared test helpers ------------------------------------------------

fn order(state: &mut GameState, name: &str, action: Action, sector: Option<u32>) {
    let member = state
        .character_mut(&member_id(name))
        .expect("member exists in fixture");
    member.action = Some(action);
    member.assigned_sector = sector.map(SectorId);
}

fn member<'a>(state: &'a GameState, name: &str) -> &'a Character {
    state
        .character(&member_id(name))
        .expect("member exists in fixture")
}

fn assert_stats_in_range(state: &GameState) {
    for c in &state.roster {
        assert!(c.loyalty <= 100, "{} loyalty {}", c.name, c.loyalty);
        assert!(c.condition <= 100, "{} condition {}", c.name, c.condition);
        assert!(c.success_rate <= 100, "{} success {}", c.name, c.success_rate);
    }
    assert!((0.0..=100.0).contains(&state.global_alert));
    for s in &state.sectors {
        assert!((0.0..=100.0).contains(&s.alert_level), "{}", s.name);
    }
}

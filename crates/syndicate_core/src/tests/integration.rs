//! Multi-day runs driven by a seeded RNG.

use super::*;
use crate::phase::begin_end_day;

/// Rests anyone below half condition, otherwise steals from the calmest sector.
fn give_orders(state: &mut GameState) {
    let calmest = state
        .sectors
        .iter()
        .min_by(|a, b| a.alert_level.total_cmp(&b.alert_level))
        .map(|s| s.id);
    let day = state.day;
    for member in &mut state.roster {
        if !member.awaiting_orders(day) {
            continue;
        }
        if member.condition < 50 {
            member.action = Some(Action::Rest);
        } else {
            member.action = Some(Action::Steal);
            member.assigned_sector = calmest;
        }
    }
}

fn run_days(seed_rng: &mut impl Roller, days: u32) -> GameState {
    let constants = base_constants();
    let mut state = state_with_members(&constants, &["Ada", "Bo", "Cy"]);
    for _ in 0..days {
        if state.phase == Phase::GameOver {
            break;
        }
        give_orders(&mut state);
        begin_end_day(&mut state).unwrap();
        let outcome = resolve_day(&mut state, &constants, seed_rng);
        settle_day(&mut state, &outcome, String::new()).unwrap();
        if state.phase == Phase::EndOfDay {
            apply_command(&mut state, &constants, Command::DismissReport).unwrap();
        }
        assert_stats_in_range(&state);
    }
    state
}

#[test]
fn same_seed_same_city() {
    let a = run_days(&mut make_rng(), 20);
    let b = run_days(&mut make_rng(), 20);
    assert_eq!(a, b);
}

#[test]
fn long_run_keeps_invariants() {
    let state = run_days(&mut make_rng(), 60);
    assert!(state.day >= 2);
    // Terminal members never come back.
    for c in &state.roster {
        if c.status.is_terminal() {
            assert_eq!(c.action, None);
        }
    }
}

#[test]
fn state_survives_json_round_trip() {
    let state = run_days(&mut make_rng(), 5);
    let json = serde_json::to_string(&state).unwrap();
    let back: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(state, back);
}

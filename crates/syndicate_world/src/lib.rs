//! World generation, constants loading and save files, shared between
//! syndicate_cli and syndicate_daemon.

use anyhow::{Context, Result};
use rand::Rng;
use std::path::{Path, PathBuf};
use syndicate_core::{Constants, GameState, MetaState, Phase, Sector, SectorId};

/// Save-file layout version written into `MetaState`.
pub const SCHEMA_VERSION: u32 = 1;

const MAX_SECTORS: u32 = 26;
const STAT_MAX: u32 = 100;

/// Checks constants for authoring errors, panicking on the first one found.
pub fn validate_constants(constants: &Constants) {
    assert!(
        (1..=MAX_SECTORS).contains(&constants.sector_count),
        "sector_count {} must be between 1 and {MAX_SECTORS}",
        constants.sector_count,
    );
    for (field, value) in [
        ("initial_loyalty", constants.initial_loyalty),
        ("initial_success_rate", constants.initial_success_rate),
        ("initial_condition", constants.initial_condition),
        ("rest_recovery", constants.rest_recovery),
        ("scout_fatigue", constants.scout_fatigue),
        ("steal_fatigue", constants.steal_fatigue),
    ] {
        assert!(value <= STAT_MAX, "{field} {value} exceeds {STAT_MAX}");
    }
    for (field, value) in [
        ("initial_global_alert", constants.initial_global_alert),
        ("sector_alert_max_initial", constants.sector_alert_max_initial),
    ] {
        assert!(
            (0.0..=100.0).contains(&value),
            "{field} {value} is outside 0..=100",
        );
    }
    for (field, value) in [
        ("initial_cash", constants.initial_cash),
        ("recruitment_cost", constants.recruitment_cost),
        ("daily_cost_per_member", constants.daily_cost_per_member),
        ("sector_loot_base", constants.sector_loot_base),
        ("sector_loot_spread", constants.sector_loot_spread),
    ] {
        assert!(value >= 0, "{field} {value} is negative");
    }
}

pub fn load_constants(content_dir: &str) -> Result<Constants> {
    let path = Path::new(content_dir).join("constants.json");
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
    )
    .context("parsing constants.json")?;
    validate_constants(&constants);
    Ok(constants)
}

fn sector_name(index: u32) -> String {
    let letter = char::from(b'A' + (index % MAX_SECTORS) as u8);
    format!("Sector {letter}")
}

/// A fresh game on day 1, waiting for its first recruit.
pub fn build_initial_state(constants: &Constants, seed: u64, rng: &mut impl Rng) -> GameState {
    let sectors = (0..constants.sector_count)
        .map(|index| {
            let alert_level = rng.gen::<f64>() * constants.sector_alert_max_initial;
            let spread = (rng.gen::<f64>() * constants.sector_loot_spread as f64).floor() as i64;
            Sector {
                id: SectorId(index),
                name: sector_name(index),
                alert_level,
                base_loot: constants.sector_loot_base + spread,
                scouted_info: None,
                last_scouted_day: None,
            }
        })
        .collect();

    GameState {
        meta: MetaState {
            seed,
            session_id: syndicate_core::generate_uuid(rng),
            schema_version: SCHEMA_VERSION,
        },
        cash: constants.initial_cash,
        day: 1,
        global_alert: constants.initial_global_alert,
        phase: Phase::Recruitment,
        pending_order: None,
        roster: Vec::new(),
        sectors,
        news: Vec::new(),
        report: None,
    }
}

/// Reads a save, checking its schema. A save caught between the start of a
/// day's resolution and its commit reopens in Assignment with orders intact.
pub fn load_state(path: &Path) -> Result<GameState> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut state: GameState = serde_json::from_str(&json).context("parsing saved game")?;
    anyhow::ensure!(
        state.meta.schema_version == SCHEMA_VERSION,
        "save schema {} is not supported (expected {SCHEMA_VERSION})",
        state.meta.schema_version,
    );
    // Taken mid-resolution: the day never committed, so reopen its orders.
    if syndicate_core::is_resolving(&state) {
        state.phase = Phase::Assignment;
    }
    Ok(state)
}

/// Writes `save_day{day}.json` into `dir`, creating it if needed.
pub fn save_state(dir: &Path, state: &GameState) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("save_day{}.json", state.day));
    let json = serde_json::to_string_pretty(state).context("serializing game state")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

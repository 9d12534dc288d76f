//! Snapshot metrics computed from `GameState`.
//!
//! `compute_metrics(&GameState) -> MetricsSnapshot` samples the header figures
//! (cash, alert, head count, average loyalty) plus a few balance counters for
//! per-day time series. No state mutation; the CSV writer is the only IO.

use crate::{CharacterStatus, GameState};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Current schema version. Bump when fields are added/removed/reordered.
const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub day: u32,
    pub metrics_version: u32,

    // Header figures
    pub cash: i64,
    pub global_alert: f64,
    pub active_members: u32,
    /// Mean over active members; 0 with nobody left.
    pub average_loyalty: f64,

    // Roster breakdown
    pub new_recruits: u32,
    pub arrested: u32,
    pub executed: u32,
    pub average_condition: f64,
    pub average_success_rate: f64,

    // Map
    pub max_sector_alert: f64,
    pub mean_sector_alert: f64,
}

pub fn compute_metrics(state: &GameState) -> MetricsSnapshot {
    let mut active_members = 0u32;
    let mut new_recruits = 0u32;
    let mut arrested = 0u32;
    let mut executed = 0u32;
    let mut loyalty_sum = 0u64;
    let mut condition_sum = 0u64;
    let mut success_sum = 0u64;

    for member in &state.roster {
        match member.status {
            CharacterStatus::Arrested => arrested += 1,
            CharacterStatus::Executed => executed += 1,
            CharacterStatus::Recruited | CharacterStatus::Idle => {
                active_members += 1;
                loyalty_sum += u64::from(member.loyalty);
                condition_sum += u64::from(member.condition);
                success_sum += u64::from(member.success_rate);
                if member.status == CharacterStatus::Recruited {
                    new_recruits += 1;
                }
            }
        }
    }

    let mean = |sum: u64| {
        if active_members == 0 {
            0.0
        } else {
            sum as f64 / f64::from(active_members)
        }
    };

    let max_sector_alert = state
        .sectors
        .iter()
        .map(|s| s.alert_level)
        .fold(0.0_f64, f64::max);
    let mean_sector_alert = if state.sectors.is_empty() {
        0.0
    } else {
        state.sectors.iter().map(|s| s.alert_level).sum::<f64>() / state.sectors.len() as f64
    };

    MetricsSnapshot {
        day: state.day,
        metrics_version: METRICS_VERSION,
        cash: state.cash,
        global_alert: state.global_alert,
        active_members,
        average_loyalty: mean(loyalty_sum),
        new_recruits,
        arrested,
        executed,
        average_condition: mean(condition_sum),
        average_success_rate: mean(success_sum),
        max_sector_alert,
        mean_sector_alert,
    }
}

/// Write the CSV header row for metrics.
pub fn write_metrics_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "day,metrics_version,\
         cash,global_alert,active_members,average_loyalty,\
         new_recruits,arrested,executed,average_condition,average_success_rate,\
         max_sector_alert,mean_sector_alert"
    )
}

/// Append a single metrics snapshot as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl std::io::Write,
    snapshot: &MetricsSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{:.2},{},{:.2},{},{},{},{:.2},{:.2},{:.2},{:.2}",
        snapshot.day,
        snapshot.metrics_version,
        snapshot.cash,
        snapshot.global_alert,
        snapshot.active_members,
        snapshot.average_loyalty,
        snapshot.new_recruits,
        snapshot.arrested,
        snapshot.executed,
        snapshot.average_condition,
        snapshot.average_success_rate,
        snapshot.max_sector_alert,
        snapshot.mean_sector_alert,
    )
}

/// Per-run metrics CSV (`metrics.csv` in the run directory), one row per day.
pub struct MetricsFileWriter {
    path: std::path::PathBuf,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    /// Create a new writer, opening the CSV file with a header row.
    pub fn new(run_dir: &std::path::Path) -> std::io::Result<Self> {
        let path = run_dir.join("metrics.csv");
        let file = std::fs::File::create(&path)?;
        let mut writer = std::io::BufWriter::new(file);
        write_metrics_header(&mut writer)?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        append_metrics_row(&mut self.writer, snapshot)?;
        self.writer.flush()
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

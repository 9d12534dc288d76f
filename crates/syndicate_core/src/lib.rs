//! `syndicate_core`: deterministic day resolution and phase machine.
//!
//! No IO, no network. All randomness via the passed-in `Roller`.

pub mod commands;
mod engine;
mod error;
mod format;
mod id;
pub mod metrics;
pub mod odds;
pub mod phase;
pub mod roll;
mod types;
pub mod views;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use commands::{apply_command, recruitment_cost, Command};
pub use engine::{resolve_day, settle_day, DayEvent, DayOutcome, QUIET_DAY};
pub use error::GameError;
pub use format::format_amount;
pub use id::{generate_character_id, generate_uuid};
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use phase::{can_end_day, is_resolving, outstanding_orders, PhaseError};
pub use roll::Roller;
pub use types::*;

#[cfg(test)]
mod tests;

//! `syndicate_content`: flavor text for the syndicate: recruit profiles,
//! portraits, morning briefings, the nightly news and order reactions.
//!
//! Every generator is fallible. Callers go through the `*_or_fallback`
//! helpers, which log the failure and substitute deterministic text.

mod error;
pub mod fallback;
mod json;
mod llm;
mod offline;
mod provider;
mod types;

pub mod client;

pub use error::ContentError;
pub use fallback::{
    action_reaction_or_fallback, briefing_or_fallback, news_report_or_fallback,
    profile_or_fallback, QUIET_CITY,
};
pub use llm::LlmContentProvider;
pub use offline::OfflineContentProvider;
pub use provider::ContentProvider;
pub use types::{ActionReaction, CharacterSketch, DailyBriefing, Profile, ProfileHints};

//! Asynchronous seam between the game and whatever writes its prose.
//!
//! Implementations plug in an LLM, canned offline text, or a test double.

use async_trait::async_trait;
use syndicate_core::Action;

use crate::error::Result;
use crate::types::{ActionReaction, CharacterSketch, DailyBriefing, Profile, ProfileHints};

#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Complete a recruit from optional hints.
    async fn generate_profile(&self, hints: &ProfileHints) -> Result<Profile>;

    /// Opaque portrait handle (URL or data URI) for a finished profile.
    async fn generate_portrait(&self, profile: &Profile) -> Result<String>;

    /// Morning report of one member, given their most relevant event.
    async fn generate_briefing(
        &self,
        member: &CharacterSketch,
        event_summary: &str,
    ) -> Result<DailyBriefing>;

    /// Broadcast narrating the night. Never called with an empty list.
    async fn generate_news_report(&self, events: &[String]) -> Result<String>;

    async fn generate_action_reaction(
        &self,
        member: &CharacterSketch,
        action: Action,
    ) -> Result<ActionReaction>;
}

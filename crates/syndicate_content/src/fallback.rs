//! Deterministic stand-ins for failed generations.
//!
//! The `*_or_fallback` wrappers never fail: an error is logged at `warn` and
//! replaced by the canned text below. Portraits have no fallback.

use syndicate_core::Action;

use crate::provider::ContentProvider;
use crate::types::{ActionReaction, CharacterSketch, DailyBriefing, Profile, ProfileHints};

/// News narration for a night with nothing to report. No provider call is made.
pub const QUIET_CITY: &str = "The city was quiet last night. Too quiet.";

pub fn fallback_profile() -> Profile {
    Profile {
        name: "John Doe".to_string(),
        personality: "Mysterious".to_string(),
        background: "Ex-spy".to_string(),
        dialogue: vec![
            "Boss, I'm here to work.".to_string(),
            "I'll do whatever you ask.".to_string(),
            "Just don't ask about my past.".to_string(),
        ],
    }
}

pub fn fallback_briefing(name: &str) -> DailyBriefing {
    DailyBriefing {
        narration: format!("{name} opened the office door and walked in."),
        dialogue: vec![
            "I have something to report, Boss.".to_string(),
            "Yesterday... nothing special happened.".to_string(),
        ],
    }
}

/// Fallback when the news generator fails on a non-empty night.
pub fn fallback_news(events: &[String]) -> String {
    format!("KNIGHTLY NEWS. Last night in brief: {}", events.join(" "))
}

pub fn fallback_reaction(action: Action) -> ActionReaction {
    let (dialogue, narration) = match action {
        Action::Rest => (
            "Understood, Boss. I need some rest.",
            "A slight bow, and they left the room looking exhausted.",
        ),
        Action::Steal => (
            "Leave it to me. I won't disappoint.",
            "Their eyes gleamed with greed before they vanished into the shadows.",
        ),
        Action::Scout => (
            "Information is power. I'll be right back.",
            "They slipped out of the office as silently as a shadow.",
        ),
        Action::Execute => (
            "...If it is your will, Boss.",
            "A heavy nod. Their face was an unreadable mask.",
        ),
    };
    ActionReaction {
        dialogue: dialogue.to_string(),
        narration: narration.to_string(),
    }
}

pub async fn profile_or_fallback(provider: &dyn ContentProvider, hints: &ProfileHints) -> Profile {
    match provider.generate_profile(hints).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "profile generation failed, using fallback recruit");
            fallback_profile()
        }
    }
}

pub async fn briefing_or_fallback(
    provider: &dyn ContentProvider,
    member: &CharacterSketch,
    event_summary: &str,
) -> DailyBriefing {
    match provider.generate_briefing(member, event_summary).await {
        Ok(briefing) => briefing,
        Err(e) => {
            tracing::warn!(member = %member.name, error = %e, "briefing generation failed");
            fallback_briefing(&member.name)
        }
    }
}

pub async fn news_report_or_fallback(provider: &dyn ContentProvider, events: &[String]) -> String {
    if events.is_empty() {
        return QUIET_CITY.to_string();
    }
    match provider.generate_news_report(events).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, events = events.len(), "news generation failed");
            fallback_news(events)
        }
    }
}

pub async fn action_reaction_or_fallback(
    provider: &dyn ContentProvider,
    member: &CharacterSketch,
    action: Action,
) -> ActionReaction {
    match provider.generate_action_reaction(member, action).await {
        Ok(reaction) => reaction,
        Err(e) => {
            tracing::warn!(member = %member.name, %action, error = %e, "reaction generation failed");
            fallback_reaction(action)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ContentError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails every call and counts them.
    #[derive(Default)]
    struct Broken {
        calls: AtomicUsize,
    }

    impl Broken {
        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ContentError::Unavailable("down".to_string()))
        }
    }

    #[async_trait]
    impl ContentProvider for Broken {
        async fn generate_profile(&self, _: &ProfileHints) -> Result<Profile> {
            self.fail()
        }
        async fn generate_portrait(&self, _: &Profile) -> Result<String> {
            self.fail()
        }
        async fn generate_briefing(&self, _: &CharacterSketch, _: &str) -> Result<DailyBriefing> {
            self.fail()
        }
        async fn generate_news_report(&self, _: &[String]) -> Result<String> {
            self.fail()
        }
        async fn generate_action_reaction(
            &self,
            _: &CharacterSketch,
            _: Action,
        ) -> Result<ActionReaction> {
            self.fail()
        }
    }

    fn sketch() -> CharacterSketch {
        CharacterSketch {
            name: "Vera".to_string(),
            personality: "Sly".to_string(),
            background: "Ex-croupier".to_string(),
            loyalty: 50,
            condition: 100,
        }
    }

    #[tokio::test]
    async fn failed_profile_becomes_john_doe() {
        let profile = profile_or_fallback(&Broken::default(), &ProfileHints::default()).await;
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.dialogue.len(), 3);
    }

    #[tokio::test]
    async fn failed_briefing_names_the_member() {
        let briefing = briefing_or_fallback(&Broken::default(), &sketch(), "anything").await;
        assert_eq!(briefing.narration, "Vera opened the office door and walked in.");
        assert_eq!(briefing.dialogue[0], "I have something to report, Boss.");
    }

    #[tokio::test]
    async fn quiet_night_skips_the_provider() {
        let provider = Broken::default();
        let report = news_report_or_fallback(&provider, &[]).await;
        assert_eq!(report, QUIET_CITY);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_news_still_lists_events() {
        let events = vec!["Vera took a rest.".to_string()];
        let report = news_report_or_fallback(&Broken::default(), &events).await;
        assert!(report.contains("Vera took a rest."));
    }

    #[tokio::test]
    async fn failed_reaction_uses_the_table() {
        for action in Action::ALL {
            let reaction = action_reaction_or_fallback(&Broken::default(), &sketch(), action).await;
            assert_eq!(reaction, fallback_reaction(action));
        }
        assert_eq!(
            fallback_reaction(Action::Steal).dialogue,
            "Leave it to me. I won't disappoint."
        );
    }
}

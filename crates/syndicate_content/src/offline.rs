//! Canned content for play without an API key.
//!
//! Output depends only on the inputs and on how many profiles have been
//! drawn so far, so seeded runs stay reproducible.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use syndicate_core::Action;

use crate::error::Result;
use crate::fallback::fallback_reaction;
use crate::provider::ContentProvider;
use crate::types::{ActionReaction, CharacterSketch, DailyBriefing, Profile, ProfileHints};

const NAMES: [&str; 8] = [
    "Vera Kane", "Sal Moretti", "Iris Voss", "Eddie Lark", "Nora Quill", "Tommy Reyes",
    "June Marlowe", "Felix Dunn",
];
const PERSONALITIES: [&str; 6] = ["Cynical", "Cheerful", "Ruthless", "Nervous", "Loyal", "Greedy"];
const BACKGROUNDS: [&str; 6] = [
    "Ex-boxer", "Fisherman", "Card sharp", "Disgraced cop", "Pickpocket", "Ex-soldier",
];

#[derive(Debug, Default)]
pub struct OfflineContentProvider {
    drawn: AtomicUsize,
}

impl OfflineContentProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn pick<'a>(hint: &'a str, pool: &[&'a str], index: usize) -> &'a str {
    if hint.trim().is_empty() {
        pool[index % pool.len()]
    } else {
        hint
    }
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect()
}

#[async_trait]
impl ContentProvider for OfflineContentProvider {
    async fn generate_profile(&self, hints: &ProfileHints) -> Result<Profile> {
        let n = self.drawn.fetch_add(1, Ordering::Relaxed);
        let name = pick(&hints.name, &NAMES, n);
        let personality = pick(&hints.personality, &PERSONALITIES, n);
        let background = pick(&hints.background, &BACKGROUNDS, n);
        Ok(Profile {
            name: name.to_string(),
            personality: personality.to_string(),
            background: background.to_string(),
            dialogue: vec![
                format!("Name's {name}, Boss."),
                format!("{background}, if you're asking. People call me {}.", personality.to_lowercase()),
                "I hear you pay on time.".to_string(),
                "Point me at a job and I'll handle it.".to_string(),
            ],
        })
    }

    async fn generate_portrait(&self, profile: &Profile) -> Result<String> {
        Ok(format!("portrait://{}", slug(&profile.name)))
    }

    async fn generate_briefing(
        &self,
        member: &CharacterSketch,
        event_summary: &str,
    ) -> Result<DailyBriefing> {
        let narration = if member.condition < 50 {
            format!("{} dragged in, coat soaked, barely standing.", member.name)
        } else {
            format!("{} stepped into the office and shut the door.", member.name)
        };
        let closing = if member.loyalty < 50 {
            "Hope the pay's worth it."
        } else {
            "Ready for whatever's next."
        };
        Ok(DailyBriefing {
            narration,
            dialogue: vec![
                "Morning, Boss.".to_string(),
                event_summary.to_string(),
                closing.to_string(),
            ],
        })
    }

    async fn generate_news_report(&self, events: &[String]) -> Result<String> {
        Ok(format!("KNIGHTLY NEWS. {}", events.join(" ")))
    }

    async fn generate_action_reaction(
        &self,
        _member: &CharacterSketch,
        action: Action,
    ) -> Result<ActionReaction> {
        Ok(fallback_reaction(action))
    }
}

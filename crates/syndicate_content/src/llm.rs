//! [`ContentProvider`] backed by a chat-completion model.

use async_trait::async_trait;
use syndicate_core::Action;

use crate::client::LlmClient;
use crate::error::{ContentError, Result};
use crate::json::parse_reply;
use crate::provider::ContentProvider;
use crate::types::{ActionReaction, CharacterSketch, DailyBriefing, Profile, ProfileHints};

const GAME_MASTER: &str = "You are the game master of a dark, 1940s noir crime-syndicate \
management game. Reply with a single JSON object and nothing else.";

const NEWS_ANCHOR: &str = "You are the anchor of KNIGHTLY NEWS in a crime-ridden city. \
Write a short, dramatic 1940s noir broadcast. No sound effects, no headings.";

pub struct LlmContentProvider {
    client: LlmClient,
}

impl LlmContentProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self> {
        LlmClient::from_env().map(Self::new)
    }
}

fn or_blank(value: &str) -> &str {
    if value.trim().is_empty() {
        "(empty, invent one)"
    } else {
        value
    }
}

fn profile_prompt(hints: &ProfileHints) -> String {
    format!(
        "Create a new thief reporting to the Boss for the first time.\n\
         - Name: {}\n\
         - Personality (one adjective): {}\n\
         - Background (short phrase): {}\n\
         Fill in any empty field. Then write an introduction of 4-5 short \
         sentences revealing personality, past and ambitions.\n\
         JSON shape: {{\"name\": \"...\", \"personality\": \"...\", \
         \"background\": \"...\", \"dialogue\": [\"...\", \"...\"]}}",
        or_blank(&hints.name),
        or_blank(&hints.personality),
        or_blank(&hints.background),
    )
}

fn portrait_prompt(profile: &Profile) -> String {
    format!(
        "Head-and-shoulders digital painting of {}, a game character. \
         Expression and mood follow the personality '{}'; clothing and setting \
         follow the background '{}'. Face fully visible, no text or watermark.",
        profile.name, profile.personality, profile.background
    )
}

fn briefing_prompt(member: &CharacterSketch, event_summary: &str) -> String {
    let mut mood = String::new();
    if member.condition < 50 {
        mood.push_str(" They are worn out and must sound it.");
    }
    if member.loyalty < 50 {
        mood.push_str(" They are disgruntled and must sound it.");
    }
    format!(
        "{name} enters the office to give the Boss a morning report.\n\
         - Personality: {personality}\n\
         - Background: {background}\n\
         - Condition: {condition}/100\n\
         - Loyalty: {loyalty}/100\n\
         Yesterday: {event_summary}\n\
         Write a 1-2 sentence narration of the entrance and at least 3 short \
         lines of dialogue in the member's own voice.{mood}\n\
         JSON shape: {{\"narration\": \"...\", \"dialogue\": [\"...\", \"...\", \"...\"]}}",
        name = member.name,
        personality = member.personality,
        background = member.background,
        condition = member.condition,
        loyalty = member.loyalty,
    )
}

fn reaction_prompt(member: &CharacterSketch, action: Action) -> String {
    format!(
        "The Boss just ordered {name} (personality: {personality}, loyalty {loyalty}/100) \
         to carry out a {label} order. High loyalty reacts eagerly, low loyalty reluctantly.\n\
         Write one line of reply and a 1-2 sentence closing narration.\n\
         JSON shape: {{\"responseDialogue\": \"...\", \"closingNarration\": \"...\"}}",
        name = member.name,
        personality = member.personality,
        loyalty = member.loyalty,
        label = action.label(),
    )
}

#[async_trait]
impl ContentProvider for LlmContentProvider {
    async fn generate_profile(&self, hints: &ProfileHints) -> Result<Profile> {
        let reply = self.client.complete(GAME_MASTER, &profile_prompt(hints)).await?;
        let profile: Profile = parse_reply(&reply)?;
        if profile.name.trim().is_empty() || profile.dialogue.is_empty() {
            return Err(ContentError::Malformed("profile without name or dialogue".into()));
        }
        Ok(profile)
    }

    async fn generate_portrait(&self, profile: &Profile) -> Result<String> {
        self.client.generate_image(&portrait_prompt(profile)).await
    }

    async fn generate_briefing(
        &self,
        member: &CharacterSketch,
        event_summary: &str,
    ) -> Result<DailyBriefing> {
        let prompt = briefing_prompt(member, event_summary);
        let reply = self.client.complete(GAME_MASTER, &prompt).await?;
        let briefing: DailyBriefing = parse_reply(&reply)?;
        if briefing.dialogue.is_empty() {
            return Err(ContentError::Malformed("briefing without dialogue".into()));
        }
        Ok(briefing)
    }

    async fn generate_news_report(&self, events: &[String]) -> Result<String> {
        let prompt = format!("Last night's events:\n- {}", events.join("\n- "));
        let reply = self.client.complete(NEWS_ANCHOR, &prompt).await?;
        Ok(reply.trim().to_string())
    }

    async fn generate_action_reaction(
        &self,
        member: &CharacterSketch,
        action: Action,
    ) -> Result<ActionReaction> {
        let reply = self
            .client
            .complete(GAME_MASTER, &reaction_prompt(member, action))
            .await?;
        parse_reply(&reply)
    }
}

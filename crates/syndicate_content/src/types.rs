use serde::{Deserialize, Serialize};
use syndicate_core::Character;

/// Optional seeds for a generated recruit; empty strings are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileHints {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub personality: String,
    pub background: String,
    pub dialogue: Vec<String>,
}

/// The slice of a member the generators see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSketch {
    pub name: String,
    pub personality: String,
    pub background: String,
    pub loyalty: u32,
    pub condition: u32,
}

impl From<&Character> for CharacterSketch {
    fn from(c: &Character) -> Self {
        Self {
            name: c.name.clone(),
            personality: c.personality.clone(),
            background: c.background.clone(),
            loyalty: c.loyalty,
            condition: c.condition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBriefing {
    pub narration: String,
    pub dialogue: Vec<String>,
}

/// A member's one-line answer to an order plus a closing beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReaction {
    #[serde(rename = "responseDialogue")]
    pub dialogue: String,
    #[serde(rename = "closingNarration")]
    pub narration: String,
}

use syndicate_content::ContentError;
use syndicate_core::{GameError, PhaseError};

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Game(#[from] GameError),
    /// Portraits have no fallback; the draft is abandoned.
    #[error("portrait generation failed: {0}")]
    Portrait(#[source] ContentError),
    /// A narrated day no longer matches the live state.
    #[error("day {pending} was resolved but the session is on day {current}")]
    StaleDay { pending: u32, current: u32 },
}

impl From<PhaseError> for ControlError {
    fn from(e: PhaseError) -> Self {
        Self::Game(GameError::Phase(e))
    }
}

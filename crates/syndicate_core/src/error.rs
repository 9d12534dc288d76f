use crate::phase::PhaseError;
use crate::{CharacterId, SectorId};

/// Rejected player commands. None of these change state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("not enough funds: need ${needed}, have ${available}")]
    InsufficientFunds { needed: i64, available: i64 },
    #[error("unknown character {0}")]
    UnknownCharacter(CharacterId),
    #[error("unknown sector {0}")]
    UnknownSector(SectorId),
    #[error("{0} cannot take orders right now")]
    NotEligible(CharacterId),
    #[error("no order is waiting for a sector")]
    NoPendingOrder,
    #[error("the syndicate needs its first member")]
    FirstRecruitRequired,
    #[error(transparent)]
    Phase(#[from] PhaseError),
}

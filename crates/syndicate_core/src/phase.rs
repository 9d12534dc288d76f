//! Turn/phase state machine.
//!
//! ```text
//! Recruitment ──► Assignment ◄──► MapSelection
//!                   │    ▲
//!                   ▼    │
//!                  EndOfDay ──► GameOver (terminal)
//! ```
//!
//! Transition rules live here; the engine never reads or writes the phase
//! except through [`conclude_day`].

use crate::{GameState, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("the syndicate is finished; no further moves")]
    GameOver,
    #[error("cannot move from {from:?} to {to:?}")]
    Illegal { from: Phase, to: Phase },
    #[error("{action} is not allowed during {phase:?}")]
    NotAllowed { phase: Phase, action: &'static str },
    #[error("{0} member(s) still waiting for orders")]
    OrdersOutstanding(usize),
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        self == Phase::GameOver
    }

    pub fn can_transition_to(self, to: Phase) -> bool {
        matches!(
            (self, to),
            (Phase::Recruitment | Phase::MapSelection | Phase::EndOfDay, Phase::Assignment)
                | (Phase::Assignment, Phase::MapSelection | Phase::EndOfDay)
                | (Phase::EndOfDay, Phase::GameOver)
        )
    }

    /// Returns the target phase if the edge exists. `GameOver` refuses everything.
    pub fn transition(self, to: Phase) -> Result<Phase, PhaseError> {
        if self.is_terminal() {
            return Err(PhaseError::GameOver);
        }
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(PhaseError::Illegal { from: self, to })
        }
    }
}

/// Fails unless the machine is in one of `allowed`.
pub fn require(state: &GameState, allowed: &[Phase], action: &'static str) -> Result<(), PhaseError> {
    if state.phase.is_terminal() {
        return Err(PhaseError::GameOver);
    }
    if allowed.contains(&state.phase) {
        Ok(())
    } else {
        Err(PhaseError::NotAllowed {
            phase: state.phase,
            action,
        })
    }
}

/// Members that could take an order today but have none.
pub fn outstanding_orders(state: &GameState) -> usize {
    state
        .roster
        .iter()
        .filter(|c| c.awaiting_orders(state.day))
        .count()
}

/// Whether the End Day control is enabled.
pub fn can_end_day(state: &GameState) -> bool {
    state.phase == Phase::Assignment && outstanding_orders(state) == 0
}

/// Assignment → EndOfDay, gated on every eligible member holding an order.
pub fn begin_end_day(state: &mut GameState) -> Result<(), PhaseError> {
    require(state, &[Phase::Assignment], "ending the day")?;
    let outstanding = outstanding_orders(state);
    if outstanding > 0 {
        return Err(PhaseError::OrdersOutstanding(outstanding));
    }
    state.phase = state.phase.transition(Phase::EndOfDay)?;
    Ok(())
}

/// A day was begun but not yet committed: EndOfDay without a report.
///
/// The live state in this window is the pre-resolution state with only the
/// phase moved, so rolling the phase back to Assignment loses nothing.
pub fn is_resolving(state: &GameState) -> bool {
    state.phase == Phase::EndOfDay && state.report.is_none()
}

/// EndOfDay → GameOver when the bankruptcy check fired; otherwise the report
/// stays open in EndOfDay until dismissed.
pub fn conclude_day(state: &mut GameState, bankrupt: bool) -> Result<(), PhaseError> {
    if state.phase != Phase::EndOfDay {
        return Err(PhaseError::NotAllowed {
            phase: state.phase,
            action: "settling the day",
        });
    }
    if bankrupt {
        state.phase = state.phase.transition(Phase::GameOver)?;
    }
    Ok(())
}

/// EndOfDay → Assignment once the settlement report is closed.
pub fn dismiss_report(state: &mut GameState) -> Result<(), PhaseError> {
    require(state, &[Phase::EndOfDay], "dismissing the report")?;
    if state.report.is_none() {
        // Still resolving: the report is not out yet.
        return Err(PhaseError::NotAllowed {
            phase: state.phase,
            action: "dismissing the report",
        });
    }
    state.phase = state.phase.transition(Phase::Assignment)?;
    state.report = None;
    Ok(())
}

use serde::Serialize;

use crate::phase::{Phase, PhaseResult};

/// Where the phase controller is in the document sequence.
///
/// `Generating` and `Regenerating` are provider suspension points;
/// `AwaitingApproval` is the human suspension point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ControllerState {
    /// The phase's first generation is due.
    Generating { phase: Phase },
    /// A gated phase's first result is waiting for the reviewer.
    AwaitingApproval { pending: PhaseResult },
    /// Feedback was sent; the single correction attempt is due.
    Regenerating { phase: Phase, feedback: String },
    Done,
}

impl ControllerState {
    pub fn initial() -> Self {
        ControllerState::Generating {
            phase: Phase::Outline,
        }
    }

    /// The phase this state refers to, `None` once done.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ControllerState::Generating { phase } | ControllerState::Regenerating { phase, .. } => {
                Some(*phase)
            }
            ControllerState::AwaitingApproval { pending } => Some(pending.phase),
            ControllerState::Done => None,
        }
    }

    /// State entered once `phase` is finalized.
    pub fn after(phase: Phase) -> Self {
        match phase.next() {
            Some(next) => ControllerState::Generating { phase: next },
            None => ControllerState::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ControllerState::Done)
    }
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerState::Generating { phase } => write!(f, "generating {}", phase),
            ControllerState::AwaitingApproval { pending } => {
                write!(f, "awaiting approval of {}", pending.phase)
            }
            ControllerState::Regenerating { phase, .. } => write!(f, "regenerating {}", phase),
            ControllerState::Done => write!(f, "done"),
        }
    }
}

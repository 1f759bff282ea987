use serde::Serialize;
use tracing::{info, warn};

use super::state::ControllerState;
use crate::client::GenerationClient;
use crate::errors::{ProviderError, SessionError};
use crate::gates::ReviewDecision;
use crate::phase::{Phase, PhaseResult};
use crate::session::SessionParams;
use crate::transcript::Transcript;

/// A finalized phase and the feedback that produced it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    pub result: PhaseResult,
    /// Reviewer instructions that triggered the correction attempt.
    pub feedback: Option<String>,
}

impl PhaseRecord {
    pub fn was_revised(&self) -> bool {
        self.feedback.is_some()
    }
}

/// Drives the fixed phase sequence over a single conversation.
///
/// Every gated phase gets at most one correction: after `review` with
/// [`ReviewDecision::Revise`], the next `generate` result is finalized
/// unconditionally.
pub struct PhaseController {
    client: GenerationClient,
    params: SessionParams,
    doi_list: Option<Vec<String>>,
    state: ControllerState,
    finalized: Vec<PhaseRecord>,
}

impl PhaseController {
    pub fn new(client: GenerationClient, params: SessionParams) -> Self {
        Self {
            client,
            params,
            doi_list: None,
            state: ControllerState::initial(),
            finalized: Vec::new(),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// DOIs to include in the References instruction.
    pub fn set_doi_list(&mut self, doi_list: Option<Vec<String>>) {
        self.doi_list = doi_list;
    }

    pub fn doi_list(&self) -> Option<&[String]> {
        self.doi_list.as_deref()
    }

    pub fn finalized(&self) -> &[PhaseRecord] {
        &self.finalized
    }

    pub fn transcript(&self) -> &Transcript {
        self.client.transcript()
    }

    /// Run the generation due in the current state.
    ///
    /// A gated phase's first result moves the controller to
    /// `AwaitingApproval`; every other result is finalized and the controller
    /// advances. On provider failure the state is unchanged.
    pub async fn generate(&mut self) -> Result<PhaseResult, SessionError> {
        let (phase, feedback) = match &self.state {
            ControllerState::Generating { phase } => (*phase, None),
            ControllerState::Regenerating { phase, feedback } => (*phase, Some(feedback.clone())),
            other => {
                return Err(SessionError::InvalidTransition {
                    operation: "generate",
                    state: other.to_string(),
                });
            }
        };

        let result = self.run_phase(phase).await?;

        if feedback.is_none() && phase.has_approval_gate() {
            self.state = ControllerState::AwaitingApproval {
                pending: result.clone(),
            };
        } else {
            self.finalize(result.clone(), feedback);
        }
        Ok(result)
    }

    /// Apply the reviewer's decision to the pending result.
    ///
    /// `Revise` sends the feedback verbatim as its own user turn and schedules
    /// the single regeneration.
    pub async fn review(&mut self, decision: ReviewDecision) -> Result<(), SessionError> {
        let pending = match &self.state {
            ControllerState::AwaitingApproval { pending } => pending.clone(),
            other => {
                return Err(SessionError::InvalidTransition {
                    operation: "review",
                    state: other.to_string(),
                });
            }
        };

        match decision {
            ReviewDecision::Approve => {
                info!(phase = %pending.phase, "Phase approved");
                self.finalize(pending, None);
            }
            ReviewDecision::Revise(feedback) => {
                info!(
                    phase = %pending.phase,
                    feedback_chars = feedback.len(),
                    "Reviewer requested a revision"
                );
                self.client.send(&feedback).await?;
                self.state = ControllerState::Regenerating {
                    phase: pending.phase,
                    feedback,
                };
            }
        }
        Ok(())
    }

    /// Consume the controller, returning the finalized phases and the transcript.
    pub fn finish(self) -> (Vec<PhaseRecord>, Transcript) {
        let transcript = self.client.transcript().clone();
        (self.finalized, transcript)
    }

    async fn run_phase(&mut self, phase: Phase) -> Result<PhaseResult, ProviderError> {
        let instruction = phase.instruction(&self.params, self.doi_list.as_deref());
        let raw = self.client.send(&instruction).await?;
        let result = PhaseResult::from_response(phase, raw);

        if result.used_fallback() {
            warn!(
                phase = %phase,
                tag = %phase.tag(),
                "Tag pair not found; using the full response"
            );
        }
        Ok(result)
    }

    fn finalize(&mut self, result: PhaseResult, feedback: Option<String>) {
        let phase = result.phase;
        info!(
            phase = %phase,
            content_chars = result.content().len(),
            revised = feedback.is_some(),
            "Phase finalized"
        );
        self.finalized.push(PhaseRecord { result, feedback });
        self.state = ControllerState::after(phase);
    }
}

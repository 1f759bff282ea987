//! Session driver: parameter collection, the phase loop and artifact output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::audit::{AUDIT_FILENAME, SessionAudit};
use crate::client::GenerationClient;
use crate::errors::{ProviderError, SessionError};
use crate::gates::{ApprovalGate, ReviewDecision, Reviewer};
use crate::orchestrator::{ControllerState, PhaseController};
use crate::output::ArtifactSink;
use crate::phase::{Phase, PhaseResult};
use crate::ui::SessionUI;

const TOPIC_QUESTION: &str = "What is the topic of the dissertation?";
const FIELD_QUESTION: &str = "In which academic field is the dissertation written?";
const WORD_COUNT_QUESTION: &str = "What is the target word count for the whole dissertation?";
const DOI_QUESTION: &str = "Optionally enter DOIs of sources to cite, separated by commas \
     (leave empty to let the model propose placeholder sources):";

/// Parameters collected once at session start and reused unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub topic: String,
    pub field: String,
    /// Free text; passed through to the outline instruction.
    pub target_word_count: String,
}

impl SessionParams {
    pub fn new(
        topic: impl Into<String>,
        field: impl Into<String>,
        target_word_count: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            field: field.into(),
            target_word_count: target_word_count.into(),
        }
    }
}

/// Parse a comma-separated DOI line. Blank input or no usable items is `None`.
pub fn parse_doi_list(input: &str) -> Option<Vec<String>> {
    let dois: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();
    (!dois.is_empty()).then_some(dois)
}

/// Answers supplied up front instead of being asked interactively.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub topic: Option<String>,
    pub field: Option<String>,
    pub target_word_count: Option<String>,
    /// Preset DOIs. When empty the reviewer is asked, unless `auto_approve`.
    pub doi_list: Vec<String>,
    /// Approve every gated phase without asking.
    pub auto_approve: bool,
}

/// What a completed session produced.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub params: SessionParams,
    pub artifacts: Vec<PathBuf>,
    pub audit_file: PathBuf,
    pub revisions: usize,
    /// Phases whose tag pair was missing, saved from the raw response.
    pub fallbacks: Vec<Phase>,
}

/// Runs one full document session against a reviewer and an artifact sink.
pub struct SessionDriver<R: Reviewer, S: ArtifactSink> {
    client: GenerationClient,
    reviewer: R,
    sink: S,
    options: SessionOptions,
    ui: SessionUI,
}

impl<R: Reviewer, S: ArtifactSink> SessionDriver<R, S> {
    pub fn new(client: GenerationClient, reviewer: R, sink: S, options: SessionOptions) -> Self {
        Self {
            client,
            reviewer,
            sink,
            options,
            ui: SessionUI::new(Phase::sequence().len()),
        }
    }

    pub fn with_ui(mut self, ui: SessionUI) -> Self {
        self.ui = ui;
        self
    }

    /// Drive every phase to completion and write the artifacts.
    ///
    /// Nothing is written until the last phase is finalized.
    pub async fn run(self) -> Result<SessionReport, SessionError> {
        let SessionDriver {
            client,
            mut reviewer,
            mut sink,
            options,
            ui,
        } = self;

        let params = collect_params(&options, &mut reviewer)?;
        info!(topic = %params.topic, field = %params.field, "Session parameters collected");

        let mut audit = SessionAudit::new(
            client.provider_name(),
            &client.params().model,
            params.clone(),
        );
        ui.session_start(client.provider_name(), &client.params().model);

        let mut controller = PhaseController::new(client, params.clone());
        let mut gate = ApprovalGate::new(options.auto_approve);
        let mut dois_collected = false;
        let sequence = Phase::sequence();

        while !controller.is_done() {
            match controller.state().clone() {
                ControllerState::Generating { phase } => {
                    if phase == Phase::References && !dois_collected {
                        let dois = collect_doi_list(&options, &mut reviewer)?;
                        info!(count = dois.as_ref().map_or(0, Vec::len), "DOI list collected");
                        controller.set_doi_list(dois);
                        dois_collected = true;
                    }
                    let position = sequence.iter().position(|p| *p == phase).unwrap_or(0) + 1;
                    ui.start_phase(position, phase);

                    let result = generate_with_retry(&mut controller, phase, &mut reviewer, &ui).await?;
                    reviewer.present(&result);
                    if !phase.has_approval_gate() {
                        ui.phase_finalized(phase, result.used_fallback());
                    }
                }
                ControllerState::AwaitingApproval { pending } => {
                    let decision = gate
                        .check_phase(&pending, &mut reviewer)
                        .map_err(SessionError::Reviewer)?;
                    let revising = matches!(decision, ReviewDecision::Revise(_));
                    if revising {
                        ui.revision_requested(pending.phase);
                    }
                    loop {
                        let spinner = ui.waiting("Sending feedback...");
                        let outcome = controller.review(decision.clone()).await;
                        spinner.finish_and_clear();
                        match outcome {
                            Ok(()) => break,
                            Err(SessionError::Provider(err)) => {
                                offer_retry(pending.phase, err, &mut reviewer, &ui).await?
                            }
                            Err(other) => return Err(other),
                        }
                    }
                    if !revising {
                        ui.phase_finalized(pending.phase, pending.used_fallback());
                    }
                }
                ControllerState::Regenerating { phase, .. } => {
                    let result = generate_with_retry(&mut controller, phase, &mut reviewer, &ui).await?;
                    reviewer.present(&result);
                    ui.phase_finalized(phase, result.used_fallback());
                }
                ControllerState::Done => break,
            }
        }

        let doi_list = controller.doi_list().map(<[String]>::to_vec);
        let (records, transcript) = controller.finish();

        let mut artifacts = Vec::with_capacity(records.len());
        for record in &records {
            let path = sink.write(&record.result.phase.artifact_filename(), record.result.content())?;
            ui.artifact_saved(&path);
            artifacts.push(path);
        }

        audit.finish(&records, &transcript, doi_list.as_deref());
        let json = audit
            .to_json()
            .map_err(|e| SessionError::Other(anyhow::Error::new(e).context("serializing audit record")))?;
        let audit_file = sink.write(AUDIT_FILENAME, &json)?;

        let revisions = records.iter().filter(|r| r.was_revised()).count();
        let fallbacks = records
            .iter()
            .filter(|r| r.result.used_fallback())
            .map(|r| r.result.phase)
            .collect();
        ui.session_complete(artifacts.len(), revisions);
        info!(
            run_id = %audit.run_id,
            artifacts = artifacts.len(),
            revisions,
            "Session complete"
        );

        Ok(SessionReport {
            params,
            artifacts,
            audit_file,
            revisions,
            fallbacks,
        })
    }
}

fn collect_params(
    options: &SessionOptions,
    reviewer: &mut dyn Reviewer,
) -> Result<SessionParams, SessionError> {
    let mut answer = |preset: &Option<String>, question: &str| -> Result<String, SessionError> {
        match preset {
            Some(value) => Ok(value.clone()),
            None => reviewer
                .ask(question)
                .map(|a| a.trim().to_string())
                .map_err(SessionError::Reviewer),
        }
    };

    let topic = answer(&options.topic, TOPIC_QUESTION)?;
    let field = answer(&options.field, FIELD_QUESTION)?;
    let target_word_count = answer(&options.target_word_count, WORD_COUNT_QUESTION)?;
    Ok(SessionParams::new(topic, field, target_word_count))
}

fn collect_doi_list(
    options: &SessionOptions,
    reviewer: &mut dyn Reviewer,
) -> Result<Option<Vec<String>>, SessionError> {
    if !options.doi_list.is_empty() {
        return Ok(parse_doi_list(&options.doi_list.join(",")));
    }
    if options.auto_approve {
        return Ok(None);
    }
    let line = reviewer.ask(DOI_QUESTION).map_err(SessionError::Reviewer)?;
    Ok(parse_doi_list(&line))
}

async fn generate_with_retry(
    controller: &mut PhaseController,
    phase: Phase,
    reviewer: &mut dyn Reviewer,
    ui: &SessionUI,
) -> Result<PhaseResult, SessionError> {
    loop {
        let spinner = ui.waiting(&format!("Generating {}...", phase.display_name()));
        let outcome = controller.generate().await;
        spinner.finish_and_clear();
        match outcome {
            Ok(result) => return Ok(result),
            Err(SessionError::Provider(err)) => offer_retry(phase, err, reviewer, ui).await?,
            Err(other) => return Err(other),
        }
    }
}

/// Ask whether to repeat a failed provider step. Declining aborts with the error.
async fn offer_retry(
    phase: Phase,
    err: ProviderError,
    reviewer: &mut dyn Reviewer,
    ui: &SessionUI,
) -> Result<(), SessionError> {
    warn!(phase = %phase, error = %err, "Provider step failed");
    ui.provider_error(phase, &err);

    let question = format!("Retry {}?", phase.display_name());
    let retry = reviewer
        .confirm(&question, err.is_retryable())
        .map_err(SessionError::Reviewer)?;
    if !retry {
        return Err(SessionError::Provider(err));
    }

    if let Some(wait) = err.retry_after() {
        tokio::time::sleep(wait).await;
    }
    ui.retrying(phase);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Answers(VecDeque<String>, Vec<String>);

    impl Answers {
        fn new(answers: &[&str]) -> Self {
            Answers(answers.iter().map(|s| s.to_string()).collect(), Vec::new())
        }
    }

    impl Reviewer for Answers {
        fn present(&mut self, _result: &PhaseResult) {}

        fn ask(&mut self, question: &str) -> anyhow::Result<String> {
            self.1.push(question.to_string());
            self.0
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted answer"))
        }

        fn confirm(&mut self, _question: &str, default: bool) -> anyhow::Result<bool> {
            Ok(default)
        }
    }

    #[test]
    fn doi_list_blank_is_none() {
        assert_eq!(parse_doi_list(""), None);
        assert_eq!(parse_doi_list("   "), None);
        assert_eq!(parse_doi_list(" , ,"), None);
    }

    #[test]
    fn doi_list_drops_empty_items() {
        assert_eq!(
            parse_doi_list("10.1/a, ,10.2/b ,"),
            Some(vec!["10.1/a".to_string(), "10.2/b".to_string()])
        );
    }

    #[test]
    fn params_asked_in_order_when_not_preset() {
        let mut reviewer = Answers::new(&["  Urban heat  ", "Geography", "80000"]);
        let params = collect_params(&SessionOptions::default(), &mut reviewer).unwrap();

        assert_eq!(params, SessionParams::new("Urban heat", "Geography", "80000"));
        assert_eq!(
            reviewer.1,
            vec![TOPIC_QUESTION, FIELD_QUESTION, WORD_COUNT_QUESTION]
        );
    }

    #[test]
    fn preset_params_skip_questions() {
        let options = SessionOptions {
            topic: Some("T".into()),
            field: None,
            target_word_count: Some("100".into()),
            ..Default::default()
        };
        let mut reviewer = Answers::new(&["Physics"]);
        let params = collect_params(&options, &mut reviewer).unwrap();

        assert_eq!(params, SessionParams::new("T", "Physics", "100"));
        assert_eq!(reviewer.1, vec![FIELD_QUESTION]);
    }

    #[test]
    fn doi_question_skipped_with_auto_approve() {
        let options = SessionOptions {
            auto_approve: true,
            ..Default::default()
        };
        let mut reviewer = Answers::new(&[]);
        assert_eq!(collect_doi_list(&options, &mut reviewer).unwrap(), None);
        assert!(reviewer.1.is_empty());
    }

    #[test]
    fn preset_dois_are_normalized() {
        let options = SessionOptions {
            doi_list: vec![" 10.1/a ".into(), "".into()],
            ..Default::default()
        };
        let mut reviewer = Answers::new(&[]);
        assert_eq!(
            collect_doi_list(&options, &mut reviewer).unwrap(),
            Some(vec!["10.1/a".to_string()])
        );
    }

    #[test]
    fn reviewer_failure_surfaces_as_reviewer_error() {
        let mut reviewer = Answers::new(&[]);
        let err = collect_params(&SessionOptions::default(), &mut reviewer).unwrap_err();
        assert!(matches!(err, SessionError::Reviewer(_)));
    }
}

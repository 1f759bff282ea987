//! Session audit record written next to the generated artifacts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::orchestrator::PhaseRecord;
use crate::phase::Phase;
use crate::session::SessionParams;
use crate::transcript::{Message, Transcript};

pub const AUDIT_FILENAME: &str = "session.json";

#[derive(Debug, Clone, Serialize)]
pub struct SessionAudit {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub provider: String,
    pub model: String,
    pub params: SessionParams,
    pub doi_list: Option<Vec<String>>,
    pub phases: Vec<PhaseAudit>,
    pub transcript: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseAudit {
    pub phase: Phase,
    pub artifact: String,
    pub revised: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// True when the tag pair was missing and the raw response was saved.
    pub used_fallback: bool,
    pub content_chars: usize,
}

impl PhaseAudit {
    pub fn from_record(record: &PhaseRecord) -> Self {
        Self {
            phase: record.result.phase,
            artifact: record.result.phase.artifact_filename(),
            revised: record.was_revised(),
            feedback: record.feedback.clone(),
            used_fallback: record.result.used_fallback(),
            content_chars: record.result.content().chars().count(),
        }
    }
}

impl SessionAudit {
    pub fn new(provider: &str, model: &str, params: SessionParams) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            ended_at: None,
            provider: provider.to_string(),
            model: model.to_string(),
            params,
            doi_list: None,
            phases: Vec::new(),
            transcript: Vec::new(),
        }
    }

    /// Record the session outcome and stamp the end time.
    pub fn finish(
        &mut self,
        records: &[PhaseRecord],
        transcript: &Transcript,
        doi_list: Option<&[String]>,
    ) {
        self.phases = records.iter().map(PhaseAudit::from_record).collect();
        self.transcript = transcript.snapshot().to_vec();
        self.doi_list = doi_list.map(|d| d.to_vec());
        self.ended_at = Some(Utc::now());
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

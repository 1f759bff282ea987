//! Phase definitions for the document workflow.
//!
//! This module provides:
//! - `Phase`, the fixed sequence Outline → Abstract → Chapter 1..6 → References
//! - extraction tags and approval-gate flags per phase
//! - deterministic artifact filenames (`00_outline.md` … `99_references.md`)
//! - `PhaseResult`, a generated response with its extracted payload

use serde::{Deserialize, Serialize};

use crate::extract::extract_tagged;
use crate::prompts;
use crate::session::SessionParams;

/// The six chapters, in order. Chapter `n` is always tagged `CHAPTER_<n>`.
pub const CHAPTER_NAMES: [&str; 6] = [
    "Introduction",
    "Theoretical Framework / Literature Review",
    "Methodology",
    "Results",
    "Discussion",
    "Conclusion",
];

/// One step of the document sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Outline,
    Abstract,
    Chapter(u8),
    References,
}

impl Phase {
    /// The full phase order.
    pub fn sequence() -> Vec<Phase> {
        let mut phases = vec![Phase::Outline, Phase::Abstract];
        phases.extend((1..=CHAPTER_NAMES.len() as u8).map(Phase::Chapter));
        phases.push(Phase::References);
        phases
    }

    /// A chapter phase, if `number` is within 1..=6.
    pub fn chapter(number: u8) -> Option<Phase> {
        (1..=CHAPTER_NAMES.len() as u8)
            .contains(&number)
            .then_some(Phase::Chapter(number))
    }

    /// The phase that follows this one, `None` after References.
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Outline => Some(Phase::Abstract),
            Phase::Abstract => Some(Phase::Chapter(1)),
            Phase::Chapter(n) if (*n as usize) < CHAPTER_NAMES.len() => Some(Phase::Chapter(n + 1)),
            Phase::Chapter(_) => Some(Phase::References),
            Phase::References => None,
        }
    }

    /// Extraction tag name.
    pub fn tag(&self) -> String {
        match self {
            Phase::Outline => "OUTLINE".to_string(),
            Phase::Abstract => "ABSTRACT".to_string(),
            Phase::Chapter(n) => format!("CHAPTER_{}", n),
            Phase::References => "REFERENCES".to_string(),
        }
    }

    /// Outline and chapters wait for reviewer approval; Abstract and References do not.
    pub fn has_approval_gate(&self) -> bool {
        matches!(self, Phase::Outline | Phase::Chapter(_))
    }

    pub fn chapter_name(&self) -> Option<&'static str> {
        match self {
            Phase::Chapter(n) => CHAPTER_NAMES.get((*n as usize).checked_sub(1)?).copied(),
            _ => None,
        }
    }

    /// Human-readable name, e.g. `Chapter 3: Methodology`.
    pub fn display_name(&self) -> String {
        match self {
            Phase::Outline => "Outline".to_string(),
            Phase::Abstract => "Abstract".to_string(),
            Phase::Chapter(n) => match self.chapter_name() {
                Some(name) => format!("Chapter {}: {}", n, name),
                None => format!("Chapter {}", n),
            },
            Phase::References => "References".to_string(),
        }
    }

    /// Zero-padded index used in the artifact filename.
    pub fn artifact_index(&self) -> u8 {
        match self {
            Phase::Outline => 0,
            Phase::Abstract => 1,
            Phase::Chapter(n) => n.saturating_add(1),
            Phase::References => 99,
        }
    }

    /// Artifact filename, e.g. `04_methodology.md`.
    pub fn artifact_filename(&self) -> String {
        let name = match self {
            Phase::Outline => "outline".to_string(),
            Phase::Abstract => "abstract".to_string(),
            Phase::Chapter(n) => match self.chapter_name() {
                Some(name) => slugify(name),
                None => format!("chapter_{}", n),
            },
            Phase::References => "references".to_string(),
        };
        format!("{:02}_{}.md", self.artifact_index(), name)
    }

    /// The instruction sent to the provider for this phase.
    pub fn instruction(&self, params: &SessionParams, doi_list: Option<&[String]>) -> String {
        match self {
            Phase::Outline => prompts::outline_instruction(params),
            Phase::Abstract => prompts::abstract_instruction(),
            Phase::Chapter(n) => {
                prompts::chapter_instruction(*n, self.chapter_name().unwrap_or("Untitled"))
            }
            Phase::References => prompts::references_instruction(doi_list),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Lowercase slug: alphanumeric runs joined by single underscores.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// A generated response for one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: Phase,
    pub raw_response: String,
    /// `None` when the tag pair was missing or malformed.
    pub extracted_content: Option<String>,
}

impl PhaseResult {
    /// Build a result, extracting the phase's tagged payload from `raw_response`.
    pub fn from_response(phase: Phase, raw_response: String) -> Self {
        let extracted_content = extract_tagged(&raw_response, &phase.tag());
        Self {
            phase,
            raw_response,
            extracted_content,
        }
    }

    /// The usable content: extracted payload, or the whole response as fallback.
    pub fn content(&self) -> &str {
        self.extracted_content
            .as_deref()
            .unwrap_or(&self.raw_response)
    }

    pub fn used_fallback(&self) -> bool {
        self.extracted_content.is_none()
    }
}

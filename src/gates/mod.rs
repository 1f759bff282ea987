//! Approval gates and the reviewer boundary.
//!
//! Gated phases stop here until the reviewer either approves (`OK`, any case,
//! surrounding whitespace ignored) or supplies corrective instructions.

mod terminal;

pub use terminal::TerminalReviewer;

use anyhow::Result;

use crate::phase::{Phase, PhaseResult};

/// Line-oriented human input/output.
pub trait Reviewer {
    /// Show a freshly generated phase result.
    fn present(&mut self, result: &PhaseResult);

    /// Ask a free-text question and return the raw answer.
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;
}

/// The reviewer's verdict on a gated phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    /// Corrective instructions, sent verbatim to the provider.
    Revise(String),
}

impl ReviewDecision {
    pub fn parse(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("ok") {
            ReviewDecision::Approve
        } else {
            ReviewDecision::Revise(input.to_string())
        }
    }
}

pub struct ApprovalGate {
    pub skip_all: bool,
}

impl ApprovalGate {
    pub fn new(skip_all: bool) -> Self {
        Self { skip_all }
    }

    /// Ask the reviewer to approve or revise a gated phase's result.
    pub fn check_phase(
        &mut self,
        result: &PhaseResult,
        reviewer: &mut dyn Reviewer,
    ) -> Result<ReviewDecision> {
        if self.skip_all {
            println!(
                "  {} (--yes flag)",
                console::style(format!("{} auto-approved", result.phase)).dim()
            );
            return Ok(ReviewDecision::Approve);
        }

        let answer = reviewer.ask(&approval_question(result.phase))?;
        Ok(ReviewDecision::parse(&answer))
    }
}

fn approval_question(phase: Phase) -> String {
    let next = match phase.next() {
        Some(next) => next.display_name(),
        None => "finishing".to_string(),
    };
    format!(
        "Review the {} -> enter 'OK' to continue with {}, otherwise give new instructions:",
        phase.display_name(),
        next
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted {
        answers: VecDeque<String>,
        asked: Vec<String>,
    }

    impl Reviewer for Scripted {
        fn present(&mut self, _result: &PhaseResult) {}

        fn ask(&mut self, question: &str) -> Result<String> {
            self.asked.push(question.to_string());
            Ok(self.answers.pop_front().unwrap_or_default())
        }

        fn confirm(&mut self, _question: &str, default: bool) -> Result<bool> {
            Ok(default)
        }
    }

    fn outline_result() -> PhaseResult {
        PhaseResult::from_response(Phase::Outline, "<OUTLINE>x</OUTLINE>".into())
    }

    #[test]
    fn ok_in_any_case_with_whitespace_approves() {
        for input in ["OK", "ok", "Ok", "  oK \n", "\tok\t"] {
            assert_eq!(ReviewDecision::parse(input), ReviewDecision::Approve, "{input:?}");
        }
    }

    #[test]
    fn anything_else_is_revision_verbatim() {
        assert_eq!(
            ReviewDecision::parse("  Add a section on ethics "),
            ReviewDecision::Revise("  Add a section on ethics ".to_string())
        );
        assert_eq!(ReviewDecision::parse("okay"), ReviewDecision::Revise("okay".into()));
        assert_eq!(ReviewDecision::parse(""), ReviewDecision::Revise(String::new()));
    }

    #[test]
    fn gate_asks_reviewer() {
        let mut reviewer = Scripted {
            answers: VecDeque::from(vec!["shorter please".to_string()]),
            asked: Vec::new(),
        };
        let mut gate = ApprovalGate::new(false);
        let decision = gate.check_phase(&outline_result(), &mut reviewer).unwrap();

        assert_eq!(decision, ReviewDecision::Revise("shorter please".into()));
        assert_eq!(reviewer.asked.len(), 1);
        assert!(reviewer.asked[0].contains("Outline"));
        assert!(reviewer.asked[0].contains("Abstract"));
    }

    #[test]
    fn skip_all_approves_without_asking() {
        let mut reviewer = Scripted {
            answers: VecDeque::new(),
            asked: Vec::new(),
        };
        let mut gate = ApprovalGate::new(true);
        let decision = gate.check_phase(&outline_result(), &mut reviewer).unwrap();

        assert_eq!(decision, ReviewDecision::Approve);
        assert!(reviewer.asked.is_empty());
    }

    #[test]
    fn last_chapter_question_points_to_references() {
        let question = approval_question(Phase::Chapter(6));
        assert!(question.contains("Chapter 6: Conclusion"));
        assert!(question.contains("References"));
    }
}

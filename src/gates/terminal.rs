use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

use super::Reviewer;
use crate::phase::PhaseResult;

const WRAP_WIDTH: usize = 80;

/// Reviewer backed by the controlling terminal.
pub struct TerminalReviewer {
    theme: ColorfulTheme,
}

impl TerminalReviewer {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalReviewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reviewer for TerminalReviewer {
    fn present(&mut self, result: &PhaseResult) {
        let rule = "=".repeat(WRAP_WIDTH);
        println!();
        println!("{}", style(&rule).dim());
        println!("{}", style(result.phase.display_name().to_uppercase()).bold().cyan());
        println!("{}", style(&rule).dim());
        println!("{}", result.raw_response);
        if result.used_fallback() {
            println!(
                "{}",
                style(format!(
                    "(no <{}> block found; the full response will be saved)",
                    result.phase.tag()
                ))
                .yellow()
            );
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        println!();
        println!("{}", style(textwrap::fill(question, WRAP_WIDTH)).bold());
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact()?;
        Ok(answer)
    }
}

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::phase::Phase;
use crate::ui::icons::{CHECK, CROSS, FILE_NEW, PENCIL, RETRY, SPARKLE, WARN};

/// Terminal output for a generation session.
///
/// Prints a header per phase and shows a spinner while a provider call is in
/// flight. The spinner is always cleared before control returns to the
/// reviewer so prompts are never drawn over.
pub struct SessionUI {
    total_phases: usize,
    hidden: bool,
}

impl SessionUI {
    pub fn new(total_phases: usize) -> Self {
        Self {
            total_phases,
            hidden: false,
        }
    }

    /// A UI that draws no spinners. Status lines are still printed.
    pub fn hidden(total_phases: usize) -> Self {
        Self {
            total_phases,
            hidden: true,
        }
    }

    pub fn session_start(&self, provider: &str, model: &str) {
        println!(
            "\n{} Generating with {} ({})",
            SPARKLE,
            style(provider).cyan().bold(),
            style(model).dim()
        );
    }

    pub fn start_phase(&self, position: usize, phase: Phase) {
        println!(
            "\n{} {}",
            style(format!("[{}/{}]", position, self.total_phases))
                .bold()
                .dim(),
            style(phase.display_name()).yellow().bold()
        );
    }

    /// Start a spinner for a provider call. Finish it with
    /// [`ProgressBar::finish_and_clear`] before prompting.
    pub fn waiting(&self, message: &str) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} {msg} {elapsed:.dim}")
                .expect("progress bar template is a valid static string"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    pub fn revision_requested(&self, phase: Phase) {
        println!(
            "  {} Sending feedback for {}",
            PENCIL,
            style(phase.display_name()).cyan()
        );
    }

    pub fn phase_finalized(&self, phase: Phase, used_fallback: bool) {
        if used_fallback {
            println!(
                "  {} {} finalized {}",
                CHECK,
                phase.display_name(),
                style("(no tag pair found; full response kept)").yellow()
            );
        } else {
            println!("  {} {} finalized", CHECK, phase.display_name());
        }
    }

    pub fn provider_error(&self, phase: Phase, err: &ProviderError) {
        println!(
            "  {} {} failed: {}",
            CROSS,
            phase.display_name(),
            style(err).red()
        );
        if let Some(wait) = err.retry_after() {
            println!(
                "  {} Provider asked to wait {}s before retrying",
                WARN,
                wait.as_secs()
            );
        }
    }

    pub fn retrying(&self, phase: Phase) {
        println!("  {} Retrying {}", RETRY, phase.display_name());
    }

    pub fn artifact_saved(&self, path: &Path) {
        println!("  {} {}", FILE_NEW, style(path.display()).dim());
    }

    pub fn session_complete(&self, artifacts: usize, revisions: usize) {
        println!(
            "\n{} {} {} artifacts written, {} revised",
            SPARKLE,
            style("Done.").green().bold(),
            artifacts,
            revisions
        );
    }
}

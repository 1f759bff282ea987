//! Full document session: `docforge run`.

use anyhow::{Context, Result};
use console::style;

use super::super::{Cli, RunArgs};

pub async fn cmd_run(cli: &Cli, args: &RunArgs) -> Result<()> {
    use docforge::client::GenerationClient;
    use docforge::config::{CliOverrides, Config};
    use docforge::gates::TerminalReviewer;
    use docforge::logging::init_tracing;
    use docforge::output::DirectorySink;
    use docforge::provider::build_provider;
    use docforge::session::{SessionDriver, SessionOptions};
    use docforge::transcript::Transcript;

    let overrides = CliOverrides {
        provider: args.provider.clone(),
        model: args.model.clone(),
        output_dir: args.output_dir.clone(),
    };
    let config = Config::load(cli.config.as_deref(), &overrides)?;

    let _guard = init_tracing(cli.verbose, Some(&config.log_dir()))?;
    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        output_dir = %config.output_dir.display(),
        config_file = ?config.config_file,
        "Configuration resolved"
    );

    let provider = build_provider(&config).context("Failed to initialize provider")?;
    let client = GenerationClient::new(
        provider,
        config.generation_params(),
        Transcript::new(config.system_prompt()),
    );

    let options = SessionOptions {
        topic: args.topic.clone(),
        field: args.field.clone(),
        target_word_count: args.word_count.clone(),
        doi_list: args.dois.clone(),
        auto_approve: args.yes,
    };

    let driver = SessionDriver::new(
        client,
        TerminalReviewer::new(),
        DirectorySink::new(&config.output_dir),
        options,
    );
    let report = driver.run().await.context("Session failed")?;

    println!();
    println!(
        "Output written to {}",
        style(config.output_dir.display()).cyan()
    );
    println!("Session record: {}", report.audit_file.display());
    if !report.fallbacks.is_empty() {
        let names: Vec<String> = report.fallbacks.iter().map(|p| p.display_name()).collect();
        println!(
            "{} saved without a tag pair: {}",
            style("Note:").yellow(),
            names.join(", ")
        );
    }
    println!();
    Ok(())
}

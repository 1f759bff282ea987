use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "docforge")]
#[command(version, about = "Phased, reviewer-gated dissertation drafting with an LLM")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to docforge.toml. Defaults to ./docforge.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a dissertation draft phase by phase
    Run(RunArgs),
    /// List the phases and the files they produce
    Phases,
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// Directory for the generated files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Provider to use: openai, anthropic
    #[arg(long)]
    pub provider: Option<String>,

    /// Model identifier, overriding the provider default
    #[arg(long)]
    pub model: Option<String>,

    /// Dissertation topic (asked interactively when omitted)
    #[arg(long)]
    pub topic: Option<String>,

    /// Academic field (asked interactively when omitted)
    #[arg(long)]
    pub field: Option<String>,

    /// Target word count for the whole dissertation
    #[arg(long)]
    pub word_count: Option<String>,

    /// DOI to cite in the reference list (repeatable)
    #[arg(long = "doi")]
    pub dois: Vec<String>,

    /// Approve every phase without asking
    #[arg(long)]
    pub yes: bool,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default docforge.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(args) => cmd::cmd_run(&cli, args).await?,
        Commands::Phases => {
            let _guard = docforge::logging::init_tracing(cli.verbose, None)?;
            cmd::cmd_phases()?
        }
        Commands::Config { command } => {
            let _guard = docforge::logging::init_tracing(cli.verbose, None)?;
            cmd::cmd_config(cli.config.as_deref(), command.clone())?
        }
    }

    Ok(())
}

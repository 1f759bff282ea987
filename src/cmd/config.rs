//! Configuration view and init commands: `docforge config`.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::super::ConfigCommands;

pub fn cmd_config(config_path: Option<&Path>, command: Option<ConfigCommands>) -> Result<()> {
    use docforge::config::{CONFIG_FILENAME, CliOverrides, DocforgeToml, Settings, redact};

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("docforge Configuration");
            println!("======================");
            println!();

            if path.exists() {
                println!("Config file: {}", path.display());
            } else {
                println!("No {} found at {}; using defaults.", CONFIG_FILENAME, path.display());
            }
            println!();

            let file = DocforgeToml::load_or_default(&path)?;
            let settings = Settings::resolve(
                file,
                &|key: &str| std::env::var(key).ok(),
                &CliOverrides::default(),
            )?;

            println!("[provider]");
            println!("  name = \"{}\"", settings.provider);
            println!("  model = \"{}\"", settings.model);
            println!("  temperature = {}", settings.temperature);
            println!("  max_tokens = {}", settings.max_tokens);
            println!("  timeout_secs = {}", settings.timeout.as_secs());
            if let Some(url) = &settings.base_url {
                println!("  base_url = \"{}\"", url);
            }
            println!();
            println!("[document]");
            println!("  language = \"{}\"", settings.language);
            println!("  citation_style = \"{}\"", settings.citation_style);
            println!();
            println!("[output]");
            println!("  dir = \"{}\"", settings.output_dir.display());
            println!();

            let env_var = settings.provider.credential_env();
            let credential = std::env::var(env_var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| redact(v.trim()))
                .unwrap_or_else(|| console::style("(not set)").red().to_string());
            println!("Credential ({}): {}", env_var, credential);
            println!();

            if !path.exists() {
                println!("Run 'docforge config init' to create a {} file.", CONFIG_FILENAME);
                println!();
            }
        }
        Some(ConfigCommands::Init) => {
            if path.exists() {
                println!("{} already exists at {}", CONFIG_FILENAME, path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            DocforgeToml::default().save(&path)?;

            println!("Created {} at {}", CONFIG_FILENAME, path.display());
            println!();
            println!("You can now customize:");
            println!("  - [provider] name, model, temperature, max_tokens, timeout_secs, base_url");
            println!("  - [document] language, citation_style");
            println!("  - [output] dir");
            println!();
        }
    }

    Ok(())
}

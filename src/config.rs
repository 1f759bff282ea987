//! Configuration for docforge.
//!
//! Settings are layered: `docforge.toml` → environment → CLI flags, each
//! layer overriding the one before it.
//!
//! # Configuration File Format
//!
//! ```toml
//! [provider]
//! name = "openai"
//! model = "gpt-4o-mini"
//! temperature = 0.2
//! max_tokens = 3000
//! timeout_secs = 120
//! # base_url = "https://api.openai.com/v1/chat/completions"
//!
//! [document]
//! language = "English"
//! citation_style = "APA 7"
//!
//! [output]
//! dir = "dissertation_output"
//! ```
//!
//! # Environment
//!
//! | Variable                   | Overrides            |
//! |----------------------------|----------------------|
//! | `AI_EDITOR_MODEL_PROVIDER` | `provider.name`      |
//! | `AI_EDITOR_LANGUAGE_MODEL` | `provider.model`     |
//! | `OPENAI_API_KEY`           | credential (openai)  |
//! | `ANTHROPIC_API_KEY`        | credential (anthropic) |

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::prompts;
use crate::provider::{GenerationParams, ProviderKind};

pub const CONFIG_FILENAME: &str = "docforge.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "dissertation_output";

pub const PROVIDER_ENV: &str = "AI_EDITOR_MODEL_PROVIDER";
pub const MODEL_ENV: &str = "AI_EDITOR_LANGUAGE_MODEL";

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSection {
    /// `openai` or `anthropic`
    #[serde(default)]
    pub name: Option<String>,
    /// Model identifier; defaults per provider
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Full endpoint URL, e.g. a proxy or compatible server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    3000
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            name: None,
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

/// `[document]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_citation_style")]
    pub citation_style: String,
}

fn default_language() -> String {
    "English".to_string()
}

fn default_citation_style() -> String {
    "APA 7".to_string()
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            language: default_language(),
            citation_style: default_citation_style(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Contents of `docforge.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocforgeToml {
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub document: DocumentSection,
    #[serde(default)]
    pub output: OutputSection,
}

impl DocforgeToml {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::FileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}

/// Values given on the command line. `None` leaves the lower layers in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub base_url: Option<String>,
    pub language: String,
    pub citation_style: String,
    pub output_dir: PathBuf,
    /// The config file that was read, if any.
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// An explicit `config_path` must exist; otherwise `./docforge.toml` is
    /// read when present.
    pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self, ConfigError> {
        let (file, config_file) = load_file(config_path)?;
        let mut config = Self::resolve(file, |key| std::env::var(key).ok(), cli)?;
        config.config_file = config_file;
        Ok(config)
    }

    /// Merge the layers. `env` looks up an environment variable.
    ///
    /// Fails with [`ConfigError::MissingCredential`] when the selected
    /// provider has no API key, so no session can start without one.
    pub fn resolve(
        file: DocforgeToml,
        env: impl Fn(&str) -> Option<String>,
        cli: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let settings = Settings::resolve(file, &env, cli)?;

        let env_var = settings.provider.credential_env();
        let api_key = lookup(&env, env_var).ok_or_else(|| ConfigError::MissingCredential {
            provider: settings.provider.to_string(),
            env_var,
        })?;

        Ok(Self {
            provider: settings.provider,
            model: settings.model,
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: settings.timeout,
            base_url: settings.base_url,
            language: settings.language,
            citation_style: settings.citation_style,
            output_dir: settings.output_dir,
            config_file: None,
        })
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn system_prompt(&self) -> String {
        prompts::system_prompt(&self.language, &self.citation_style)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.output_dir.join("logs")
    }
}

/// Everything in [`Config`] except the credential.
///
/// Used where the effective configuration is shown without requiring a key.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub base_url: Option<String>,
    pub language: String,
    pub citation_style: String,
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn resolve(
        file: DocforgeToml,
        env: &impl Fn(&str) -> Option<String>,
        cli: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let provider_name = cli
            .provider
            .clone()
            .or_else(|| lookup(env, PROVIDER_ENV))
            .or(file.provider.name);
        let provider = match provider_name {
            Some(name) => name.parse::<ProviderKind>()?,
            None => ProviderKind::default(),
        };

        let model = cli
            .model
            .clone()
            .or_else(|| lookup(env, MODEL_ENV))
            .or(file.provider.model)
            .unwrap_or_else(|| provider.default_model().to_string());

        let temperature = file.provider.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "provider.temperature".to_string(),
                message: format!("{} is outside 0.0..=2.0", temperature),
            });
        }
        if file.provider.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "provider.max_tokens".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if file.provider.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "provider.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            provider,
            model,
            temperature,
            max_tokens: file.provider.max_tokens,
            timeout: Duration::from_secs(file.provider.timeout_secs),
            base_url: file.provider.base_url,
            language: file.document.language,
            citation_style: file.document.citation_style,
            output_dir: cli.output_dir.clone().unwrap_or(file.output.dir),
        })
    }
}

/// Read the config file, returning it with the path it came from.
pub fn load_file(config_path: Option<&Path>) -> Result<(DocforgeToml, Option<PathBuf>), ConfigError> {
    match config_path {
        Some(path) => Ok((DocforgeToml::load(path)?, Some(path.to_path_buf()))),
        None => {
            let default_path = PathBuf::from(CONFIG_FILENAME);
            if default_path.exists() {
                Ok((DocforgeToml::load(&default_path)?, Some(default_path)))
            } else {
                Ok((DocforgeToml::default(), None))
            }
        }
    }
}

/// Environment lookup treating empty or whitespace values as unset.
fn lookup(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Mask all but the last four characters of a credential.
pub fn redact(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_select_openai() {
        let config = Config::resolve(
            DocforgeToml::default(),
            env_of(&[("OPENAI_API_KEY", "sk-test")]),
            &CliOverrides::default(),
        )
        .unwrap();

        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 3000);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.output_dir, PathBuf::from("dissertation_output"));
        assert_eq!(config.api_key, "sk-test");
    }

    #[test]
    fn anthropic_default_model() {
        let config = Config::resolve(
            DocforgeToml::default(),
            env_of(&[
                ("AI_EDITOR_MODEL_PROVIDER", "Anthropic"),
                ("ANTHROPIC_API_KEY", "key"),
            ]),
            &CliOverrides::default(),
        )
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Anthropic);
        assert_eq!(config.model, "claude-3-5-sonnet-latest");
    }

    #[test]
    fn missing_credential_is_fatal() {
        let err = Config::resolve(
            DocforgeToml::default(),
            env_of(&[("AI_EDITOR_MODEL_PROVIDER", "anthropic"), ("OPENAI_API_KEY", "sk")]),
            &CliOverrides::default(),
        )
        .unwrap_err();

        match err {
            ConfigError::MissingCredential { provider, env_var } => {
                assert_eq!(provider, "anthropic");
                assert_eq!(env_var, "ANTHROPIC_API_KEY");
            }
            other => panic!("Expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let err = Config::resolve(
            DocforgeToml::default(),
            env_of(&[("OPENAI_API_KEY", "   ")]),
            &CliOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = Config::resolve(
            DocforgeToml::default(),
            env_of(&[("AI_EDITOR_MODEL_PROVIDER", "mistral")]),
            &CliOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(name) if name == "mistral"));
    }

    #[test]
    fn layers_override_in_order() {
        let file = DocforgeToml::parse(
            r#"
            [provider]
            name = "anthropic"
            model = "file-model"

            [output]
            dir = "from-file"
            "#,
        )
        .unwrap();
        let env = env_of(&[
            ("AI_EDITOR_LANGUAGE_MODEL", "env-model"),
            ("ANTHROPIC_API_KEY", "a"),
            ("OPENAI_API_KEY", "o"),
        ]);

        let from_env = Settings::resolve(file.clone(), &env, &CliOverrides::default()).unwrap();
        assert_eq!(from_env.provider, ProviderKind::Anthropic);
        assert_eq!(from_env.model, "env-model");
        assert_eq!(from_env.output_dir, PathBuf::from("from-file"));

        let cli = CliOverrides {
            provider: Some("openai".into()),
            model: Some("cli-model".into()),
            output_dir: Some(PathBuf::from("from-cli")),
        };
        let from_cli = Config::resolve(file, env, &cli).unwrap();
        assert_eq!(from_cli.provider, ProviderKind::OpenAi);
        assert_eq!(from_cli.model, "cli-model");
        assert_eq!(from_cli.api_key, "o");
        assert_eq!(from_cli.output_dir, PathBuf::from("from-cli"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = DocforgeToml::parse("[document]\nlanguage = \"German\"\n").unwrap();
        assert_eq!(file.document.language, "German");
        assert_eq!(file.document.citation_style, "APA 7");
        assert_eq!(file.provider.max_tokens, 3000);
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let file = DocforgeToml::parse("[provider]\ntemperature = 3.5\n").unwrap();
        let err = Settings::resolve(file, &env_of(&[]), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "provider.temperature"));
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let file = DocforgeToml::parse("[provider]\nmax_tokens = 0\n").unwrap();
        let err = Settings::resolve(file, &env_of(&[]), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "provider.max_tokens"));
    }

    #[test]
    fn save_and_load_default_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);

        DocforgeToml::default().save(&path).unwrap();
        let loaded = DocforgeToml::load(&path).unwrap();

        assert_eq!(loaded, DocforgeToml::default());
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[provider\nname = ").unwrap();

        let err = DocforgeToml::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileParse { .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = load_file(Some(&tmp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn generation_params_and_system_prompt() {
        let file = DocforgeToml::parse("[document]\nlanguage = \"German\"\ncitation_style = \"Harvard\"\n").unwrap();
        let config = Config::resolve(file, env_of(&[("OPENAI_API_KEY", "k")]), &CliOverrides::default()).unwrap();

        let params = config.generation_params();
        assert_eq!(params.model, "gpt-4o-mini");
        assert_eq!(params.max_tokens, 3000);

        let prompt = config.system_prompt();
        assert!(prompt.contains("German"));
        assert!(prompt.contains("Harvard"));
        assert!(!prompt.contains("{language}"));
    }

    #[test]
    fn redact_masks_all_but_tail() {
        assert_eq!(redact("sk-abcdefghijkl"), "***********ijkl");
        assert_eq!(redact("short"), "*****");
        assert_eq!(redact(""), "");
    }
}

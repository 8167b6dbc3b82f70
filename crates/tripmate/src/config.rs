//! Application settings and API keys.
//!
//! Settings come from an optional YAML file layered with `TRIPMATE_`
//! environment variables (`TRIPMATE_WORKFLOW__MAX_ROUND_TRIPS=4`). API keys
//! are read from plain environment variables, after loading a `.env` file.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::providers::configs::{GroqProviderConfig, OpenAiProviderConfig, ProviderConfig};
use crate::providers::factory::ProviderType;
use crate::providers::{groq, openai};

pub const ENV_PREFIX: &str = "TRIPMATE";
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub model_name: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl ModelSettings {
    fn named(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            host: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: ProviderType,
    #[serde(default = "default_groq")]
    pub groq: ModelSettings,
    #[serde(default = "default_openai")]
    pub openai: ModelSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderType::default(),
            groq: default_groq(),
            openai: default_openai(),
        }
    }
}

/// Bounds on one `/query` request
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default = "default_max_round_trips")]
    pub max_round_trips: usize,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl WorkflowSettings {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            max_round_trips: default_max_round_trips(),
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub workflow: WorkflowSettings,
}

impl Settings {
    /// Load from `path` (or the default location when it exists) plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        deserialize(load_config(path)?)
    }

    /// Build the provider configuration for the selected LLM
    pub fn provider_config(&self, llm_api_key: &str) -> ProviderConfig {
        match self.llm.provider {
            ProviderType::Groq => ProviderConfig::Groq(GroqProviderConfig {
                host: self
                    .llm
                    .groq
                    .host
                    .clone()
                    .unwrap_or_else(|| groq::GROQ_HOST.to_string()),
                api_key: llm_api_key.to_string(),
                model: self.llm.groq.model_name.clone(),
                temperature: self.llm.groq.temperature,
                max_tokens: self.llm.groq.max_tokens,
            }),
            ProviderType::OpenAi => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host: self
                    .llm
                    .openai
                    .host
                    .clone()
                    .unwrap_or_else(|| openai::OPENAI_HOST.to_string()),
                api_key: llm_api_key.to_string(),
                model: self.llm.openai.model_name.clone(),
                temperature: self.llm.openai.temperature,
                max_tokens: self.llm.openai.max_tokens,
            }),
        }
    }
}

/// Layer the YAML file and `TRIPMATE_` environment variables.
///
/// An explicit `path` must exist; the default path is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Yaml).required(true),
        None => File::new(DEFAULT_CONFIG_PATH, FileFormat::Yaml).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(config)
}

/// Deserialize a loaded configuration, naming the variable to set for missing fields
pub fn deserialize<T: serde::de::DeserializeOwned>(config: Config) -> Result<T, ConfigError> {
    config.try_deserialize().map_err(|err| {
        tracing::debug!("Configuration error: {:?}", &err);

        let error_str = err.to_string();
        if error_str.starts_with("missing field") {
            let field = error_str
                .trim_start_matches("missing field `")
                .trim_end_matches('`');
            ConfigError::MissingEnvVar {
                env_var: to_env_var(field),
            }
        } else if let config::ConfigError::NotFound(field) = &err {
            ConfigError::MissingEnvVar {
                env_var: to_env_var(field),
            }
        } else {
            ConfigError::Other(err)
        }
    })
}

/// `workflow.max_round_trips` -> `TRIPMATE_WORKFLOW__MAX_ROUND_TRIPS`
pub fn to_env_var(field: &str) -> String {
    format!(
        "{}_{}",
        ENV_PREFIX,
        field.replace('.', "__").to_ascii_uppercase()
    )
}

/// Keys for every remote service, read from the environment
#[derive(Clone)]
pub struct ApiKeys {
    pub llm: String,
    pub openweather: String,
    pub google_places: String,
    pub tavily: String,
    pub exchange_rate: String,
    pub amadeus_key: String,
    pub amadeus_secret: String,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKeys { .. }")
    }
}

impl ApiKeys {
    pub fn from_env(provider: ProviderType) -> Result<Self, ConfigError> {
        let llm_var = match provider {
            ProviderType::Groq => "GROQ_API_KEY",
            ProviderType::OpenAi => "OPENAI_API_KEY",
        };

        Ok(Self {
            llm: required_env(llm_var)?,
            openweather: required_env("OPENWEATHER_API_KEY")?,
            google_places: required_env("GPLACES_API_KEY")?,
            tavily: required_env("TAVILY_API_KEY")?,
            exchange_rate: required_env("EXCHANGE_RATE_API_KEY")?,
            amadeus_key: required_env("AMADEUS_API_KEY")?,
            amadeus_secret: required_env("AMADEUS_API_SECRET")?,
        })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar {
            env_var: name.to_string(),
        }),
    }
}

/// Load a `.env` file from the working directory if there is one
pub fn load_env_file() {
    match dotenv::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "could not read environment file"),
    }
}

fn default_groq() -> ModelSettings {
    ModelSettings::named(groq::GROQ_MODEL)
}

fn default_openai() -> ModelSettings {
    ModelSettings::named("gpt-4o-mini")
}

fn default_max_round_trips() -> usize {
    6
}

fn default_max_tool_rounds() -> usize {
    8
}

fn default_tool_timeout_secs() -> u64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use serial_test::serial;
    use std::env;
    use std::fs;

    const KEY_VARS: [&str; 8] = [
        "GROQ_API_KEY",
        "OPENAI_API_KEY",
        "OPENWEATHER_API_KEY",
        "GPLACES_API_KEY",
        "TAVILY_API_KEY",
        "EXCHANGE_RATE_API_KEY",
        "AMADEUS_API_KEY",
        "AMADEUS_API_SECRET",
    ];

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("TRIPMATE_") {
                env::remove_var(&key);
            }
        }
        for key in KEY_VARS {
            env::remove_var(key);
        }
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    #[serial]
    fn test_defaults_without_file() {
        clean_env();

        let settings: Settings = deserialize(
            Config::builder().build().unwrap(),
        )
        .unwrap();

        assert_eq!(settings.llm.provider, ProviderType::Groq);
        assert_eq!(settings.llm.groq.model_name, "llama-3.3-70b-versatile");
        assert_eq!(settings.llm.openai.model_name, "gpt-4o-mini");
        assert_eq!(settings.workflow.max_round_trips, 6);
        assert_eq!(settings.workflow.max_tool_rounds, 8);
        assert_eq!(settings.workflow.tool_timeout(), Duration::from_secs(20));
    }

    #[test]
    #[serial]
    fn test_yaml_file() {
        clean_env();
        let (_dir, path) = write_config(indoc! {r#"
            llm:
              provider: openai
              openai:
                model_name: "gpt-4o"
                temperature: 0.2
            workflow:
              max_round_trips: 3
        "#});

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.llm.provider, ProviderType::OpenAi);
        assert_eq!(settings.llm.openai.model_name, "gpt-4o");
        assert_eq!(settings.llm.openai.temperature, Some(0.2));
        assert_eq!(settings.workflow.max_round_trips, 3);
        assert_eq!(settings.workflow.max_tool_rounds, 8);

        match settings.provider_config("sk-test") {
            ProviderConfig::OpenAi(config) => {
                assert_eq!(config.host, "https://api.openai.com");
                assert_eq!(config.api_key, "sk-test");
                assert_eq!(config.model, "gpt-4o");
            }
            other => panic!("Expected OpenAI provider, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        let (_dir, path) = write_config("workflow:\n  max_round_trips: 3\n");
        env::set_var("TRIPMATE_WORKFLOW__MAX_ROUND_TRIPS", "9");
        env::set_var("TRIPMATE_WORKFLOW__TOOL_TIMEOUT_SECS", "5");
        env::set_var("TRIPMATE_LLM__GROQ__MODEL_NAME", "llama-3.1-8b-instant");

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.workflow.max_round_trips, 9);
        assert_eq!(settings.workflow.tool_timeout_secs, 5);
        assert_eq!(settings.llm.groq.model_name, "llama-3.1-8b-instant");
        assert_eq!(settings.provider_config("gsk").model(), "llama-3.1-8b-instant");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_bad_yaml_is_an_error() {
        clean_env();
        let (_dir, path) = write_config("llm: [unclosed\n");
        assert!(matches!(Settings::load(Some(&path)), Err(ConfigError::Other(_))));
    }

    #[test]
    #[serial]
    fn test_explicit_missing_file_is_an_error() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_api_keys_from_env() {
        clean_env();
        for key in KEY_VARS {
            env::set_var(key, format!("{}-value", key));
        }

        let keys = ApiKeys::from_env(ProviderType::OpenAi).unwrap();
        assert_eq!(keys.llm, "OPENAI_API_KEY-value");
        assert_eq!(keys.amadeus_secret, "AMADEUS_API_SECRET-value");
        assert_eq!(format!("{:?}", keys), "ApiKeys { .. }");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_api_key_names_variable() {
        clean_env();
        for key in KEY_VARS {
            env::set_var(key, "x");
        }
        env::set_var("TAVILY_API_KEY", "  ");

        match ApiKeys::from_env(ProviderType::Groq) {
            Err(ConfigError::MissingEnvVar { env_var }) => assert_eq!(env_var, "TAVILY_API_KEY"),
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }

        clean_env();
    }

    #[test]
    fn test_to_env_var() {
        assert_eq!(
            to_env_var("workflow.max_round_trips"),
            "TRIPMATE_WORKFLOW__MAX_ROUND_TRIPS"
        );
    }
}

//! Application Configuration Module
//!
//! Centralizes configuration for the interview service. Settings load
//! from environment variables (with `.env` support for local
//! development) and are validated once at startup.

use std::env;
use std::time::Duration;

use mockdrill_core::registry::RegistryConfig;
use mockdrill_core::session::SessionConfig;
use tracing::Level;

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    OpenAi,
}

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: LlmProvider,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub analyzer_url: String,
    pub host: String,
    pub port: u16,
    pub max_questions: u32,
    pub memory_limit: usize,
    pub oracle_timeout_secs: u64,
    pub analyzer_timeout_secs: u64,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `LLM_PROVIDER`: "groq" (default) or "openai".
    // *   `GROQ_API_KEY` / `OPENAI_API_KEY`: key for the selected provider.
    // *   `CHAT_MODEL`: (Optional) oracle model; defaults per provider.
    // *   `ANALYZER_URL`: (Optional) vision service base URL.
    // *   `HOST` / `PORT`: (Optional) bind address for the HTTP facade.
    // *   `MAX_QUESTIONS` / `MEMORY_LIMIT`: (Optional) session bounds.
    // *   `ORACLE_TIMEOUT_SECS` / `ANALYZER_TIMEOUT_SECS`: (Optional)
    //     bounds on external calls.
    // *   `RUST_LOG`: (Optional) logging level, defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. Useful for local development, ignored if absent.
        dotenvy::dotenv().ok();

        let provider = parse_provider(
            &env::var("LLM_PROVIDER").unwrap_or_else(|_| "groq".to_string()),
        );

        let groq_api_key = env::var("GROQ_API_KEY").ok();
        let openai_api_key = env::var("OPENAI_API_KEY").ok();

        let chat_model =
            env::var("CHAT_MODEL").unwrap_or_else(|_| default_model(provider).to_string());
        let analyzer_url =
            env::var("ANALYZER_URL").unwrap_or_else(|_| "http://localhost:8001".to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = parse_number("PORT", 8005)?;
        let max_questions = parse_number("MAX_QUESTIONS", 7)?;
        let memory_limit = parse_number("MEMORY_LIMIT", 50)?;
        let oracle_timeout_secs = parse_number("ORACLE_TIMEOUT_SECS", 20)?;
        let analyzer_timeout_secs = parse_number("ANALYZER_TIMEOUT_SECS", 10)?;

        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        let config = Self {
            provider,
            groq_api_key,
            openai_api_key,
            chat_model,
            analyzer_url,
            host,
            port,
            max_questions,
            memory_limit,
            oracle_timeout_secs,
            analyzer_timeout_secs,
            log_level,
        };

        // Validate that the required API key is present for the selected
        // provider.
        config.api_key()?;
        Ok(config)
    }

    /// The API key for the selected provider.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.provider {
            LlmProvider::Groq => self.groq_api_key.as_deref().ok_or_else(|| {
                ConfigError::MissingVar("GROQ_API_KEY must be set for groq provider".to_string())
            }),
            LlmProvider::OpenAi => self.openai_api_key.as_deref().ok_or_else(|| {
                ConfigError::MissingVar(
                    "OPENAI_API_KEY must be set for openai provider".to_string(),
                )
            }),
        }
    }

    /// Chat-completions endpoint for the selected provider.
    pub fn endpoint(&self) -> &'static str {
        match self.provider {
            LlmProvider::Groq => GROQ_ENDPOINT,
            LlmProvider::OpenAi => OPENAI_ENDPOINT,
        }
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            session: SessionConfig {
                max_questions: self.max_questions,
                memory_limit: self.memory_limit,
            },
            oracle_timeout: Duration::from_secs(self.oracle_timeout_secs),
            analyzer_timeout: Duration::from_secs(self.analyzer_timeout_secs),
        }
    }
}

fn parse_provider(raw: &str) -> LlmProvider {
    match raw.to_lowercase().as_str() {
        "openai" => LlmProvider::OpenAi,
        // Default to Groq for "groq" or any other value.
        _ => LlmProvider::Groq,
    }
}

fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Groq => "llama-3.3-70b-versatile",
        LlmProvider::OpenAi => "gpt-4o",
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parsing_defaults_to_groq() {
        assert_eq!(parse_provider("groq"), LlmProvider::Groq);
        assert_eq!(parse_provider("OPENAI"), LlmProvider::OpenAi);
        assert_eq!(parse_provider("something-else"), LlmProvider::Groq);
    }

    #[test]
    fn default_models_follow_the_provider() {
        assert_eq!(default_model(LlmProvider::Groq), "llama-3.3-70b-versatile");
        assert_eq!(default_model(LlmProvider::OpenAi), "gpt-4o");
    }

    #[test]
    fn missing_key_for_selected_provider_is_reported() {
        let config = Config {
            provider: LlmProvider::Groq,
            groq_api_key: None,
            openai_api_key: Some("sk-unused".to_string()),
            chat_model: "llama-3.3-70b-versatile".to_string(),
            analyzer_url: "http://localhost:8001".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8005,
            max_questions: 7,
            memory_limit: 50,
            oracle_timeout_secs: 20,
            analyzer_timeout_secs: 10,
            log_level: Level::INFO,
        };
        assert!(matches!(config.api_key(), Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn registry_config_carries_the_session_bounds() {
        let config = Config {
            provider: LlmProvider::Groq,
            groq_api_key: Some("key".to_string()),
            openai_api_key: None,
            chat_model: "llama-3.3-70b-versatile".to_string(),
            analyzer_url: "http://localhost:8001".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8005,
            max_questions: 5,
            memory_limit: 20,
            oracle_timeout_secs: 3,
            analyzer_timeout_secs: 2,
            log_level: Level::DEBUG,
        };
        let registry = config.registry_config();
        assert_eq!(registry.session.max_questions, 5);
        assert_eq!(registry.session.memory_limit, 20);
        assert_eq!(registry.oracle_timeout, Duration::from_secs(3));
        assert_eq!(registry.analyzer_timeout, Duration::from_secs(2));
    }
}

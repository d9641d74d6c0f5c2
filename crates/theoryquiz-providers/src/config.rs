//! Configuration loading and the provider factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use theoryquiz_core::feedback::FeedbackConfig;
use theoryquiz_core::traits::LlmProvider;

use crate::mock::MockProvider;
use crate::openai::{OpenAiProvider, DEFAULT_MODEL};

const CONFIG_FILE: &str = "theoryquiz.toml";

/// Which text-generation backend to use.
///
/// The Debug impl masks the API key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Mock {
        #[serde(default = "default_mock_response")]
        response: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mock { response } => {
                f.debug_struct("Mock").field("response", response).finish()
            }
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::OpenAI {
            api_key: String::new(),
            base_url: None,
            org_id: None,
        }
    }
}

fn default_mock_response() -> String {
    "That's a great question to reflect on!".to_string()
}

/// Deployment environment. Error detail is only shown to callers in
/// development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => anyhow::bail!("unknown environment '{other}' (expected production or development)"),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Top-level theoryquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Text-generation backend.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Max tokens per feedback response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on one provider call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional system prompt sent ahead of every feedback prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    300
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            system_prompt: None,
            environment: Environment::default(),
            server: ServerConfig::default(),
        }
    }
}

impl QuizConfig {
    /// Settings for the feedback service derived from this config.
    pub fn feedback_config(&self) -> FeedbackConfig {
        FeedbackConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system_prompt: self.system_prompt.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            expose_error_detail: self.environment == Environment::Development,
        }
    }

    /// Reject values that would only fail later at request time.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=2.0).contains(&self.temperature),
            "temperature must be between 0.0 and 2.0"
        );
        anyhow::ensure!(self.max_tokens >= 1, "max_tokens must be at least 1");
        anyhow::ensure!(self.timeout_secs >= 1, "timeout_secs must be at least 1");
        anyhow::ensure!(!self.model.trim().is_empty(), "model must not be empty");
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through as-is, never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `theoryquiz.toml` in the current directory
/// 2. `~/.config/theoryquiz/config.toml`
///
/// Environment variable overrides: `THEORYQUIZ_OPENAI_KEY` (or
/// `OPENAI_API_KEY`) and `THEORYQUIZ_ENV`.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    config.provider = resolve_provider_config(&config.provider);
    config.validate()?;

    tracing::debug!(
        path = ?config_path,
        provider = ?config.provider,
        environment = ?config.environment,
        "configuration loaded"
    );
    Ok(config)
}

fn apply_env_overrides(config: &mut QuizConfig) -> Result<()> {
    let key = api_key_from(|name| std::env::var(name).ok());
    if let (Some(key), ProviderConfig::OpenAI { api_key, .. }) = (key, &mut config.provider) {
        if api_key.is_empty() || api_key.starts_with("${") {
            *api_key = key;
        }
    }

    if let Ok(env) = std::env::var("THEORYQUIZ_ENV") {
        config.environment = env
            .parse::<Environment>()
            .context("invalid THEORYQUIZ_ENV")?;
    }
    Ok(())
}

/// First non-empty key among `THEORYQUIZ_OPENAI_KEY` and `OPENAI_API_KEY`.
fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["THEORYQUIZ_OPENAI_KEY", "OPENAI_API_KEY"]
        .into_iter()
        .find_map(|name| lookup(name).filter(|k| !k.trim().is_empty()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("theoryquiz"))
}

/// Create a provider instance from its configuration.
///
/// Fails when an OpenAI provider has no API key.
pub fn create_provider(config: &QuizConfig) -> Result<Arc<dyn LlmProvider>> {
    match &config.provider {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            anyhow::ensure!(
                !api_key.trim().is_empty(),
                "no OpenAI API key configured; set THEORYQUIZ_OPENAI_KEY or provider.api_key"
            );
            let provider = OpenAiProvider::with_timeout(
                api_key,
                base_url.clone(),
                org_id.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(provider))
        }
        ProviderConfig::Mock { response } => Ok(Arc::new(MockProvider::with_fixed_response(response))),
    }
}

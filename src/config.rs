//! Provider, model catalog and generation settings.
//!
//! Everything here is resolved once at startup and is read-only afterwards.
//! A missing credential is the only fatal condition in the whole pipeline, so
//! it is raised here, before any generation begins.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Article Forge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

/// Sent as `HTTP-Referer`; OpenRouter uses it for app attribution.
pub const APP_REFERER: &str = "";

const DEFAULT_PROVIDER: Provider = Provider::OpenRouter;
const DEFAULT_DELAY_SECS: u64 = 0;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "article_forge=info,warn"
}

/// Default directory for plan, article and HTML artifacts.
pub fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("{provider} API key not configured (set {var} in the environment or a .env file)")]
    MissingApiKey { provider: Provider, var: &'static str },

    #[error("Invalid value for {var}: {value}")]
    InvalidSetting { var: &'static str, value: String },
}

// ═══════════════════════════════════════════════════════════
// Providers
// ═══════════════════════════════════════════════════════════

/// Closed set of OpenAI-compatible providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    OpenRouter,
    Gemini,
}

impl Provider {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::OpenRouter => OPENROUTER_BASE_URL,
            Self::Gemini => GEMINI_BASE_URL,
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "gemini" => Ok(Self::Gemini),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Resolved endpoint and credential for one provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub base_url: String,
    pub api_key: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve from the process environment.
    pub fn from_env(provider: Option<Provider>) -> Result<Self, ConfigError> {
        Self::from_lookup(provider, |var| std::env::var(var).ok())
    }

    /// Resolve with an injectable variable lookup.
    ///
    /// When `provider` is `None`, `API_PROVIDER` decides, defaulting to OpenRouter.
    pub fn from_lookup<F>(provider: Option<Provider>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match provider {
            Some(p) => p,
            None => match lookup("API_PROVIDER") {
                Some(name) if !name.trim().is_empty() => name.parse()?,
                _ => DEFAULT_PROVIDER,
            },
        };

        let var = provider.api_key_var();
        let api_key = lookup(var)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let Some(api_key) = api_key else {
            tracing::error!(provider = %provider, var, "API key not found in environment");
            return Err(ConfigError::MissingApiKey { provider, var });
        };

        Ok(Self {
            provider,
            base_url: provider.base_url().to_string(),
            api_key,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Model catalog
// ═══════════════════════════════════════════════════════════

/// The pipeline stage a model call serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    /// Structured article plan.
    Plan,
    /// Section content.
    Write,
    /// Secondary review/improvement of section content.
    Review,
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plan => write!(f, "plan"),
            Self::Write => write!(f, "write"),
            Self::Review => write!(f, "review"),
        }
    }
}

/// Candidate model ids per role for the active provider.
///
/// Each call picks one candidate through a `ModelSelector`, spreading load
/// across equivalent model variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub plan: Vec<String>,
    pub write: Vec<String>,
    pub review: Vec<String>,
}

impl ModelCatalog {
    pub fn defaults_for(provider: Provider) -> Self {
        let models: &[&str] = match provider {
            Provider::OpenRouter => &["deepseek/deepseek-r1-0528:free"],
            Provider::Gemini => &["gemini-3-flash-preview"],
        };
        let owned: Vec<String> = models.iter().map(|m| m.to_string()).collect();
        Self {
            plan: owned.clone(),
            write: owned.clone(),
            review: owned,
        }
    }

    /// Provider defaults, with per-role comma-separated overrides.
    pub fn from_lookup<F>(provider: Provider, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut catalog = Self::defaults_for(provider);
        if let Some(list) = lookup("ARTICLE_PLANNER_MODELS").and_then(|v| parse_model_list(&v)) {
            catalog.plan = list;
        }
        if let Some(list) = lookup("ARTICLE_WRITER_MODELS").and_then(|v| parse_model_list(&v)) {
            catalog.write = list;
        }
        if let Some(list) = lookup("CONTENT_REVIEWER_MODELS").and_then(|v| parse_model_list(&v)) {
            catalog.review = list;
        }
        catalog
    }

    pub fn candidates(&self, role: ModelRole) -> &[String] {
        match role {
            ModelRole::Plan => &self.plan,
            ModelRole::Write => &self.write,
            ModelRole::Review => &self.review,
        }
    }
}

/// Split a comma-separated list; `None` when nothing usable remains.
fn parse_model_list(raw: &str) -> Option<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    if models.is_empty() {
        None
    } else {
        Some(models)
    }
}

// ═══════════════════════════════════════════════════════════
// Generation settings
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Pause after every subsection call (back-pressure against rate limits).
    pub delay: Duration,
    /// Per-request timeout on the model HTTP client.
    pub request_timeout: Duration,
    /// Run the secondary review pass on every section.
    pub review_enabled: bool,
    pub output_dir: PathBuf,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            review_enabled: true,
            output_dir: default_output_dir(),
        }
    }
}

impl GenerationSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(secs) = parse_secs(&lookup, "ARTICLE_DELAY_SECONDS")? {
            settings.delay = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(&lookup, "ARTICLE_TIMEOUT_SECONDS")? {
            settings.request_timeout = Duration::from_secs(secs);
        }
        Ok(settings)
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidSetting { var, value: raw }),
    }
}

//! Configuration handling for the application.
//!
//! Everything is read from environment variables with development defaults.
//! Absent credentials are not errors: a missing `SCRAPER_KEY` simply disables
//! the proxy strategy and a missing `RENDER_ENDPOINT` disables rendering.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Environment variable names. Public so tests and binaries can refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_FETCH_MAX_RETRIES: &str = "FETCH_MAX_RETRIES";
pub const ENV_RETRY_BASE_DELAY_MS: &str = "RETRY_BASE_DELAY_MS";
pub const ENV_RENDER_ENDPOINT: &str = "RENDER_ENDPOINT";
pub const ENV_RENDER_TOKEN: &str = "RENDER_TOKEN";
pub const ENV_RENDER_TIMEOUT_SECS: &str = "RENDER_TIMEOUT_SECS";
pub const ENV_SCRAPER_KEY: &str = "SCRAPER_KEY";
pub const ENV_SCRAPER_ENDPOINT: &str = "SCRAPER_ENDPOINT";
pub const ENV_PROXY_TIMEOUT_SECS: &str = "PROXY_TIMEOUT_SECS";
pub const ENV_MIN_EXTRACT_CHARS: &str = "MIN_EXTRACT_CHARS";
pub const ENV_MIN_ANALYSIS_CHARS: &str = "MIN_ANALYSIS_CHARS";
pub const ENV_ANALYSIS_BACKEND: &str = "ANALYSIS_BACKEND";
pub const ENV_ANALYSIS_ENDPOINT: &str = "ANALYSIS_ENDPOINT";
pub const ENV_ANALYSIS_MODEL: &str = "ANALYSIS_MODEL";
pub const ENV_ANALYSIS_API_KEY: &str = "ANALYSIS_API_KEY";
pub const ENV_WORKER_CONCURRENCY: &str = "WORKER_CONCURRENCY";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 12;
const DEFAULT_FETCH_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 12;
const DEFAULT_SCRAPER_ENDPOINT: &str = "https://api.scraperapi.com/";
const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MIN_EXTRACT_CHARS: usize = 100;
const DEFAULT_MIN_ANALYSIS_CHARS: usize = 200;
const DEFAULT_WORKER_CONCURRENCY: usize = 3;

const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const OPENROUTER_MODEL: &str = "deepseek/deepseek-chat-v3.1:free";
const OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
const OLLAMA_MODEL: &str = "factcheckdb";

/// Fetch-side settings shared by every strategy in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub fetch_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub render_endpoint: Option<String>,
    pub render_token: Option<String>,
    pub render_timeout: Duration,
    pub scraper_key: Option<String>,
    pub scraper_endpoint: String,
    pub proxy_timeout: Duration,
    pub min_extract_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_retries: DEFAULT_FETCH_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            render_endpoint: None,
            render_token: None,
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            scraper_key: None,
            scraper_endpoint: DEFAULT_SCRAPER_ENDPOINT.to_string(),
            proxy_timeout: Duration::from_secs(DEFAULT_PROXY_TIMEOUT_SECS),
            min_extract_chars: DEFAULT_MIN_EXTRACT_CHARS,
        }
    }
}

/// Which wire protocol the analysis collaborator speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisBackend {
    /// OpenAI-compatible `chat/completions` (OpenRouter by default).
    ChatCompletions,
    /// Ollama `api/generate`.
    Ollama,
}

impl FromStr for AnalysisBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" | "openai" | "chat" => Ok(Self::ChatCompletions),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown analysis backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub backend: AnalysisBackend,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl AnalysisConfig {
    pub fn for_backend(backend: AnalysisBackend) -> Self {
        let (endpoint, model) = match backend {
            AnalysisBackend::ChatCompletions => (OPENROUTER_ENDPOINT, OPENROUTER_MODEL),
            AnalysisBackend::Ollama => (OLLAMA_ENDPOINT, OLLAMA_MODEL),
        };
        Self {
            backend,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    database_url: Option<String>,
    fetch: FetchConfig,
    analysis: AnalysisConfig,
    min_analysis_chars: usize,
    worker_concurrency: usize,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let fetch = FetchConfig {
            fetch_timeout: Duration::from_secs(
                parse_var(ENV_FETCH_TIMEOUT_SECS, "fetch_timeout_secs")?
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
                    .clamp(1, 60),
            ),
            max_retries: parse_var(ENV_FETCH_MAX_RETRIES, "fetch_max_retries")?
                .unwrap_or(DEFAULT_FETCH_MAX_RETRIES)
                .min(5),
            retry_base_delay: Duration::from_millis(
                parse_var(ENV_RETRY_BASE_DELAY_MS, "retry_base_delay_ms")?
                    .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
            ),
            render_endpoint: non_empty_var(ENV_RENDER_ENDPOINT),
            render_token: non_empty_var(ENV_RENDER_TOKEN),
            render_timeout: Duration::from_secs(
                parse_var(ENV_RENDER_TIMEOUT_SECS, "render_timeout_secs")?
                    .unwrap_or(DEFAULT_RENDER_TIMEOUT_SECS)
                    .clamp(1, 60),
            ),
            scraper_key: non_empty_var(ENV_SCRAPER_KEY),
            scraper_endpoint: non_empty_var(ENV_SCRAPER_ENDPOINT)
                .unwrap_or_else(|| DEFAULT_SCRAPER_ENDPOINT.to_string()),
            proxy_timeout: Duration::from_secs(
                parse_var(ENV_PROXY_TIMEOUT_SECS, "proxy_timeout_secs")?
                    .unwrap_or(DEFAULT_PROXY_TIMEOUT_SECS),
            ),
            min_extract_chars: parse_var(ENV_MIN_EXTRACT_CHARS, "min_extract_chars")?
                .unwrap_or(DEFAULT_MIN_EXTRACT_CHARS),
        };

        let backend = match non_empty_var(ENV_ANALYSIS_BACKEND) {
            Some(raw) => raw
                .parse::<AnalysisBackend>()
                .map_err(|reason| ConfigError::InvalidValue {
                    field: "analysis_backend",
                    reason,
                })?,
            None => AnalysisBackend::ChatCompletions,
        };
        let mut analysis = AnalysisConfig::for_backend(backend);
        if let Some(endpoint) = non_empty_var(ENV_ANALYSIS_ENDPOINT) {
            analysis.endpoint = endpoint;
        }
        if let Some(model) = non_empty_var(ENV_ANALYSIS_MODEL) {
            analysis.model = model;
        }
        analysis.api_key = non_empty_var(ENV_ANALYSIS_API_KEY);

        Ok(Self {
            bind_addr,
            database_url: non_empty_var(ENV_DATABASE_URL),
            fetch,
            analysis,
            min_analysis_chars: parse_var(ENV_MIN_ANALYSIS_CHARS, "min_analysis_chars")?
                .unwrap_or(DEFAULT_MIN_ANALYSIS_CHARS),
            worker_concurrency: parse_var(ENV_WORKER_CONCURRENCY, "worker_concurrency")?
                .unwrap_or(DEFAULT_WORKER_CONCURRENCY)
                .clamp(1, 8),
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Postgres URL for the job store; `None` selects the in-memory store.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
    pub fn fetch(&self) -> &FetchConfig {
        &self.fetch
    }
    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }
    /// Raw text shorter than this is rejected at submission.
    pub fn min_analysis_chars(&self) -> usize {
        self.min_analysis_chars
    }
    pub fn worker_concurrency(&self) -> usize {
        self.worker_concurrency
    }
}

impl Default for Config {
    /// Development defaults (mirrors `from_env` with no env overrides).
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            fetch: FetchConfig::default(),
            analysis: AnalysisConfig::for_backend(AnalysisBackend::ChatCompletions),
            min_analysis_chars: DEFAULT_MIN_ANALYSIS_CHARS,
            worker_concurrency: DEFAULT_WORKER_CONCURRENCY,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(key: &str, field: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field,
                reason: format!("'{}': {}", raw, e),
            }),
        None => Ok(None),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 18] = [
        ENV_BIND_ADDR,
        ENV_DATABASE_URL,
        ENV_FETCH_TIMEOUT_SECS,
        ENV_FETCH_MAX_RETRIES,
        ENV_RETRY_BASE_DELAY_MS,
        ENV_RENDER_ENDPOINT,
        ENV_RENDER_TOKEN,
        ENV_RENDER_TIMEOUT_SECS,
        ENV_SCRAPER_KEY,
        ENV_SCRAPER_ENDPOINT,
        ENV_PROXY_TIMEOUT_SECS,
        ENV_MIN_EXTRACT_CHARS,
        ENV_MIN_ANALYSIS_CHARS,
        ENV_ANALYSIS_BACKEND,
        ENV_ANALYSIS_ENDPOINT,
        ENV_ANALYSIS_MODEL,
        ENV_ANALYSIS_API_KEY,
        ENV_WORKER_CONCURRENCY,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.bind_addr(), DEFAULT_BIND_ADDR);
        assert!(cfg.database_url().is_none());
        assert!(cfg.fetch().scraper_key.is_none());
        assert!(cfg.fetch().render_endpoint.is_none());
        assert_eq!(cfg.fetch().min_extract_chars, 100);
        assert_eq!(cfg.worker_concurrency(), 3);
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_BIND_ADDR, "0.0.0.0:9000");
            env::set_var(ENV_SCRAPER_KEY, "scraper-secret");
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "15");
            env::set_var(ENV_MIN_EXTRACT_CHARS, "120");
            env::set_var(ENV_ANALYSIS_BACKEND, "ollama");
            env::set_var(ENV_WORKER_CONCURRENCY, "64");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.fetch().scraper_key.as_deref(), Some("scraper-secret"));
        assert_eq!(cfg.fetch().fetch_timeout, Duration::from_secs(15));
        assert_eq!(cfg.fetch().min_extract_chars, 120);
        assert_eq!(cfg.analysis().backend, AnalysisBackend::Ollama);
        assert_eq!(cfg.analysis().endpoint, OLLAMA_ENDPOINT);
        assert_eq!(cfg.worker_concurrency(), 8);
        clear_env();
    }

    #[test]
    fn blank_credentials_are_treated_as_absent() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_SCRAPER_KEY, "   ");
        }
        let cfg = Config::from_env().unwrap();
        assert!(cfg.fetch().scraper_key.is_none());
        clear_env();
    }

    #[test]
    fn unparsable_number_is_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "soon");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("fetch_timeout_secs"));
        clear_env();
    }
}

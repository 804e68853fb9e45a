use crate::error::RadExtractError;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
pub const ENV_MODEL: &str = "RADEXTRACT_MODEL";
pub const ENV_BASE_URL: &str = "RADEXTRACT_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "RADEXTRACT_TIMEOUT_SECS";

/// Settings for the extraction service client.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// `None` waits on the service indefinitely.
    pub timeout: Option<Duration>,
}

impl ExtractorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        ExtractorConfig {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self, RadExtractError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RadExtractError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY)
            .or_else(|| get(ENV_API_KEY_FALLBACK))
            .ok_or(RadExtractError::MissingApiKey)?;

        let mut config = Self::new(api_key.trim());
        if let Some(model) = get(ENV_MODEL) {
            config.model = model.trim().to_string();
        }
        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config.timeout = timeout_from_secs(secs),
                Err(_) => {
                    tracing::warn!(
                        var = ENV_TIMEOUT_SECS,
                        value = %secs,
                        "ignoring invalid timeout, using default"
                    );
                }
            }
        }
        Ok(config)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = timeout_from_secs(secs);
        self
    }
}

/// `0` disables the timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

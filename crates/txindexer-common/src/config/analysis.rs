use {
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

use super::parse_var;
use crate::errors::{Error, Result};

/// Connection settings for the OpenAI-compatible completion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:1234".to_string(),
            model: "llama-3.2-3b-instruct".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_ms: 30_000,
        }
    }
}

impl AnalysisConfig {
    /// Reads `LM_STUDIO_URL`, `LM_STUDIO_MODEL`, `ANALYSIS_TEMPERATURE`,
    /// `ANALYSIS_MAX_TOKENS` and `ANALYSIS_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            api_url: lookup("LM_STUDIO_URL").unwrap_or(defaults.api_url),
            model: lookup("LM_STUDIO_MODEL").unwrap_or(defaults.model),
            temperature: parse_var(&lookup, "ANALYSIS_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_var(&lookup, "ANALYSIS_MAX_TOKENS", defaults.max_tokens)?,
            timeout_ms: parse_var(&lookup, "ANALYSIS_TIMEOUT_MS", defaults.timeout_ms)?,
        };
        if config.api_url.trim().is_empty() {
            return Err(Error::Config("LM_STUDIO_URL must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_config_from_lookup() {
        let config = AnalysisConfig::from_lookup(|key| match key {
            "LM_STUDIO_URL" => Some("http://lm:1234/".to_string()),
            "ANALYSIS_MAX_TOKENS" => Some("128".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.base_url(), "http://lm:1234");
        assert_eq!(config.max_tokens, 128);
        assert_eq!(config.model, "llama-3.2-3b-instruct");
    }

    #[test]
    fn test_analysis_config_bad_temperature() {
        let err = AnalysisConfig::from_lookup(|key| {
            (key == "ANALYSIS_TEMPERATURE").then(|| "warm".to_string())
        });
        assert!(matches!(err, Err(Error::Config(_))));
    }
}

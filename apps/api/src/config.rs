use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::llm_client::{gemini, openai};
use crate::models::analysis::ProviderKind;

const DEFAULT_AI_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
/// No AI credentials is a valid state: the service starts and analysis
/// requests report the provider as unavailable.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai: AiConfig,
    pub port: u16,
    pub rust_log: String,
}

/// Provider selection, credentials and per-provider defaults.
#[derive(Clone)]
pub struct AiConfig {
    /// Raw `AI_PROVIDER` value, if set.
    pub provider_override: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_model: String,
    pub openai_base_url: String,
    pub gemini_base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ai: AiConfig::from_lookup(|key| std::env::var(key).ok())?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl AiConfig {
    /// Reads AI settings through `lookup` (the process environment in production).
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = match get("AI_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("AI_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_AI_TIMEOUT_SECS,
        };

        Ok(AiConfig {
            provider_override: get("AI_PROVIDER"),
            openai_api_key: get("OPENAI_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    fn has_credentials(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::OpenAi => self.openai_api_key.is_some(),
            ProviderKind::Gemini => self.gemini_api_key.is_some(),
        }
    }

    /// The provider requests should go to.
    ///
    /// An explicit `AI_PROVIDER` wins but still needs its credential; otherwise
    /// OpenAI is preferred over Gemini. `None` means no provider is usable.
    pub fn active_provider(&self) -> Option<ProviderKind> {
        if let Some(name) = self.provider_override.as_deref() {
            let Some(kind) = ProviderKind::parse(name) else {
                warn!("AI_PROVIDER={name} is not a supported provider");
                return None;
            };
            if !self.has_credentials(kind) {
                warn!("AI_PROVIDER={kind} is set but its API key is missing");
                return None;
            }
            return Some(kind);
        }

        [ProviderKind::OpenAi, ProviderKind::Gemini]
            .into_iter()
            .find(|kind| self.has_credentials(*kind))
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("provider_override", &self.provider_override)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field("gemini_model", &self.gemini_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AiConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AiConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults_without_environment() {
        let ai = config(&[]);
        assert_eq!(ai.openai_model, "gpt-4o-mini");
        assert_eq!(ai.gemini_model, "gemini-1.5-flash");
        assert_eq!(ai.timeout, Duration::from_secs(120));
        assert_eq!(ai.active_provider(), None);
    }

    #[test]
    fn test_openai_preferred_when_both_keys_present() {
        let ai = config(&[("OPENAI_API_KEY", "sk-1"), ("GEMINI_API_KEY", "g-1")]);
        assert_eq!(ai.active_provider(), Some(ProviderKind::OpenAi));
    }

    #[test]
    fn test_gemini_used_when_only_gemini_key_present() {
        let ai = config(&[("GEMINI_API_KEY", "g-1")]);
        assert_eq!(ai.active_provider(), Some(ProviderKind::Gemini));
    }

    #[test]
    fn test_explicit_override_wins() {
        let ai = config(&[
            ("AI_PROVIDER", "Gemini"),
            ("OPENAI_API_KEY", "sk-1"),
            ("GEMINI_API_KEY", "g-1"),
        ]);
        assert_eq!(ai.active_provider(), Some(ProviderKind::Gemini));
    }

    #[test]
    fn test_override_without_credentials_is_unavailable() {
        let ai = config(&[("AI_PROVIDER", "gemini"), ("OPENAI_API_KEY", "sk-1")]);
        assert_eq!(ai.active_provider(), None);
    }

    #[test]
    fn test_unknown_override_is_unavailable() {
        let ai = config(&[("AI_PROVIDER", "claude"), ("OPENAI_API_KEY", "sk-1")]);
        assert_eq!(ai.active_provider(), None);
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let ai = config(&[("OPENAI_API_KEY", "   "), ("AI_PROVIDER", "")]);
        assert!(ai.openai_api_key.is_none());
        assert!(ai.provider_override.is_none());
        assert_eq!(ai.active_provider(), None);
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        let result = AiConfig::from_lookup(|key| {
            (key == "AI_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let ai = config(&[("OPENAI_API_KEY", "sk-secret")]);
        let rendered = format!("{ai:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

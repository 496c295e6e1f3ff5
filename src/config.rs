//! Configuration for the inference backend connection and resilience knobs.
//!
//! Values resolve from the environment with sensible production defaults;
//! every field can also be overridden programmatically through
//! [`crate::ResumeAiBuilder`].

use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;
use url::Url;

const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "anthropic/claude-3-sonnet";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
const DEFAULT_BACKOFF_CAP_MS: u64 = 10_000;
const DEFAULT_POOL_MAX_IDLE: usize = 10;

/// Connection and retry configuration for the inference backend.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Full URL of the chat-completions endpoint
    pub api_url: String,
    /// Bearer credential sent in the Authorization header
    pub api_key: Option<String>,
    /// Model identifier included in every request payload
    pub model: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Total attempts per logical send, including the first (minimum 1)
    pub max_attempts: u32,
    /// Generation length bound applied when the caller does not supply one
    pub max_tokens: u32,
    /// First retry delay; doubles per attempt up to `backoff_cap`
    pub backoff_base: Duration,
    /// Upper bound on any single retry delay
    pub backoff_cap: Duration,
    /// Bound on idle pooled connections per host
    pub pool_max_idle: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_tokens: DEFAULT_MAX_TOKENS,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            backoff_cap: Duration::from_millis(DEFAULT_BACKOFF_CAP_MS),
            pool_max_idle: DEFAULT_POOL_MAX_IDLE,
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}

impl InferenceConfig {
    /// Resolve configuration from the environment.
    ///
    /// Recognized variables:
    /// - `RESUME_AI_API_URL`, `RESUME_AI_API_KEY`, `RESUME_AI_MODEL`
    /// - `RESUME_AI_TIMEOUT_SECS` (default 30)
    /// - `RESUME_AI_MAX_RETRIES` (total attempts, default 3)
    /// - `RESUME_AI_MAX_TOKENS` (default 4000)
    /// - `RESUME_AI_POOL_MAX_IDLE` (default 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("RESUME_AI_API_URL").unwrap_or(defaults.api_url),
            api_key: env::var("RESUME_AI_API_KEY").ok(),
            model: env::var("RESUME_AI_MODEL").unwrap_or(defaults.model),
            timeout: env_u64("RESUME_AI_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_attempts: env_u64("RESUME_AI_MAX_RETRIES")
                .map(|n| (n as u32).max(1))
                .unwrap_or(defaults.max_attempts),
            max_tokens: env_u64("RESUME_AI_MAX_TOKENS")
                .map(|n| n as u32)
                .unwrap_or(defaults.max_tokens),
            backoff_base: env_u64("RESUME_AI_BACKOFF_BASE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_base),
            backoff_cap: env_u64("RESUME_AI_BACKOFF_CAP_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_cap),
            pool_max_idle: env_u64("RESUME_AI_POOL_MAX_IDLE")
                .map(|n| (n as usize).max(1))
                .unwrap_or(defaults.pool_max_idle),
        }
    }

    /// Validate the endpoint URL before any client is built.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_url).map_err(|e| {
            Error::configuration(
                format!("invalid backend URL '{}'", self.api_url),
                ErrorContext::new()
                    .with_source("inference_config")
                    .with_details(e.to_string()),
            )
        })?;
        if self.max_attempts == 0 {
            return Err(Error::configuration(
                "max_attempts must be at least 1",
                ErrorContext::new().with_source("inference_config"),
            ));
        }
        Ok(())
    }
}

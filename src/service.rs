//! Service facade tying the analyzer and optimizer to one shared backend
//! client and circuit breaker.

use crate::analyzer::{JobAnalysis, JobAnalyzer};
use crate::client::InferenceClient;
use crate::config::InferenceConfig;
use crate::optimizer::{CandidateProfile, OptimizationLevel, ResumeOptimization, ResumeOptimizer};
use crate::resilience::{
    BreakerState, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot,
};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Entry point of the inference orchestration layer.
///
/// Owns one [`InferenceClient`] and one [`CircuitBreaker`] per backend
/// endpoint; both operations share them, so failures in either feed the same
/// breaker.
///
/// ```rust,no_run
/// use resume_ai::{OptimizationLevel, ResumeAi};
///
/// # async fn run() -> resume_ai::Result<()> {
/// let service = ResumeAi::builder().build()?;
///
/// let analysis = service.analyze_job_description("...a 50+ char posting...").await?;
/// let profile = serde_json::from_str(r#"{"skills": ["Rust"]}"#).unwrap();
/// let optimization = service
///     .optimize_resume_content(&profile, &analysis, OptimizationLevel::Standard)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ResumeAi {
    analyzer: JobAnalyzer,
    optimizer: ResumeOptimizer,
    client: Arc<InferenceClient>,
}

impl ResumeAi {
    pub fn builder() -> ResumeAiBuilder {
        ResumeAiBuilder::new()
    }

    /// Analyze a free-text job description into a typed [`JobAnalysis`].
    pub async fn analyze_job_description(&self, job_description: &str) -> Result<JobAnalysis> {
        self.analyzer.analyze(job_description).await
    }

    /// Produce optimization suggestions for a candidate profile against an
    /// analyzed job.
    pub async fn optimize_resume_content(
        &self,
        profile: &CandidateProfile,
        analysis: &JobAnalysis,
        level: OptimizationLevel,
    ) -> Result<ResumeOptimization> {
        self.optimizer.optimize(profile, analysis, level).await
    }

    /// Current circuit-breaker state, for health reporting.
    ///
    /// Read-only: reporting "open" does not consume the half-open trial slot.
    pub fn breaker_state(&self) -> BreakerState {
        self.client.breaker_state()
    }

    pub fn breaker_snapshot(&self) -> CircuitBreakerSnapshot {
        self.client.breaker_snapshot()
    }
}

/// Builder resolving configuration from the environment with programmatic
/// overrides.
///
/// Breaker env knobs: `RESUME_AI_BREAKER_FAILURE_THRESHOLD` (default 5) and
/// `RESUME_AI_BREAKER_RECOVERY_SECS` (default 60). Client knobs are listed on
/// [`InferenceConfig::from_env`].
pub struct ResumeAiBuilder {
    config: InferenceConfig,
    breaker_config: CircuitBreakerConfig,
}

impl ResumeAiBuilder {
    pub fn new() -> Self {
        let threshold = std::env::var("RESUME_AI_BREAKER_FAILURE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(5);
        let recovery_secs = std::env::var("RESUME_AI_BREAKER_RECOVERY_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        Self {
            config: InferenceConfig::from_env(),
            breaker_config: CircuitBreakerConfig::new()
                .with_failure_threshold(threshold)
                .with_recovery_timeout(Duration::from_secs(recovery_secs.max(1))),
        }
    }

    /// Override the backend endpoint URL (primarily for mock servers in tests).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Total attempts per logical send, including the first.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts.max(1);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Retry backoff shape; tests shrink this to keep wall-clock time down.
    pub fn backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.config.backoff_base = base;
        self.config.backoff_cap = cap;
        self
    }

    pub fn breaker_failure_threshold(mut self, threshold: u32) -> Self {
        self.breaker_config = self.breaker_config.with_failure_threshold(threshold);
        self
    }

    pub fn breaker_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.breaker_config = self.breaker_config.with_recovery_timeout(timeout);
        self
    }

    pub fn build(self) -> Result<ResumeAi> {
        let breaker = Arc::new(CircuitBreaker::new(self.breaker_config));
        let model = self.config.model.clone();
        let client = Arc::new(InferenceClient::new(self.config, breaker)?);

        info!(model = model.as_str(), "resume-ai service initialized");

        Ok(ResumeAi {
            analyzer: JobAnalyzer::new(Arc::clone(&client)),
            optimizer: ResumeOptimizer::new(Arc::clone(&client)),
            client,
        })
    }
}

impl Default for ResumeAiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_build() {
        let service = ResumeAi::builder()
            .base_url("http://localhost:9/v1/chat/completions")
            .build()
            .unwrap();
        assert_eq!(service.breaker_state(), BreakerState::Closed);
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        assert!(ResumeAi::builder().base_url("not a url").build().is_err());
    }
}

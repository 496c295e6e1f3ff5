use crate::config::InferenceConfig;
use crate::resilience::{BreakerState, CircuitBreaker, CircuitBreakerSnapshot};
use crate::types::{ChatCompletion, Message};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use super::backoff::{delay_for_attempt, is_transient};

const TEMPERATURE: f64 = 0.7;
const BODY_PREVIEW_CHARS: usize = 200;

/// Client for one logical call to the inference backend.
///
/// Wraps `reqwest` with a per-attempt timeout, capped exponential backoff for
/// transient failures, and a shared circuit breaker consulted once per send.
/// The underlying connection pool is bounded and released with the client on
/// every exit path; dropping an in-flight `send` future aborts the pending
/// request before any breaker record is made for that attempt.
pub struct InferenceClient {
    http: reqwest::Client,
    cfg: InferenceConfig,
    breaker: Arc<CircuitBreaker>,
}

impl InferenceClient {
    pub fn new(cfg: InferenceConfig, breaker: Arc<CircuitBreaker>) -> Result<Self> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .pool_max_idle_per_host(cfg.pool_max_idle)
            .build()
            .map_err(|e| {
                Error::configuration(
                    "failed to build HTTP client",
                    ErrorContext::new()
                        .with_source("inference_client")
                        .with_details(e.to_string()),
                )
            })?;
        Ok(Self { http, cfg, breaker })
    }

    /// Current circuit state, for health reporting. Read-only.
    pub fn breaker_state(&self) -> BreakerState {
        self.breaker.state()
    }

    pub fn breaker_snapshot(&self) -> CircuitBreakerSnapshot {
        self.breaker.snapshot()
    }

    /// Perform one logical chat-completion call.
    ///
    /// The breaker gate is evaluated once per send, not per retry attempt.
    /// Only timeouts and connectivity failures retry; a 429 or any other
    /// non-2xx status surfaces immediately. Every attempt that reached the
    /// network records its outcome on the shared breaker.
    pub async fn send(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<ChatCompletion> {
        if !self.breaker.can_attempt_request() {
            let snapshot = self.breaker.snapshot();
            return Err(Error::service_unavailable(
                "inference backend temporarily unavailable due to repeated failures",
                ErrorContext::new()
                    .with_breaker_state(snapshot.state.as_str())
                    .with_source("inference_client"),
            ));
        }

        let request_id = Uuid::new_v4().to_string();
        let payload = serde_json::json!({
            "model": self.cfg.model,
            "messages": messages,
            "max_tokens": max_tokens.unwrap_or(self.cfg.max_tokens),
            "temperature": TEMPERATURE,
        });

        let start = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.execute_once(&payload, &request_id, start).await {
                Ok(envelope) => {
                    self.breaker.record_success();
                    info!(
                        request_id = request_id.as_str(),
                        attempt,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "inference request succeeded"
                    );
                    return Ok(envelope);
                }
                Err(err) => {
                    self.breaker.record_failure();
                    if is_transient(&err) && attempt < self.cfg.max_attempts {
                        let delay =
                            delay_for_attempt(self.cfg.backoff_base, self.cfg.backoff_cap, attempt);
                        warn!(
                            request_id = request_id.as_str(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "transient inference failure, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    warn!(
                        request_id = request_id.as_str(),
                        attempt,
                        kind = err.kind(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "inference request failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Single network attempt, classified into the error taxonomy.
    async fn execute_once(
        &self,
        payload: &serde_json::Value,
        request_id: &str,
        start: Instant,
    ) -> Result<ChatCompletion> {
        let mut request = self
            .http
            .post(&self.cfg.api_url)
            .header("x-request-id", request_id)
            .json(payload);
        if let Some(ref key) = self.cfg.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            let ctx = ErrorContext::new()
                .with_elapsed_ms(start.elapsed().as_millis() as u64)
                .with_source("inference_client")
                .with_details(e.to_string());
            if e.is_timeout() {
                Error::timeout(
                    format!(
                        "inference request exceeded {}s timeout",
                        self.cfg.timeout.as_secs()
                    ),
                    ctx,
                )
            } else {
                Error::service_unavailable("network error contacting inference backend", ctx)
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::rate_limited(
                "inference backend rate limit exceeded",
                ErrorContext::new()
                    .with_status_code(status)
                    .with_elapsed_ms(start.elapsed().as_millis() as u64)
                    .with_preview(truncate(&body, BODY_PREVIEW_CHARS))
                    .with_source("inference_client"),
            ));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(
                status,
                body.clone(),
                ErrorContext::new()
                    .with_status_code(status)
                    .with_elapsed_ms(start.elapsed().as_millis() as u64)
                    .with_preview(truncate(&body, BODY_PREVIEW_CHARS))
                    .with_source("inference_client"),
            ));
        }

        let body = response.text().await.map_err(|e| {
            Error::service_unavailable(
                "connection lost while reading inference response",
                ErrorContext::new()
                    .with_status_code(status)
                    .with_source("inference_client")
                    .with_details(e.to_string()),
            )
        })?;
        serde_json::from_str::<ChatCompletion>(&body).map_err(|e| {
            Error::invalid_response(
                "inference response is not a completion envelope",
                ErrorContext::new()
                    .with_status_code(status)
                    .with_preview(truncate(&body, BODY_PREVIEW_CHARS))
                    .with_source("inference_client")
                    .with_details(e.to_string()),
            )
        })
    }
}

/// Char-boundary-safe truncation for error previews.
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

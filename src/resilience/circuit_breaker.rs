use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Circuit state exposed to health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation, requests pass through
    Closed,
    /// Failures exceeded threshold, requests fail fast
    Open,
    /// Recovery timeout elapsed, exactly one trial call is allowed
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }
}

/// Point-in-time view of the breaker, for logs and health endpoints.
#[derive(Debug, Clone)]
pub struct CircuitBreakerSnapshot {
    pub state: BreakerState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    /// Remaining time before a trial call is allowed, if currently open.
    pub open_remaining_ms: Option<u64>,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Consecutive-failure circuit breaker gating calls to the inference backend.
///
/// State machine: Closed --[failures >= threshold]--> Open
/// --[recovery timeout elapsed]--> HalfOpen --[success]--> Closed;
/// HalfOpen --[failure]--> Open (the failure count is already at threshold,
/// and the fresh failure timestamp restarts the recovery clock).
///
/// All fields live behind one mutex so concurrent callers never lose a
/// failure increment or the open transition to a read-then-write race.
/// Construct one instance per backend endpoint and share it via `Arc`.
pub struct CircuitBreaker {
    cfg: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(cfg: CircuitBreakerConfig) -> Self {
        Self {
            cfg,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
        }
    }

    /// Record a successful call: reset the failure count and close the circuit.
    pub fn record_success(&self) {
        if let Ok(mut st) = self.inner.lock() {
            st.failure_count = 0;
            st.state = BreakerState::Closed;
            st.last_failure = None;
        }
    }

    /// Record a failed call, opening the circuit at the threshold.
    ///
    /// While open or half-open this also restarts the recovery clock.
    pub fn record_failure(&self) {
        if let Ok(mut st) = self.inner.lock() {
            st.failure_count = st.failure_count.saturating_add(1);
            st.last_failure = Some(Instant::now());
            if st.failure_count >= self.cfg.failure_threshold {
                if st.state != BreakerState::Open {
                    tracing::warn!(
                        failure_count = st.failure_count,
                        threshold = self.cfg.failure_threshold,
                        "circuit breaker opened"
                    );
                }
                st.state = BreakerState::Open;
            }
        }
    }

    /// Whether a new call may be attempted right now.
    ///
    /// Open circuits transition to half-open once the recovery timeout has
    /// elapsed since the last failure; the caller is then expected to issue
    /// exactly one trial call whose outcome resolves the state.
    pub fn can_attempt_request(&self) -> bool {
        let Ok(mut st) = self.inner.lock() else {
            return false;
        };
        match st.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let Some(last) = st.last_failure else {
                    return false;
                };
                if last.elapsed() >= self.cfg.recovery_timeout {
                    st.state = BreakerState::HalfOpen;
                    tracing::info!("circuit breaker half-open, allowing trial request");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Read-only state query. Never transitions; health endpoints use this to
    /// report degraded/recovering/healthy without consuming the trial slot.
    pub fn state(&self) -> BreakerState {
        self.inner
            .lock()
            .map(|st| st.state)
            .unwrap_or(BreakerState::Open)
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let Ok(st) = self.inner.lock() else {
            return CircuitBreakerSnapshot {
                state: BreakerState::Open,
                failure_count: 0,
                failure_threshold: self.cfg.failure_threshold,
                open_remaining_ms: None,
            };
        };
        let open_remaining_ms = match (st.state, st.last_failure) {
            (BreakerState::Open, Some(last)) => {
                let elapsed = last.elapsed();
                (elapsed < self.cfg.recovery_timeout)
                    .then(|| (self.cfg.recovery_timeout - elapsed).as_millis() as u64)
            }
            _ => None,
        };
        CircuitBreakerSnapshot {
            state: st.state,
            failure_count: st.failure_count,
            failure_threshold: self.cfg.failure_threshold,
            open_remaining_ms,
        }
    }
}

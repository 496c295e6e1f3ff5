//! Resilience primitives protecting calls to the inference backend.
//!
//! The backend is non-deterministic and periodically unavailable; these
//! components keep its failures from cascading into the rest of the
//! platform:
//!
//! - **Closed**: normal operation, requests pass through
//! - **Open**: consecutive failures exceeded the threshold, requests fail
//!   fast without touching the network
//! - **Half-Open**: the recovery timeout elapsed, one trial request probes
//!   whether the backend recovered
//!
//! ```rust
//! use resume_ai::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! let breaker = CircuitBreaker::new(
//!     CircuitBreakerConfig::new()
//!         .with_failure_threshold(5)
//!         .with_recovery_timeout(Duration::from_secs(60)),
//! );
//!
//! if breaker.can_attempt_request() {
//!     // call the backend...
//!     breaker.record_success();
//! }
//! ```
//!
//! Breakers are plain injected dependencies: construct one per backend
//! endpoint and share it via `Arc` across everything that calls that
//! endpoint.

pub mod circuit_breaker;

pub use circuit_breaker::{
    BreakerState, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSnapshot,
};

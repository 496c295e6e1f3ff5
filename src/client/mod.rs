//! Resilient request client for the inference backend.
//!
//! One [`InferenceClient::send`] is one logical call: circuit-breaker gate,
//! bounded retry with capped exponential backoff for transient failures, and
//! classification of every HTTP outcome into the crate's error taxonomy.

mod backoff;
mod core;

pub use self::core::InferenceClient;

//! # resume-ai
//!
//! Resilient inference orchestration for a resume/portfolio platform.
//!
//! The platform sends free-text job descriptions and candidate profile data
//! to a non-deterministic text-generation backend. That backend times out,
//! rate-limits, goes down, and replies with JSON wrapped in prose. This crate
//! is the layer that survives all of it without cascading: a circuit-breaker
//! state machine gates outbound calls, transient failures retry with capped
//! exponential backoff, and free-text completions are converted into
//! validated, typed results.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_ai::{OptimizationLevel, ResumeAi};
//!
//! #[tokio::main]
//! async fn main() -> resume_ai::Result<()> {
//!     let service = ResumeAi::builder().build()?;
//!
//!     let analysis = service
//!         .analyze_job_description("We are hiring a senior Rust engineer to ...")
//!         .await?;
//!
//!     let profile = serde_json::from_str(r#"{"skills": ["Rust", "Tokio"]}"#).unwrap();
//!     let optimization = service
//!         .optimize_resume_content(&profile, &analysis, OptimizationLevel::Standard)
//!         .await?;
//!
//!     println!("match score: {}", optimization.match_score());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`service`] | Facade: [`ResumeAi`] and its builder |
//! | [`analyzer`] | Job description validation, extraction, and mapping |
//! | [`optimizer`] | Profile-vs-job optimization with score validation |
//! | [`client`] | Resilient request client (timeout, retry, breaker gate) |
//! | [`resilience`] | Circuit breaker state machine |
//! | [`extract`] | Tolerant JSON recovery from free-text completions |
//! | [`config`] | Environment-driven configuration surface |
//! | [`types`] | Chat message and completion envelope wire types |
//!
//! Everything else the platform does (persistence, object storage, PDF
//! rendering, scraping, auth) lives outside this crate and consumes it
//! through [`ResumeAi`].

pub mod analyzer;
pub mod client;
pub mod config;
pub mod extract;
pub mod optimizer;
pub mod resilience;
pub mod service;
pub mod types;

pub mod error;

pub use analyzer::{Importance, JobAnalysis, JobAnalyzer, JobRequirement};
pub use client::InferenceClient;
pub use config::InferenceConfig;
pub use error::{Error, ErrorContext};
pub use optimizer::{
    CandidateProfile, ContentImprovement, ExperienceEntry, OptimizationLevel, ProjectEntry,
    ResumeOptimization, ResumeOptimizer,
};
pub use resilience::{BreakerState, CircuitBreaker, CircuitBreakerConfig};
pub use service::{ResumeAi, ResumeAiBuilder};
pub use types::{Message, MessageRole};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

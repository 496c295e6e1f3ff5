use thiserror::Error;

/// Structured error context attached to every error variant.
///
/// Callers use this to log, alert, or render a degraded-mode message without
/// inspecting internal state: HTTP status, elapsed wall-clock time, a bounded
/// response preview, and the component that raised the error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// HTTP status code of the failing backend response, if any
    pub status_code: Option<u16>,
    /// Wall-clock time spent before the failure surfaced, in milliseconds
    pub elapsed_ms: Option<u64>,
    /// Truncated preview of the offending payload (never the full body)
    pub preview: Option<String>,
    /// Input length that failed validation, when applicable
    pub input_length: Option<usize>,
    /// Circuit breaker state at the time of the failure ("closed"|"open"|"half_open")
    pub breaker_state: Option<&'static str>,
    /// Component that raised the error (e.g. "inference_client", "job_analyzer")
    pub source: Option<String>,
    /// Free-form detail (e.g. attempt count, underlying transport message)
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn with_input_length(mut self, len: usize) -> Self {
        self.input_length = Some(len);
        self
    }

    pub fn with_breaker_state(mut self, state: &'static str) -> Self {
        self.breaker_state = Some(state);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Unified error type for the inference orchestration layer.
///
/// One variant per failure class in the taxonomy. Validation failures never
/// reach the network; transient failures are retried before surfacing;
/// non-transient backend failures surface immediately.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {message}{}", format_context(.context))]
    InputValidation {
        message: String,
        context: ErrorContext,
    },

    #[error("Inference backend unavailable: {message}{}", format_context(.context))]
    ServiceUnavailable {
        message: String,
        context: ErrorContext,
    },

    #[error("Inference backend rate limit exceeded: {message}{}", format_context(.context))]
    RateLimited {
        message: String,
        context: ErrorContext,
    },

    #[error("Inference request timed out: {message}{}", format_context(.context))]
    Timeout {
        message: String,
        context: ErrorContext,
    },

    #[error("Inference backend returned HTTP {status}: {message}{}", format_context(.context))]
    Api {
        status: u16,
        message: String,
        context: ErrorContext,
    },

    #[error("Could not parse inference response: {message}{}", format_context(.context))]
    InvalidResponse {
        message: String,
        context: ErrorContext,
    },

    #[error("Job description analysis failed: {message}")]
    AnalysisFailed {
        message: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Resume optimization failed: {message}")]
    OptimizationFailed {
        message: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(status) = ctx.status_code {
        parts.push(format!("status: {}", status));
    }
    if let Some(elapsed) = ctx.elapsed_ms {
        parts.push(format!("elapsed_ms: {}", elapsed));
    }
    if let Some(len) = ctx.input_length {
        parts.push(format!("input_length: {}", len));
    }
    if let Some(state) = ctx.breaker_state {
        parts.push(format!("breaker: {}", state));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref preview) = ctx.preview {
        parts.push(format!("preview: {:?}", preview));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn input_validation(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InputValidation {
            message: msg.into(),
            context,
        }
    }

    pub fn service_unavailable(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::ServiceUnavailable {
            message: msg.into(),
            context,
        }
    }

    pub fn rate_limited(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::RateLimited {
            message: msg.into(),
            context,
        }
    }

    pub fn timeout(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Timeout {
            message: msg.into(),
            context,
        }
    }

    pub fn api(status: u16, msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Api {
            status,
            message: msg.into(),
            context,
        }
    }

    pub fn invalid_response(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidResponse {
            message: msg.into(),
            context,
        }
    }

    pub fn analysis_failed(msg: impl Into<String>, source: Error) -> Self {
        Error::AnalysisFailed {
            message: msg.into(),
            source: Box::new(source),
        }
    }

    pub fn optimization_failed(msg: impl Into<String>, source: Error) -> Self {
        Error::OptimizationFailed {
            message: msg.into(),
            source: Box::new(source),
        }
    }

    pub fn configuration(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Stable machine-readable tag for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InputValidation { .. } => "input_validation",
            Error::ServiceUnavailable { .. } => "service_unavailable",
            Error::RateLimited { .. } => "rate_limited",
            Error::Timeout { .. } => "timeout",
            Error::Api { .. } => "api_error",
            Error::InvalidResponse { .. } => "invalid_response",
            Error::AnalysisFailed { .. } => "analysis_failed",
            Error::OptimizationFailed { .. } => "optimization_failed",
            Error::Configuration { .. } => "configuration",
        }
    }

    /// Extract structured context if the variant carries one.
    ///
    /// Wrapper variants delegate to their cause so callers always see the
    /// innermost context (status code, preview) regardless of wrapping.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InputValidation { context, .. }
            | Error::ServiceUnavailable { context, .. }
            | Error::RateLimited { context, .. }
            | Error::Timeout { context, .. }
            | Error::Api { context, .. }
            | Error::InvalidResponse { context, .. }
            | Error::Configuration { context, .. } => Some(context),
            Error::AnalysisFailed { source, .. } | Error::OptimizationFailed { source, .. } => {
                source.context()
            }
        }
    }
}

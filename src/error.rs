//! Error types for toneform.
//!
//! Each error variant carries a stable error code (SCREAMING_SNAKE_CASE)
//! that is included in the Display output and accessible via [`ToneError::code()`].
//!
//! None of these errors ever reach the person typing: the circuit breaker
//! absorbs every remote failure and answers with the local heuristic instead.

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Authentication failed (invalid/missing API key).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// The remote service reported quota exhaustion (HTTP 429).
    pub const RATE_LIMITED: &str = "RATE_LIMITED";

    /// Request to the remote classifier failed.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// Request timed out.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Provider-side failure not covered by other variants (5xx, overload).
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";

    /// The remote answered but the body could not be understood.
    pub const RESPONSE_INVALID: &str = "RESPONSE_INVALID";

    /// Local I/O failure (config files).
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Markers that identify a rate-limit failure regardless of variant.
const RATE_LIMIT_MARKERS: &[&str] = &["HTTP 429", "RESOURCE_EXHAUSTED"];

/// Errors produced by toneform.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, thiserror::Error)]
pub enum ToneError {
    /// Invalid or missing configuration.
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    ConfigError(String),

    /// Authentication failed (invalid/missing API key).
    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    AuthError(String),

    /// The remote service is rate limiting us.
    #[error("[{}] {}", error_codes::RATE_LIMITED, .0)]
    RateLimited(String),

    /// Request to the remote classifier failed (network, bad request).
    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    RequestError(String),

    /// Request timed out.
    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    TimeoutError(String),

    /// Provider-specific error not covered by other variants.
    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    ProviderError(String),

    /// Response body was not in the expected shape.
    #[error("[{}] {}", error_codes::RESPONSE_INVALID, .0)]
    ResponseError(String),

    /// Local I/O error.
    #[error("[{}] {}", error_codes::IO_ERROR, .0)]
    Io(#[from] std::io::Error),
}

impl ToneError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => error_codes::CONFIG_INVALID,
            Self::AuthError(_) => error_codes::AUTH_FAILED,
            Self::RateLimited(_) => error_codes::RATE_LIMITED,
            Self::RequestError(_) => error_codes::REQUEST_FAILED,
            Self::TimeoutError(_) => error_codes::TIMEOUT_ERROR,
            Self::ProviderError(_) => error_codes::PROVIDER_ERROR,
            Self::ResponseError(_) => error_codes::RESPONSE_INVALID,
            Self::Io(_) => error_codes::IO_ERROR,
        }
    }

    /// Returns true if this failure carries a rate-limit signature.
    ///
    /// Matches the dedicated [`ToneError::RateLimited`] variant, and any other
    /// variant whose message mentions `HTTP 429` or a `RESOURCE_EXHAUSTED`
    /// status. Some transports only surface the raw provider payload.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Io(_) => false,
            Self::ConfigError(m)
            | Self::AuthError(m)
            | Self::RequestError(m)
            | Self::TimeoutError(m)
            | Self::ProviderError(m)
            | Self::ResponseError(m) => RATE_LIMIT_MARKERS.iter().any(|mk| m.contains(mk)),
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ToneError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn display_includes_code_prefix() {
        let err = ToneError::ConfigError("empty style pool".into());
        let display = format!("{err}");
        assert!(display.starts_with("[CONFIG_INVALID]"));
        assert!(display.contains("empty style pool"));
    }

    #[test]
    fn rate_limited_variant_is_rate_limited() {
        let err = ToneError::RateLimited("quota".into());
        assert_eq!(err.code(), "RATE_LIMITED");
        assert!(err.is_rate_limited());
    }

    #[test]
    fn resource_exhausted_marker_in_other_variant() {
        let err = ToneError::ProviderError(r#"{"status":"RESOURCE_EXHAUSTED"}"#.into());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn status_429_marker_in_request_error() {
        let err = ToneError::RequestError("HTTP 429 Too Many Requests".into());
        assert!(err.is_rate_limited());
    }

    #[test]
    fn network_and_timeout_are_not_rate_limits() {
        assert!(!ToneError::RequestError("connection refused".into()).is_rate_limited());
        assert!(!ToneError::TimeoutError("30s elapsed".into()).is_rate_limited());
        assert!(!ToneError::ProviderError("internal error".into()).is_rate_limited());
        let port = ToneError::RequestError("connection error: http://127.0.0.1:42913/".into());
        assert!(!port.is_rate_limited());
        let io = ToneError::from(std::io::Error::other("disk"));
        assert!(!io.is_rate_limited());
        assert_eq!(io.code(), "IO_ERROR");
    }

    #[test]
    fn all_codes_are_screaming_snake_case() {
        let errors = vec![
            ToneError::ConfigError("x".into()),
            ToneError::AuthError("x".into()),
            ToneError::RateLimited("x".into()),
            ToneError::RequestError("x".into()),
            ToneError::TimeoutError("x".into()),
            ToneError::ProviderError("x".into()),
            ToneError::ResponseError("x".into()),
        ];
        for err in &errors {
            let code = err.code();
            assert!(
                code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "code {code:?} is not SCREAMING_SNAKE_CASE"
            );
        }
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ToneError>();
    }
}

/// Structured tracing span names and field keys.
///
/// ```text
/// toneform.classify            (one per fired debounce)
///   └─> toneform.remote.request
/// ```
// Span names
/// One classification attempt through the breaker.
pub const SPAN_CLASSIFY: &str = "toneform.classify";

/// A single request to the remote classifier.
pub const SPAN_REMOTE_REQUEST: &str = "toneform.remote.request";

// Field keys
/// Remote provider name (e.g. "gemini", "offline").
pub const FIELD_PROVIDER: &str = "provider";

/// Model identifier.
pub const FIELD_MODEL: &str = "model";

/// Debounce generation that produced the attempt.
pub const FIELD_GENERATION: &str = "generation";

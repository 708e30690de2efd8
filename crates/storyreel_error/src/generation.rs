//! Script generation error types and transient-failure classes.

/// Generation-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to create the model client
    #[display("Failed to create model client: {}", _0)]
    ClientCreation(String),
    /// Request could not be sent or the response body could not be read
    #[display("Model request failed: {}", _0)]
    Transport(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message (response body)
        message: String,
    },
    /// Service reported an exhausted quota
    #[display("Quota exceeded: {}", _0)]
    QuotaExceeded(String),
    /// Service reported that the model is overloaded
    #[display("Model overloaded: {}", _0)]
    Overloaded(String),
    /// Response text was missing, not JSON, or had no scenes
    #[display("Malformed model response: {}", _0)]
    MalformedResponse(String),
    /// Classified failures persisted through every attempt
    #[display("Could not connect to the AI service after {} attempts: {}", attempts, last_error)]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Diagnostic text of the final failure
        last_error: String,
    },
    /// A batch failed and the generation call was aborted
    #[display("Batch {} of {} failed: {}", batch, total_batches, message)]
    BatchFailed {
        /// 1-based index of the failing batch
        batch: usize,
        /// Number of batches planned for the call
        total_batches: usize,
        /// Diagnostic text of the underlying failure
        message: String,
    },
}

impl GenerationErrorKind {
    /// Structured transient class, when the kind carries one.
    ///
    /// Returns `None` when the kind itself says nothing; callers may still
    /// classify by scanning the diagnostic text.
    pub fn transient_class(&self) -> Option<TransientClass> {
        match self {
            GenerationErrorKind::QuotaExceeded(_) => Some(TransientClass::QuotaExhausted),
            GenerationErrorKind::Overloaded(_) => Some(TransientClass::Overloaded),
            GenerationErrorKind::Http { status_code, .. } => match *status_code {
                429 => Some(TransientClass::QuotaExhausted),
                503 => Some(TransientClass::Overloaded),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Transient failure classes that are worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TransientClass {
    /// Quota or rate limit exhausted
    #[display("quota exhausted")]
    QuotaExhausted,
    /// Model temporarily overloaded
    #[display("model overloaded")]
    Overloaded,
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{GenerationError, GenerationErrorKind, TransientClass};
///
/// let err = GenerationError::new(GenerationErrorKind::Http {
///     status_code: 429,
///     message: "Resource has been exhausted".to_string(),
/// });
/// assert_eq!(err.kind.transient_class(), Some(TransientClass::QuotaExhausted));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

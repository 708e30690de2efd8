//! Online verification error types.

/// Indeterminate outcomes of an online key verification.
///
/// Both kinds mean the remote authority could not give an answer, which is
/// what allows the offline fallback to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum VerificationErrorKind {
    /// Timeout or connection failure
    #[display("Could not reach the license server: {}", _0)]
    Network(String),
    /// Non-success status other than 403/404
    #[display("License server error (HTTP {}): {}", status, message)]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
}

/// Verification error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Verification Error: {} at line {} in {}", kind, line, file)]
pub struct VerificationError {
    /// The specific error condition
    pub kind: VerificationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl VerificationError {
    /// Create a new VerificationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: VerificationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

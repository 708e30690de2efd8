//! License key error types.
//!
//! These errors are resolved locally by the offline key check and never leave
//! the activation guard; the guard turns them into user-facing messages.

/// Specific license key failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum LicenseErrorKind {
    /// Key does not have the expected shape or prefix
    #[display("Invalid license key format: {}", _0)]
    Format(String),
    /// Signature segment does not match the recomputed signature
    #[display("License key signature is invalid")]
    Signature,
    /// Expiry field decodes to an instant in the past
    #[display("License key expired on {}", _0)]
    Expired(String),
    /// Key was refused by the license server or the offline check
    #[display("License key rejected: {}", _0)]
    Rejected(String),
    /// Operation requires an unlocked activation
    #[display("Application is locked: activate a license key first")]
    Locked,
}

/// License error with location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{LicenseError, LicenseErrorKind};
///
/// let err = LicenseError::new(LicenseErrorKind::Signature);
/// assert!(format!("{}", err).contains("signature"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("License Error: {} at line {} in {}", kind, line, file)]
pub struct LicenseError {
    /// The specific error condition
    pub kind: LicenseErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl LicenseError {
    /// Create a new LicenseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: LicenseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

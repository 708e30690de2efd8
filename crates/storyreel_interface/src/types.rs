//! Types shared across trait boundaries.

use storyreel_error::{VerificationError, VerificationErrorKind};

/// Result of asking the license server about a key.
///
/// `Valid` and `Invalid` are authoritative. `Indeterminate` means the server
/// could not be asked or did not answer usefully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The server accepted the key
    Valid,
    /// The server rejected or revoked the key
    Invalid {
        /// Optional explanation from the server
        message: Option<String>,
    },
    /// No authoritative answer
    Indeterminate(VerificationErrorKind),
}

impl VerificationOutcome {
    /// Whether the offline check may be consulted.
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, VerificationOutcome::Indeterminate(_))
    }

    /// Convert an indeterminate outcome into an error value, for logging.
    #[track_caller]
    pub fn as_error(&self) -> Option<VerificationError> {
        match self {
            VerificationOutcome::Indeterminate(kind) => Some(VerificationError::new(kind.clone())),
            _ => None,
        }
    }
}

//! Mock license authority for testing.

use async_trait::async_trait;
use std::sync::Mutex;
use storyreel_interface::{LicenseAuthority, VerificationOutcome};
use storyreel_error::VerificationErrorKind;

/// License authority with a fixed answer and a record of queried keys.
pub struct MockAuthority {
    outcome: Mutex<VerificationOutcome>,
    seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockAuthority {
    /// Authority that answers `outcome` to every key.
    pub fn answering(outcome: VerificationOutcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Authority that accepts every key.
    pub fn valid() -> Self {
        Self::answering(VerificationOutcome::Valid)
    }

    /// Authority that rejects every key.
    pub fn invalid(message: Option<&str>) -> Self {
        Self::answering(VerificationOutcome::Invalid {
            message: message.map(str::to_string),
        })
    }

    /// Authority that cannot be reached.
    pub fn unreachable() -> Self {
        Self::answering(VerificationOutcome::Indeterminate(
            VerificationErrorKind::Network("connection refused".to_string()),
        ))
    }

    /// Change the answer for later calls.
    pub fn set_outcome(&self, outcome: VerificationOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    /// Number of verification calls made.
    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Keys the authority was asked about, in order.
    pub fn seen_keys(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LicenseAuthority for MockAuthority {
    async fn verify(&self, key: &str) -> VerificationOutcome {
        self.seen.lock().unwrap().push(key.to_string());
        self.outcome.lock().unwrap().clone()
    }
}

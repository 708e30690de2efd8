//! Online license verification over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storyreel_error::{HttpError, StoryreelResult, VerificationErrorKind};
use storyreel_interface::{LicenseAuthority, VerificationOutcome};
use storyreel_retry::LicenseConfig;
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    valid: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

/// License server client.
///
/// Posts `{"key": ...}` to `<endpoint>/api/verify` with a hard timeout.
#[derive(Debug, Clone)]
pub struct HttpLicenseAuthority {
    client: Client,
    verify_url: String,
}

impl HttpLicenseAuthority {
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(skip_all, fields(endpoint = %config.endpoint))]
    pub fn new(config: &LicenseConfig) -> StoryreelResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build license client: {}", e)))?;

        let verify_url = format!("{}/api/verify", config.endpoint.trim_end_matches('/'));
        debug!(url = %verify_url, "Initialized license authority");
        Ok(Self { client, verify_url })
    }

    /// Full verification URL.
    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }
}

#[async_trait]
impl LicenseAuthority for HttpLicenseAuthority {
    #[instrument(skip_all, fields(url = %self.verify_url))]
    async fn verify(&self, key: &str) -> VerificationOutcome {
        let response = match self
            .client
            .post(&self.verify_url)
            .json(&VerifyRequest { key })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "License server unreachable");
                return VerificationOutcome::Indeterminate(VerificationErrorKind::Network(
                    e.to_string(),
                ));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status, error = %e, "Failed to read license server response");
                return VerificationOutcome::Indeterminate(VerificationErrorKind::Network(
                    e.to_string(),
                ));
            }
        };

        let outcome = classify_verify_response(status, &body);
        debug!(status, ?outcome, "License server answered");
        outcome
    }
}

/// Map a license server reply to an outcome.
///
/// | status       | body                       | outcome              |
/// |--------------|----------------------------|----------------------|
/// | 403, 404     | any                        | `Invalid`            |
/// | other non-2xx| any                        | `Indeterminate`      |
/// | 2xx          | `{"valid": false, ...}`    | `Invalid` (+message) |
/// | 2xx          | anything else              | `Valid`              |
///
/// # Examples
///
/// ```
/// use storyreel_interface::VerificationOutcome;
/// use storyreel_license::classify_verify_response;
///
/// assert_eq!(classify_verify_response(200, r#"{"valid":true}"#), VerificationOutcome::Valid);
/// assert!(classify_verify_response(502, "Bad Gateway").is_indeterminate());
/// ```
pub fn classify_verify_response(status: u16, body: &str) -> VerificationOutcome {
    match status {
        403 | 404 => VerificationOutcome::Invalid {
            message: serde_json::from_str::<VerifyResponse>(body)
                .ok()
                .and_then(|r| r.message),
        },
        200..=299 => match serde_json::from_str::<VerifyResponse>(body) {
            Ok(VerifyResponse {
                valid: Some(false),
                message,
            }) => VerificationOutcome::Invalid { message },
            _ => VerificationOutcome::Valid,
        },
        _ => VerificationOutcome::Indeterminate(VerificationErrorKind::Server {
            status,
            message: body.chars().take(200).collect(),
        }),
    }
}

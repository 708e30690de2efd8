// License server response mapping and transport failures.

use storyreel_error::VerificationErrorKind;
use storyreel_interface::{LicenseAuthority, VerificationOutcome};
use storyreel_license::{HttpLicenseAuthority, classify_verify_response};
use storyreel_retry::LicenseConfig;

#[test]
fn test_forbidden_and_not_found_are_invalid() {
    assert_eq!(
        classify_verify_response(403, ""),
        VerificationOutcome::Invalid { message: None }
    );
    assert_eq!(
        classify_verify_response(404, r#"{"valid":false,"message":"Key revoked"}"#),
        VerificationOutcome::Invalid {
            message: Some("Key revoked".to_string())
        }
    );
}

#[test]
fn test_success_body_decides() {
    assert_eq!(
        classify_verify_response(200, r#"{"valid":true,"plan":"pro"}"#),
        VerificationOutcome::Valid
    );
    assert_eq!(
        classify_verify_response(200, r#"{"valid":false,"message":"Key expired"}"#),
        VerificationOutcome::Invalid {
            message: Some("Key expired".to_string())
        }
    );
    assert_eq!(
        classify_verify_response(200, r#"{"valid":false}"#),
        VerificationOutcome::Invalid { message: None }
    );
    // Anything that is not an explicit rejection counts as valid
    assert_eq!(classify_verify_response(204, ""), VerificationOutcome::Valid);
    assert_eq!(classify_verify_response(200, "OK"), VerificationOutcome::Valid);
}

#[test]
fn test_other_failures_are_indeterminate() {
    for status in [400, 401, 429, 500, 502, 503] {
        let outcome = classify_verify_response(status, "oops");
        assert_eq!(
            outcome,
            VerificationOutcome::Indeterminate(VerificationErrorKind::Server {
                status,
                message: "oops".to_string()
            })
        );
    }
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() -> anyhow::Result<()> {
    // Reserve a port, then free it so the connection is refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);

    let config = LicenseConfig {
        endpoint: format!("http://127.0.0.1:{}", port),
        timeout_secs: 2,
        ..LicenseConfig::default()
    };
    let authority = HttpLicenseAuthority::new(&config)?;

    let outcome = authority.verify("REEL-UNLIMITED-PRO-ABC").await;
    assert!(
        matches!(
            outcome,
            VerificationOutcome::Indeterminate(VerificationErrorKind::Network(_))
        ),
        "got {:?}",
        outcome
    );
    Ok(())
}

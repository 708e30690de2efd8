// Offline key format tests.

mod test_utils;

use chrono::{Duration, TimeZone, Utc};
use storyreel_error::LicenseErrorKind;
use storyreel_license::{KeyCodec, KeyExpiry, Remaining};
use test_utils::test_codec;

#[test]
fn test_issued_keys_validate() -> anyhow::Result<()> {
    let codec = test_codec();
    let expires = Utc::now() + Duration::days(90);
    let key = codec.issue(Some(expires), "PRO");

    let parsed = codec.parse(&key)?;
    assert_eq!(parsed.prefix(), "REEL");
    assert_eq!(parsed.type_code(), "PRO");
    assert_eq!(*parsed.signature(), codec.sign(parsed.expiry_field(), parsed.type_code()));
    assert!(codec.validate(&parsed));
    Ok(())
}

#[test]
fn test_unlimited_key_valid_at_any_time() -> anyhow::Result<()> {
    let codec = test_codec();
    let key = codec.issue(None, "LIFETIME");
    let parsed = codec.parse(&key)?;

    assert_eq!(codec.expiry(&parsed)?, KeyExpiry::Unlimited);
    let far_future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
    assert!(codec.validate_at(&parsed, far_future));
    assert_eq!(codec.remaining_label(&parsed), Remaining::Unlimited);
    Ok(())
}

#[test]
fn test_unlimited_literal_is_case_insensitive() -> anyhow::Result<()> {
    let codec = test_codec();
    let signature = codec.sign("unlimited", "PRO");
    let parsed = codec.parse(&format!("REEL-unlimited-PRO-{}", signature))?;
    assert_eq!(codec.expiry(&parsed)?, KeyExpiry::Unlimited);
    assert!(codec.validate(&parsed));
    Ok(())
}

#[test]
fn test_past_expiry_is_invalid() -> anyhow::Result<()> {
    let codec = test_codec();
    let expires = Utc::now() - Duration::days(1);
    let key = codec.issue(Some(expires), "PRO");
    let parsed = codec.parse(&key)?;

    assert!(!codec.validate(&parsed));
    let err = codec.check(&parsed).unwrap_err();
    assert!(matches!(err.kind, LicenseErrorKind::Expired(_)));
    assert_eq!(codec.remaining_label(&parsed), Remaining::Expired);
    Ok(())
}

#[test]
fn test_expiry_instant_is_exclusive() -> anyhow::Result<()> {
    let codec = test_codec();
    let expires = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    let parsed = codec.parse(&codec.issue(Some(expires), "PRO"))?;

    assert!(codec.validate_at(&parsed, expires - Duration::milliseconds(1)));
    assert!(!codec.validate_at(&parsed, expires));
    Ok(())
}

#[test]
fn test_any_single_signature_change_invalidates() -> anyhow::Result<()> {
    let codec = test_codec();
    let key = codec.issue(None, "PRO");
    let parsed = codec.parse(&key)?;
    let signature = parsed.signature().clone();

    for (i, original) in signature.char_indices() {
        let replacement = if original == '0' { '1' } else { '0' };
        let mut mutated = signature.clone();
        mutated.replace_range(i..i + 1, &replacement.to_string());

        let tampered = format!("REEL-UNLIMITED-PRO-{}", mutated);
        let tampered = codec.parse(&tampered)?;
        let err = codec.check(&tampered).unwrap_err();
        assert_eq!(err.kind, LicenseErrorKind::Signature, "mutation at {}", i);
    }
    Ok(())
}

#[test]
fn test_type_code_change_invalidates() -> anyhow::Result<()> {
    let codec = test_codec();
    let key = codec.issue(None, "TRIAL");
    let upgraded = key.replace("-TRIAL-", "-PRO-");
    let parsed = codec.parse(&upgraded)?;
    assert!(!codec.validate(&parsed));
    Ok(())
}

#[test]
fn test_different_secret_rejects_key() -> anyhow::Result<()> {
    let issuer = KeyCodec::new("REEL", "UNLIMITED", "one-secret");
    let checker = KeyCodec::new("REEL", "UNLIMITED", "another-secret");
    let key = issuer.issue(None, "PRO");
    assert!(!checker.validate(&checker.parse(&key)?));
    Ok(())
}

#[test]
fn test_malformed_keys_are_format_errors() {
    let codec = test_codec();
    for key in ["", "REEL", "REEL-UNLIMITED-PRO", "REEL--PRO-ABC", "XXXX-UNLIMITED-PRO-ABC"] {
        let err = codec.parse(key).unwrap_err();
        assert!(matches!(err.kind, LicenseErrorKind::Format(_)), "key {:?}", key);
    }
}

#[test]
fn test_remaining_label_rendering() {
    assert_eq!(Remaining::Unlimited.to_string(), "Unlimited");
    assert_eq!(Remaining::Years(2).to_string(), "2 years");
    assert_eq!(Remaining::Months(3).to_string(), "3 months");
    assert_eq!(Remaining::Days(12).to_string(), "12 days");
    assert_eq!(Remaining::Days(1).to_string(), "1 day");
    assert_eq!(Remaining::Expired.to_string(), "Expired");
}

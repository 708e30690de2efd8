//! Activation command handlers.

use super::setup::build_guard;
use chrono::{Duration, Utc};
use storyreel::{
    ActivationPhase, KeyCodec, LicenseError, LicenseErrorKind, StoryreelConfig, StoryreelResult,
    SubmitOutcome,
};
use tracing::info;

/// Verify `key` and store it when accepted.
///
/// A rejected key is an error so the process exits non-zero.
pub async fn handle_activate(config: &StoryreelConfig, key: &str) -> StoryreelResult<()> {
    let guard = build_guard(config)?;
    let message = activation_result(guard.submit_key(key).await)?;
    println!("✓ {}", message);
    Ok(())
}

fn activation_result(outcome: SubmitOutcome) -> StoryreelResult<String> {
    let message = outcome.message.unwrap_or_default();
    if outcome.ok {
        Ok(message)
    } else {
        Err(LicenseError::new(LicenseErrorKind::Rejected(message)).into())
    }
}

/// Check the stored key and print the result.
pub async fn handle_status(config: &StoryreelConfig) -> StoryreelResult<()> {
    let guard = build_guard(config)?;
    let state = guard.check_saved_key().await;

    println!("Status: {}", state.phase);
    if state.phase == ActivationPhase::Unlocked {
        println!("Verified: {}", state.source);
        if let Some(remaining) = guard.remaining() {
            println!("Remaining: {}", remaining);
        }
    }
    if let Some(checked) = state.last_checked_at {
        println!("Last checked: {}", checked.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(error) = state.error {
        println!("Error: {}", error);
    }
    if let Some(notice) = state.notice {
        println!("Notice: {}", notice);
    }
    Ok(())
}

/// Forget the stored key.
pub fn handle_logout(config: &StoryreelConfig) -> StoryreelResult<()> {
    build_guard(config)?.logout();
    println!("Logged out.");
    Ok(())
}

/// Print a freshly signed key.
pub fn handle_keygen(config: &StoryreelConfig, days: Option<u32>, type_code: &str) -> StoryreelResult<()> {
    let codec = KeyCodec::from_config(&config.license);
    let expires_at = days.map(|days| Utc::now() + Duration::days(i64::from(days)));
    let key = codec.issue(expires_at, type_code);

    info!(?expires_at, type_code, "Issued license key");
    println!("{}", key);
    Ok(())
}

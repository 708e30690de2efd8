//! Transient-failure classification and backoff computation.

use crate::RetryConfig;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use storyreel_error::{StoryreelError, TransientClass};

const QUOTA_MARKERS: &[&str] = &[
    "resource_exhausted",
    "resource has been exhausted",
    "quota",
    "rate limit",
    "rate_limit",
    "too many requests",
];

const OVERLOAD_MARKERS: &[&str] = &[
    "overloaded",
    "unavailable",
    "try again later",
];

static ADVISED_WAIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)retry\s+in\s+([0-9]+(?:\.[0-9]+)?)\s*s|"retryDelay"\s*:\s*"([0-9]+(?:\.[0-9]+)?)s""#)
        .expect("Valid retry delay regex")
});

static QUOTA_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b429\b").expect("Valid quota status regex"));

static OVERLOAD_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b503\b").expect("Valid overload status regex"));

/// Decide whether a failure is worth retrying.
///
/// A structured status carried by the error wins. Otherwise the diagnostic
/// text is scanned case-insensitively for quota-style markers, then for
/// overload-style markers. Bare `429`/`503` count only as whole numbers. A service-advised wait with no other marker counts
/// as quota exhaustion. Anything else is fatal (`None`).
///
/// # Examples
///
/// ```
/// use storyreel_error::{GenerationError, GenerationErrorKind, StoryreelError, TransientClass};
/// use storyreel_retry::classify;
///
/// let err: StoryreelError = GenerationError::new(GenerationErrorKind::Http {
///     status_code: 500,
///     message: "The model is overloaded. Please try again later.".into(),
/// })
/// .into();
/// assert_eq!(classify(&err), Some(TransientClass::Overloaded));
/// ```
pub fn classify(err: &StoryreelError) -> Option<TransientClass> {
    if let Some(class) = err.generation_kind().and_then(|kind| kind.transient_class()) {
        return Some(class);
    }
    classify_text(&err.diagnostic())
}

/// Classify raw diagnostic text.
pub fn classify_text(text: &str) -> Option<TransientClass> {
    let lowered = text.to_lowercase();
    if QUOTA_STATUS.is_match(text)
        || QUOTA_MARKERS.iter().any(|marker| lowered.contains(marker))
    {
        Some(TransientClass::QuotaExhausted)
    } else if OVERLOAD_STATUS.is_match(text)
        || OVERLOAD_MARKERS.iter().any(|marker| lowered.contains(marker))
    {
        Some(TransientClass::Overloaded)
    } else if advised_wait(text).is_some() {
        Some(TransientClass::QuotaExhausted)
    } else {
        None
    }
}

/// Wait advised by the service ("Please retry in 12.5s"), if any.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyreel_retry::advised_wait;
///
/// assert_eq!(advised_wait("Please retry in 12.5s."), Some(Duration::from_secs_f64(12.5)));
/// assert_eq!(advised_wait("no hint here"), None);
/// ```
pub fn advised_wait(text: &str) -> Option<Duration> {
    let captures = ADVISED_WAIT.captures(text)?;
    let seconds = captures
        .get(1)
        .or_else(|| captures.get(2))?
        .as_str()
        .parse::<f64>()
        .ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

/// Wait before the attempt after `attempt` (1-based) failed.
///
/// 1. advised wait ⇒ ceil(advised) + margin
/// 2. quota ⇒ attempt × quota step
/// 3. overload ⇒ base × 2^(attempt − 1)
pub fn backoff(
    config: &RetryConfig,
    class: TransientClass,
    attempt: u32,
    advised: Option<Duration>,
) -> Duration {
    if let Some(advised) = advised {
        let whole = advised.as_secs_f64().ceil() as u64;
        return Duration::from_secs(whole + config.advised_margin_secs);
    }
    let attempt = attempt.max(1);
    match class {
        TransientClass::QuotaExhausted => {
            Duration::from_secs(config.quota_step_secs.saturating_mul(u64::from(attempt)))
        }
        TransientClass::Overloaded => {
            let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
            Duration::from_secs(config.overload_base_secs.saturating_mul(factor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advised_wait_is_ceiled_plus_margin() {
        let config = RetryConfig::default();
        let wait = backoff(
            &config,
            TransientClass::QuotaExhausted,
            4,
            Some(Duration::from_secs_f64(12.2)),
        );
        assert_eq!(wait, Duration::from_secs(16));
    }

    #[test]
    fn test_quota_table() {
        let config = RetryConfig::default();
        let waits: Vec<u64> = (1..=3)
            .map(|attempt| backoff(&config, TransientClass::QuotaExhausted, attempt, None).as_secs())
            .collect();
        assert_eq!(waits, vec![20, 40, 60]);
    }

    #[test]
    fn test_overload_table() {
        let config = RetryConfig::default();
        let waits: Vec<u64> = (1..=4)
            .map(|attempt| backoff(&config, TransientClass::Overloaded, attempt, None).as_secs())
            .collect();
        assert_eq!(waits, vec![5, 10, 20, 40]);
    }

    #[test]
    fn test_overload_does_not_overflow() {
        let config = RetryConfig::default();
        let wait = backoff(&config, TransientClass::Overloaded, 200, None);
        assert_eq!(wait, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_classify_text_markers() {
        assert_eq!(
            classify_text("RESOURCE_EXHAUSTED: You exceeded your current quota"),
            Some(TransientClass::QuotaExhausted)
        );
        assert_eq!(
            classify_text("The model is Overloaded"),
            Some(TransientClass::Overloaded)
        );
        assert_eq!(
            classify_text("Please retry in 3s"),
            Some(TransientClass::QuotaExhausted)
        );
        assert_eq!(classify_text("invalid API key"), None);
    }

    #[test]
    fn test_status_codes_match_whole_numbers_only() {
        assert_eq!(
            classify_text("HTTP 429 from upstream"),
            Some(TransientClass::QuotaExhausted)
        );
        assert_eq!(classify_text("status: 503"), Some(TransientClass::Overloaded));
        assert_eq!(
            classify_text("HTTP 400: prompt is 14290 tokens, limit 15030"),
            None
        );
    }

    #[test]
    fn test_retry_delay_field() {
        let body = r#"{"error":{"details":[{"retryDelay": "41s"}]}}"#;
        assert_eq!(advised_wait(body), Some(Duration::from_secs(41)));
    }
}

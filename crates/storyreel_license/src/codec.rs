//! Offline license key format.
//!
//! A key has four dash-separated segments:
//!
//! ```text
//! REEL-19A6C3F2400-PRO-5F1B2C3D
//! ^    ^           ^   ^
//! |    |           |   signature: uppercase hex of mix_hash(expiry + "-" + type + secret)
//! |    |           type code
//! |    expiry: epoch milliseconds in hex, or the unlimited literal
//! prefix
//! ```
//!
//! The signature is a non-cryptographic checksum. It only lets the app keep
//! working while the license server is unreachable; the server stays the
//! authority on revocation.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use storyreel_error::{LicenseError, LicenseErrorKind};
use storyreel_retry::LicenseConfig;

const DAY_MS: i64 = 86_400_000;

/// The four segments of a license key.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ParsedKey {
    prefix: String,
    expiry_field: String,
    type_code: String,
    signature: String,
}

/// Decoded expiry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyExpiry {
    /// Never expires
    Unlimited,
    /// Expires at this instant
    At(DateTime<Utc>),
}

/// Time left on a key, bucketed for display.
///
/// # Examples
///
/// ```
/// use storyreel_license::Remaining;
///
/// assert_eq!(Remaining::Months(3).to_string(), "3 months");
/// assert_eq!(Remaining::Years(1).to_string(), "1 year");
/// assert_eq!(Remaining::Expired.to_string(), "Expired");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Remaining {
    /// Unlimited key
    #[display("Unlimited")]
    Unlimited,
    /// More than 365 days left
    #[display("{} year{}", _0, plural(*_0))]
    Years(i64),
    /// More than 30 days left
    #[display("{} month{}", _0, plural(*_0))]
    Months(i64),
    /// 30 days or fewer left
    #[display("{} day{}", _0, plural(*_0))]
    Days(i64),
    /// Expiry has passed
    #[display("Expired")]
    Expired,
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Parses, signs and validates offline license keys.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: String,
    unlimited_literal: String,
    secret: String,
}

impl KeyCodec {
    /// Create a codec.
    pub fn new(
        prefix: impl Into<String>,
        unlimited_literal: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            unlimited_literal: unlimited_literal.into(),
            secret: secret.into(),
        }
    }

    /// Create a codec from the `[license]` configuration section.
    pub fn from_config(config: &LicenseConfig) -> Self {
        Self::new(
            config.key_prefix.clone(),
            config.unlimited_literal.clone(),
            config.signing_secret.clone(),
        )
    }

    /// Split a key into its segments.
    ///
    /// # Errors
    ///
    /// `LicenseErrorKind::Format` unless the key has exactly four segments
    /// and the configured prefix.
    pub fn parse(&self, key: &str) -> Result<ParsedKey, LicenseError> {
        let segments: Vec<&str> = key.trim().split('-').collect();
        let [prefix, expiry_field, type_code, signature] = segments.as_slice() else {
            return Err(LicenseError::new(LicenseErrorKind::Format(format!(
                "expected 4 segments, found {}",
                segments.len()
            ))));
        };

        if *prefix != self.prefix {
            return Err(LicenseError::new(LicenseErrorKind::Format(format!(
                "unknown prefix '{}'",
                prefix
            ))));
        }
        if expiry_field.is_empty() || type_code.is_empty() || signature.is_empty() {
            return Err(LicenseError::new(LicenseErrorKind::Format(
                "empty segment".to_string(),
            )));
        }

        Ok(ParsedKey {
            prefix: prefix.to_string(),
            expiry_field: expiry_field.to_string(),
            type_code: type_code.to_string(),
            signature: signature.to_string(),
        })
    }

    /// Signature for an expiry field and type code.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyreel_license::KeyCodec;
    ///
    /// let codec = KeyCodec::new("REEL", "UNLIMITED", "secret");
    /// let signature = codec.sign("UNLIMITED", "PRO");
    /// assert_eq!(signature, signature.to_uppercase());
    /// assert_eq!(signature, codec.sign("UNLIMITED", "PRO"));
    /// ```
    pub fn sign(&self, expiry_field: &str, type_code: &str) -> String {
        let material = format!("{}-{}{}", expiry_field, type_code, self.secret);
        format!("{:X}", mix_hash(&material))
    }

    /// Decode the expiry field.
    ///
    /// # Errors
    ///
    /// `LicenseErrorKind::Format` if the field is neither the unlimited
    /// literal nor a hex millisecond timestamp.
    pub fn expiry(&self, parsed: &ParsedKey) -> Result<KeyExpiry, LicenseError> {
        let field = parsed.expiry_field();
        if field.eq_ignore_ascii_case(&self.unlimited_literal) {
            return Ok(KeyExpiry::Unlimited);
        }

        i64::from_str_radix(field, 16)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(KeyExpiry::At)
            .ok_or_else(|| {
                LicenseError::new(LicenseErrorKind::Format(format!(
                    "expiry '{}' is not a hex timestamp",
                    field
                )))
            })
    }

    /// Check signature and expiry against an explicit instant.
    ///
    /// # Errors
    ///
    /// `Signature` on mismatch, `Expired` when `now` is at or past the
    /// expiry, `Format` when the expiry cannot be decoded.
    pub fn check_at(&self, parsed: &ParsedKey, now: DateTime<Utc>) -> Result<(), LicenseError> {
        let expected = self.sign(parsed.expiry_field(), parsed.type_code());
        if *parsed.signature() != expected {
            return Err(LicenseError::new(LicenseErrorKind::Signature));
        }

        match self.expiry(parsed)? {
            KeyExpiry::Unlimited => Ok(()),
            KeyExpiry::At(expires_at) if now < expires_at => Ok(()),
            KeyExpiry::At(expires_at) => Err(LicenseError::new(LicenseErrorKind::Expired(
                expires_at.format("%Y-%m-%d").to_string(),
            ))),
        }
    }

    /// Check signature and expiry against the current time.
    pub fn check(&self, parsed: &ParsedKey) -> Result<(), LicenseError> {
        self.check_at(parsed, Utc::now())
    }

    /// Whether the key is valid at `now`.
    pub fn validate_at(&self, parsed: &ParsedKey, now: DateTime<Utc>) -> bool {
        self.check_at(parsed, now).is_ok()
    }

    /// Whether the key is valid now.
    pub fn validate(&self, parsed: &ParsedKey) -> bool {
        self.check(parsed).is_ok()
    }

    /// Parse and check a raw key in one step.
    pub fn verify(&self, key: &str) -> Result<ParsedKey, LicenseError> {
        let parsed = self.parse(key)?;
        self.check(&parsed)?;
        Ok(parsed)
    }

    /// Time left on the key at `now`.
    pub fn remaining_label_at(&self, parsed: &ParsedKey, now: DateTime<Utc>) -> Remaining {
        let expires_at = match self.expiry(parsed) {
            Ok(KeyExpiry::Unlimited) => return Remaining::Unlimited,
            Ok(KeyExpiry::At(expires_at)) => expires_at,
            Err(_) => return Remaining::Expired,
        };

        let left_ms = (expires_at - now).num_milliseconds();
        if left_ms <= 0 {
            return Remaining::Expired;
        }
        let days = (left_ms + DAY_MS - 1) / DAY_MS;
        if days > 365 {
            Remaining::Years(days / 365)
        } else if days > 30 {
            Remaining::Months(days / 30)
        } else {
            Remaining::Days(days)
        }
    }

    /// Time left on the key now.
    pub fn remaining_label(&self, parsed: &ParsedKey) -> Remaining {
        self.remaining_label_at(parsed, Utc::now())
    }

    /// Produce a signed key.
    ///
    /// `None` issues an unlimited key.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyreel_license::KeyCodec;
    ///
    /// let codec = KeyCodec::new("REEL", "UNLIMITED", "secret");
    /// let key = codec.issue(None, "pro");
    /// assert!(key.starts_with("REEL-UNLIMITED-PRO-"));
    /// assert!(codec.verify(&key).is_ok());
    /// ```
    pub fn issue(&self, expires_at: Option<DateTime<Utc>>, type_code: &str) -> String {
        let expiry_field = match expires_at {
            Some(at) => format!("{:X}", at.timestamp_millis()),
            None => self.unlimited_literal.to_uppercase(),
        };
        let type_code = type_code.trim().to_uppercase();
        let signature = self.sign(&expiry_field, &type_code);
        format!("{}-{}-{}-{}", self.prefix, expiry_field, type_code, signature)
    }
}

/// Shift-and-subtract string hash (`h = h * 31 + c` on wrapping 32-bit), made positive.
fn mix_hash(input: &str) -> u32 {
    input.chars().fold(0i32, |hash, c| {
        (hash << 5).wrapping_sub(hash).wrapping_add(c as u32 as i32)
    })
    .unsigned_abs()
}

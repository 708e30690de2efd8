//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, GenerationError, HttpError, JsonError, LicenseError,
    StorageError, VerificationError,
};

/// Every error condition a Storyreel crate can raise.
///
/// # Examples
///
/// ```
/// use storyreel_error::{StoryreelError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: StoryreelError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryreelErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Activation store error
    #[from(StorageError)]
    Storage(StorageError),
    /// License key error
    #[from(LicenseError)]
    License(LicenseError),
    /// Online verification error
    #[from(VerificationError)]
    Verification(VerificationError),
    /// Script generation error
    #[from(GenerationError)]
    Generation(GenerationError),
}

/// Storyreel error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyreel_error::{StoryreelResult, ConfigError};
///
/// fn might_fail() -> StoryreelResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyreel Error: {}", _0)]
pub struct StoryreelError(Box<StoryreelErrorKind>);

impl StoryreelError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryreelErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryreelErrorKind {
        &self.0
    }

    /// The error's message without source location.
    ///
    /// Location suffixes contain line numbers, so anything that scans error
    /// text for status codes must read this instead of `Display`.
    ///
    /// ```
    /// use storyreel_error::{GenerationError, GenerationErrorKind, StoryreelError};
    ///
    /// let err: StoryreelError =
    ///     GenerationError::new(GenerationErrorKind::Transport("connection reset".into())).into();
    /// assert_eq!(err.diagnostic(), "Model request failed: connection reset");
    /// ```
    pub fn diagnostic(&self) -> String {
        match self.kind() {
            StoryreelErrorKind::Http(e) => e.message.clone(),
            StoryreelErrorKind::Json(e) => e.message.clone(),
            StoryreelErrorKind::Config(e) => e.message.clone(),
            StoryreelErrorKind::Builder(e) => e.kind().to_string(),
            StoryreelErrorKind::Storage(e) => e.kind.to_string(),
            StoryreelErrorKind::License(e) => e.kind.to_string(),
            StoryreelErrorKind::Verification(e) => e.kind.to_string(),
            StoryreelErrorKind::Generation(e) => e.kind.to_string(),
        }
    }

    /// The generation error kind, if this is a generation error.
    pub fn generation_kind(&self) -> Option<&crate::GenerationErrorKind> {
        match self.kind() {
            StoryreelErrorKind::Generation(e) => Some(&e.kind),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to StoryreelErrorKind
impl<T> From<T> for StoryreelError
where
    T: Into<StoryreelErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyreel operations.
pub type StoryreelResult<T> = std::result::Result<T, StoryreelError>;

//! Activation store error types.

/// Kinds of storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create the store directory
    #[display("Failed to create store directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write the store file
    #[display("Failed to write store file: {}", _0)]
    FileWrite(String),
    /// Failed to read the store file
    #[display("Failed to read store file: {}", _0)]
    FileRead(String),
    /// Failed to delete the store file
    #[display("Failed to delete store file: {}", _0)]
    FileDelete(String),
    /// No usable location for the store
    #[display("Invalid store path: {}", _0)]
    InvalidPath(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::FileRead("permission denied".to_string()));
/// assert!(format!("{}", err).contains("permission denied"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

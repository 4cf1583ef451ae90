use std::{fmt, io, path::PathBuf};

/// Crate-wide `Result` type using [`LogsiftError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, LogsiftError>;

/// Top-level error type for logsift operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum LogsiftError {
    /// Configuration errors (file loading, environment resolution).
    Config(ConfigError),

    /// Search backend errors (index lookup, snapshot lifecycle, queries).
    Backend(BackendError),

    /// Extraction pipeline errors (chunk writing, invalid run parameters).
    Extract(ExtractError),

    /// I/O errors.
    Io(io::Error),

    /// HTTP transport errors.
    Http(reqwest::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(PathBuf),

    /// Config file could not be parsed.
    InvalidFormat(String),

    /// Named environment is not defined in the config file.
    UnknownEnvironment(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Backend-specific errors.
///
/// `IndexNotFound` and `SnapshotOpenFailed` are fatal preconditions for a
/// run. `SnapshotCloseFailed` is special-cased by the snapshot manager and
/// never fails a run on its own.
#[derive(Debug)]
pub enum BackendError {
    /// The target index does not exist on the backend.
    IndexNotFound(String),

    /// The backend could not be reached at all.
    Unreachable(String),

    /// Opening the point-in-time snapshot failed.
    SnapshotOpenFailed(String),

    /// Closing the point-in-time snapshot failed.
    SnapshotCloseFailed(String),

    /// A paged search request failed.
    QueryFailed(String),

    /// The backend answered with a payload we could not interpret.
    UnexpectedResponse(String),
}

/// Extraction-specific errors.
#[derive(Debug)]
pub enum ExtractError {
    /// Writing a chunk to disk failed.
    ChunkWriteFailed {
        path: PathBuf,
        records: usize,
        source: io::Error,
    },

    /// Run parameters that cannot produce a valid extraction.
    InvalidParameters(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for LogsiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogsiftError::Config(e) => write!(f, "Configuration error: {e}"),
            LogsiftError::Backend(e) => write!(f, "Backend error: {e}"),
            LogsiftError::Extract(e) => write!(f, "Extraction error: {e}"),
            LogsiftError::Io(e) => write!(f, "I/O error: {e}"),
            LogsiftError::Http(e) => write!(f, "HTTP error: {e}"),
            LogsiftError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::UnknownEnvironment(name) => {
                write!(f, "Unknown environment: '{name}'")
            }
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::IndexNotFound(index) => {
                write!(f, "Index '{index}' does not exist")
            }
            BackendError::Unreachable(msg) => write!(f, "Backend unreachable: {msg}"),
            BackendError::SnapshotOpenFailed(msg) => {
                write!(f, "Failed to open snapshot: {msg}")
            }
            BackendError::SnapshotCloseFailed(msg) => {
                write!(f, "Failed to close snapshot: {msg}")
            }
            BackendError::QueryFailed(msg) => write!(f, "Search query failed: {msg}"),
            BackendError::UnexpectedResponse(msg) => {
                write!(f, "Unexpected backend response: {msg}")
            }
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::ChunkWriteFailed {
                path,
                records,
                source,
            } => write!(
                f,
                "Failed to write chunk of {records} record(s) to '{}': {source}",
                path.display()
            ),
            ExtractError::InvalidParameters(msg) => write!(f, "Invalid parameters: {msg}"),
        }
    }
}

impl std::error::Error for LogsiftError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for BackendError {}
impl std::error::Error for ExtractError {}

/* ========================= Conversions to LogsiftError ========================= */

impl From<io::Error> for LogsiftError {
    fn from(err: io::Error) -> Self {
        LogsiftError::Io(err)
    }
}

impl From<reqwest::Error> for LogsiftError {
    fn from(err: reqwest::Error) -> Self {
        LogsiftError::Http(err)
    }
}

impl From<ConfigError> for LogsiftError {
    fn from(err: ConfigError) -> Self {
        LogsiftError::Config(err)
    }
}

impl From<BackendError> for LogsiftError {
    fn from(err: BackendError) -> Self {
        LogsiftError::Backend(err)
    }
}

impl From<ExtractError> for LogsiftError {
    fn from(err: ExtractError) -> Self {
        LogsiftError::Extract(err)
    }
}

impl From<String> for LogsiftError {
    fn from(msg: String) -> Self {
        LogsiftError::Generic(msg)
    }
}

impl From<&str> for LogsiftError {
    fn from(msg: &str) -> Self {
        LogsiftError::Generic(msg.to_owned())
    }
}

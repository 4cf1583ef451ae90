//! Error handling for logsift.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! [`LogsiftError`] wraps the more specific kinds (configuration, backend,
//! extraction, I/O, transport). Components never exit the process themselves;
//! errors are carried up to `main`, which alone decides the exit status.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{BackendError, ConfigError, ExtractError, LogsiftError, Result};

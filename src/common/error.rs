//! Error types for the trigger CLI
//!
//! Messages are written for the tester reading the transcript, with a hint
//! where one helps.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the trigger CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Test Case Errors ===
    #[error("unknown test case {0}")]
    UnknownTestCase(String),

    #[error("Invalid test case '{id}': {reason}")]
    InvalidDescriptor { id: String, reason: String },

    #[error("Invalid test case table: {0}")]
    TableParse(String),

    // === Server Errors ===
    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not resolve device endpoint: {0}")]
    DeviceResolution(String),

    #[error("Invalid server base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // === Configuration Errors ===
    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create an invalid descriptor error
    pub fn invalid_descriptor(id: &str, reason: &str) -> Self {
        Self::InvalidDescriptor {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a device resolution error
    pub fn device_resolution<S: Into<String>>(reason: S) -> Self {
        Self::DeviceResolution(reason.into())
    }

    /// Whether this error only ends the current test case
    ///
    /// These are reported as diagnostics on stdout and the process still
    /// exits normally.
    pub fn is_test_case_failure(&self) -> bool {
        matches!(
            self,
            Error::UnknownTestCase(_) | Error::Network(_) | Error::DeviceResolution(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // reqwest hides the root cause behind "error sending request"
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        Error::Network(message)
    }
}

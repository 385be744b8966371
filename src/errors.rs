use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid selector chain: {0}")]
    InvalidChain(String),

    #[error("JavaScript execution failed: {0}")]
    JavaScriptFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Verification aborted: {message}")]
    VerificationAborted {
        message: String,
        screenshot: Option<PathBuf>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Chrome error: {0}")]
    ChromeError(String),

    #[error("Anyhow error: {0}")]
    AnyhowError(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;

// Convert anyhow::Error to HarnessError
impl From<anyhow::Error> for HarnessError {
    fn from(err: anyhow::Error) -> Self {
        HarnessError::AnyhowError(err.to_string())
    }
}

impl HarnessError {
    /// Whether this error is the recoverable "element absent" class.
    ///
    /// A selector chain swallows these and falls through to its next
    /// candidate; every other variant aborts the lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HarnessError::ElementNotFound(_))
    }
}

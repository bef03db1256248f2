use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds of an autofill call. `Display` is the message shown to the caller.
#[derive(Error, Debug)]
pub enum AutofillError {
    /// The form template file does not exist. Holds the configured path, which
    /// is logged but never shown to the caller.
    #[error("Server configuration error: 'sample.json' not found.")]
    Configuration(PathBuf),

    #[error("The AI service returned an invalid format.")]
    ResponseFormat,

    #[error("An internal server error occurred: {0}")]
    Internal(String),
}

impl AutofillError {
    /// Stable short name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AutofillError::Configuration(_) => "configuration",
            AutofillError::ResponseFormat => "response_format",
            AutofillError::Internal(_) => "internal",
        }
    }
}

impl From<anyhow::Error> for AutofillError {
    fn from(err: anyhow::Error) -> Self {
        AutofillError::Internal(format!("{err:#}"))
    }
}

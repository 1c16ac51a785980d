use thiserror::Error;

use crate::provider::Provider;

/// Failure of a single report request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("No records to analyze")]
    EmptyDataset,

    #[error("{} API key not configured", .provider.display_name())]
    MissingCredential { provider: Provider },

    #[error("Could not serialize records: {message}")]
    Encode { message: String },

    #[error("Request failed: {message}")]
    Transport { message: String },

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No response from AI")]
    EmptyResponse,

    #[error("Malformed report payload: {message}")]
    MalformedResponse { message: String },
}

impl ReportError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse { message: message.into() }
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

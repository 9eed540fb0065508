//! Error types shared by the generation pipeline.

use thiserror::Error;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::BookmarkError;

/// Failure of one study guide generation, tagged by the stage that failed.
#[derive(Debug, Error)]
pub enum GuideError {
    /// The user supplied fields were rejected before any request was issued.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// The content service could not produce text for the prompt.
    #[error("content service unavailable: {0}")]
    ServiceUnavailable(#[from] ServiceError),

    /// The section map could not be serialized into a PDF.
    #[error("study guide serialization failed: {0}")]
    SerializationFailed(#[from] RenderError),
}

impl GuideError {
    /// Returns `true` for errors caused by the user's input rather than the system.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputInvalid(_))
    }
}

/// Errors raised while talking to the content service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("service returned no text{}", blocked_suffix(.block_reason))]
    EmptyResponse { block_reason: Option<String> },

    #[error("response decoding failed: {0}")]
    Decode(#[from] serde_json::Error),
}

fn blocked_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" (blocked: {reason})"),
        None => String::new(),
    }
}

/// Errors raised while serializing a section map into a PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] genpdf::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "bookmarks")]
    #[error("bookmark generation failed: {0}")]
    Bookmarks(#[from] BookmarkError),
}

/// Errors raised while reading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

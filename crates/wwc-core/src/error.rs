use std::error::Error as _;

use thiserror::Error;

/// Shown when the backend answers successfully but without usable image data.
pub const NO_IMAGE_DATA_MESSAGE: &str = "No image data received from the server";

/// Last-resort message when neither the backend nor the transport says anything useful.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate infographic. Please try again.";

/// Failure of a call to the infographic backend.
///
/// All variants end up in the same user-visible error state; see
/// [`GenerateError::user_message`] for which text is shown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// Success status, but the body is not JSON or lacks a usable `image_base64`.
    #[error("malformed response from backend")]
    MalformedResponse,

    /// Non-success HTTP status, optionally with a structured `detail` message.
    #[error("backend returned HTTP {status}")]
    Backend { status: u16, detail: Option<String> },

    /// Connection-level failure; no response was received.
    #[error("transport error: {0}")]
    Transport(String),
}

impl GenerateError {
    /// Flattens the source chain so the message names the underlying cause.
    pub fn transport(err: reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Transport(message)
    }

    /// Message for the error state, in priority order: backend `detail`,
    /// transport-level message, generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedResponse => NO_IMAGE_DATA_MESSAGE.to_string(),
            Self::Backend { detail: Some(detail), .. } if !detail.trim().is_empty() => detail.clone(),
            Self::Backend { status, .. } => format!("Request failed with status code {status}"),
            Self::Transport(message) if !message.trim().is_empty() => message.clone(),
            Self::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("payload is not a base64 data URI")]
    UnsupportedDataUri,

    #[error("payload is empty")]
    Empty,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("could not decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not write image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid backend URL `{url}`: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("could not read .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),
}

use reqwest::StatusCode;
use shared::error::ErrorBody;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Failure below the HTTP response layer: connect, timeout, body decode.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {}: {reason}", .status.as_u16())]
    Server {
        status: StatusCode,
        reason: String,
        body: String,
    },
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub(crate) fn server(status: StatusCode, body: String) -> Self {
        let reason = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());
        Self::Server {
            status,
            reason,
            body,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(err) => err.status(),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Url(_) => None,
        }
    }

    /// Human-readable text for the request state.
    ///
    /// Server failures prefer the `message` of a structured error body and
    /// fall back to the status reason phrase when the body does not decode.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server {
                status,
                reason,
                body,
            } => match ErrorBody::parse(body) {
                Ok(parsed) if !parsed.message.is_empty() => {
                    warn!(
                        status = status.as_u16(),
                        error_flag = parsed.error,
                        message = %parsed.message,
                        "api: server rejected request"
                    );
                    parsed.message
                }
                Ok(_) => reason.clone(),
                Err(err) => {
                    error!(
                        status = status.as_u16(),
                        error = %err,
                        "api: failed to decode error body"
                    );
                    reason.clone()
                }
            },
            other => other.to_string(),
        }
    }
}

/// Local rejection of a story submission; never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Description must not be empty")]
    EmptyCaption,
    #[error("Please select an image first")]
    NoImageSelected,
    #[error("Sign in before posting a story")]
    MissingToken,
    #[error("Selected image could not be processed: {0}")]
    UnreadableImage(String),
}

impl ValidationError {
    /// Form field the message belongs to, for field-level display.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::EmptyCaption => Some("description"),
            ValidationError::NoImageSelected | ValidationError::UnreadableImage(_) => Some("photo"),
            ValidationError::MissingToken => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::util::compact_text;

/// Failure talking to the remote restaurant service.
///
/// The gateway never retries; callers decide whether to fall back to the
/// local store or leave a write queued.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} ({status})")]
    Status { status: u16, message: String },

    #[error("invalid response payload: {0}")]
    InvalidPayload(String),

    #[error("service unreachable: {0}")]
    Unreachable(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl NetworkError {
    /// Build a status error from a non-2xx response body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|payload| payload.message.or(payload.error))
            .map(|message| compact_text(&message))
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                let trimmed = compact_text(body);
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("HTTP error")
                        .to_string()
                } else {
                    trimmed
                }
            });

        Self::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Whether the same request may succeed later.
    ///
    /// Connection failures, timeouts, throttling and 5xx answers are
    /// transient. Any other status, and a payload that cannot be decoded,
    /// means the service has rejected the request.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Unreachable(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::InvalidPayload(_) => false,
        }
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error category carried in the `error` field of every error envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    InvalidRequest,
    ServerError,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::InvalidRequest => "invalid_request",
            Self::ServerError => "server_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure the API can report. Constructed where the failure happens and
/// passed upward untouched until it is serialized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    ServerError(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Wire shape of an error response. The status travels in the HTTP status line.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
    pub error: ErrorKind,
}

impl AppError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::ServerError(_) => ErrorKind::ServerError,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::InvalidRequest(msg) | Self::ServerError(msg) => msg,
        }
    }

    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope { message: self.message().to_string(), error: self.kind() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::ServerError(msg) => {
                tracing::error!(message = %msg, "Server error");
            }
            Self::NotFound(msg) => {
                tracing::debug!(message = %msg, "Resource not found");
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
            }
            Self::InvalidRequest(msg) => {
                tracing::debug!(message = %msg, "Invalid request");
            }
        }

        (self.status(), Json(self.envelope())).into_response()
    }
}

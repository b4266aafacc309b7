//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": ..., "message"?: ..., "details"?: ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use learnessence_core::{classify_agent_failure, is_parse_failure, AgentFailureKind, Error};

#[derive(Debug)]
pub enum ApiError {
    /// Failure on our side; logged and rendered as `Internal server error`.
    Database(Error),
    Unauthorized,
    Forbidden,
    NotFound(String),
    BadRequest(String),
    /// 400 with an explanatory message, e.g. `Transcript too short`.
    Rejected { error: String, message: String },
    PayloadTooLarge(String),
    BadGateway {
        error: String,
        message: Option<String>,
        details: Option<String>,
    },
    ServiceUnavailable(String),
    Internal {
        error: String,
        message: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn internal(error: impl Into<String>) -> Self {
        ApiError::Internal {
            error: error.into(),
            message: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Rejected { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a study-agent failure.
    ///
    /// Unparsable model output becomes 502; other messages are classified so
    /// moderation and injection rejections surface as 400. Anything else is a
    /// 500 carrying `fallback` as the error.
    pub fn from_agent_error(err: Error, fallback: &str) -> Self {
        if is_parse_failure(&err) {
            return ApiError::BadGateway {
                error: "Invalid response format".to_string(),
                message: Some(err.to_string()),
                details: None,
            };
        }

        let message = match err {
            Error::Inference(msg) | Error::Request(msg) | Error::Config(msg) => msg,
            db @ Error::Database(_) => return ApiError::Database(db),
            other => other.to_string(),
        };

        match classify_agent_failure(&message) {
            AgentFailureKind::ContentBlocked => ApiError::Rejected {
                error: "Content blocked".to_string(),
                message,
            },
            AgentFailureKind::InvalidInput => ApiError::Rejected {
                error: "Invalid input".to_string(),
                message,
            },
            AgentFailureKind::Other => ApiError::Internal {
                error: fallback.to_string(),
                message: Some(message),
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(_) => ApiError::NotFound("Note not found".to_string()),
            Error::FlashcardSetNotFound(_) => {
                ApiError::NotFound("Flashcard set not found".to_string())
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(_) => ApiError::Unauthorized,
            Error::Forbidden(_) => ApiError::Forbidden,
            Error::Transcription(details) => ApiError::BadGateway {
                error: "Transcription failed".to_string(),
                message: None,
                details: Some(details),
            },
            ref e if is_parse_failure(e) => ApiError::BadGateway {
                error: "Invalid response format".to_string(),
                message: Some(e.to_string()),
                details: None,
            },
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Database(err) => {
                error!(
                    subsystem = "api",
                    component = "error",
                    error = %err,
                    "Request failed"
                );
                ErrorBody {
                    error: "Internal server error".to_string(),
                    message: None,
                    details: None,
                }
            }
            ApiError::Unauthorized => ErrorBody {
                error: "Unauthorized".to_string(),
                message: None,
                details: None,
            },
            ApiError::Forbidden => ErrorBody {
                error: "Forbidden".to_string(),
                message: None,
                details: None,
            },
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::ServiceUnavailable(msg) => ErrorBody {
                error: msg,
                message: None,
                details: None,
            },
            ApiError::Rejected { error, message } => ErrorBody {
                error,
                message: Some(message),
                details: None,
            },
            ApiError::BadGateway {
                error,
                message,
                details,
            } => ErrorBody {
                error,
                message,
                details,
            },
            ApiError::Internal { error, message } => ErrorBody {
                error,
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

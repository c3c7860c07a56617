//! # API Errors
//!
//! The endpoint knows three kinds of failure: a field the submitter can fix, an
//! upload the middleware refused before the handler ran, and anything else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

/// Why the upload middleware refused a request.
#[derive(Debug, Error)]
pub enum UploadRejection {
    #[error("Only image files are allowed!")]
    InvalidFileType,
    #[error("File too large")]
    FileTooLarge,
    #[error("Unexpected field")]
    UnexpectedField(String),
    #[error("Malformed multipart body: {0}")]
    Malformed(String),
}

impl UploadRejection {
    fn status(&self) -> StatusCode {
        match self {
            UploadRejection::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    UploadRejected(#[from] UploadRejection),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: &str) -> Self {
        ApiError::Validation(message.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UploadRejected(rejection) => rejection.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(message) => {
                warn!("⚠️  Submission rejected: {}", message);
                json!({ "success": false, "message": message })
            }
            ApiError::UploadRejected(rejection) => {
                warn!("⚠️  Upload rejected: {:?}", rejection);
                json!({ "success": false, "message": rejection.to_string() })
            }
            ApiError::Internal(e) => {
                error!("❌ Server error: {:#}", e);
                json!({ "success": false, "message": "Server error", "error": e.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

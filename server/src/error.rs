use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use derive_more::derive::Display;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;
pub type AppJsonResult<T> = AppResult<Json<T>>;

#[derive(Debug, Display)]
pub enum AppError {
    BadRequest(String),
    UnsupportedFormat(String),
    EmptyContent,
    AiFailure(anyhow::Error),
    InvalidAiOutput(String),
    Internal(anyhow::Error),
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(error)
    }
}

// Every reqwest call in this service targets the model API, so transport
// errors fold into the single "AI unavailable" condition.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::AiFailure(error.into())
    }
}

// This centralizes all different errors from our app in one place
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::UnsupportedFormat(extension) => (
                StatusCode::BAD_REQUEST,
                format!("unsupported file format: {}; use .txt or .pdf", extension),
            ),
            AppError::EmptyContent => (
                StatusCode::BAD_REQUEST,
                "no file or text was sent, or the content is empty".to_string(),
            ),
            AppError::AiFailure(e) => {
                tracing::error!("AI request failed: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "failed to process with AI".to_string(),
                )
            }
            AppError::InvalidAiOutput(raw_text) => {
                tracing::error!("AI returned undecodable output: {}", raw_text);
                (
                    StatusCode::BAD_GATEWAY,
                    "failed to process with AI".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

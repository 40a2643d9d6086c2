use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Vertex AI error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Response error: {0}")]
    Response(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The image client could not be initialised when the process started.
    #[error("Image client unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StudioError>;

/// Errors surfaced to HTTP callers. Everything the upstream call can throw
/// collapses into `UpstreamFailure`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    UpstreamFailure(String),
}

impl ApiError {
    pub fn upstream(err: &StudioError) -> Self {
        ApiError::UpstreamFailure(format!("An error occurred while calling the AI: {}", err))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}

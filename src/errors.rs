use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error; // Use thiserror for cleaner error definitions

use crate::forms::FormErrors;
use crate::views;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from DB layer
}

#[derive(Error, Debug)]
pub enum GifSearchError {
    #[error("GIF search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GIF search endpoint answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("GIF search response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Submitted form is invalid")]
    Validation(FormErrors),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Repository(#[from] RepoError),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(String),

    // Domain/Service level errors (mapped from RepoError/GifSearchError)
    #[error("Could not access stored data")]
    RepositoryError(#[source] RepoError), // Source allows seeing underlying RepoError
    #[error("Could not search for GIFs")]
    GifSearchError(#[source] GifSearchError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String), // Keep simple string for now
    #[error("Initialization error: {0}")]
    InitError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic Internal Server Error
    #[error("Internal server error: {0}")]
    InternalServerError(String), // Catch-all or specific internal issues
}

// --- Conversions from Domain Errors to AppError ---

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::RepositoryError(err)
    }
}

impl From<GifSearchError> for AppError {
    fn from(err: GifSearchError) -> Self {
        AppError::GifSearchError(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Repository(e) => AppError::RepositoryError(e),
            AuthError::Hashing(msg) => AppError::InternalServerError(msg),
            e @ (AuthError::Validation(_) | AuthError::InvalidCredentials) => {
                AppError::InvalidInput(e.to_string())
            }
        }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // 4xx Client Errors
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),

            // 5xx Server Errors
            AppError::RepositoryError(e) => {
                tracing::error!(error.source = ?e, "Repository error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database operation failed".to_string())
            }
            AppError::GifSearchError(e) => {
                tracing::error!(error.source = ?e, "GIF search error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "The GIF search service is unavailable".to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(error.message = %error_message, error.detail = %self, "Responding with error page");
        } else {
            tracing::debug!(error.message = %error_message, status = %status, "Responding with error page");
        }

        (status, views::error_page(status, &error_message)).into_response()
    }
}

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid key")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    MissingParameter(String),

    /// Reported under the `session` key rather than `error`.
    #[error("Error: Missing new price parameter. Please provide 'new_price' in the query string.")]
    MissingPrice,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    pub fn cafe_not_found() -> Self {
        AppError::NotFound(
            "Sorry, a cafe with that name was not found in the database.".to_string(),
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::MissingParameter(_) | AppError::MissingPrice => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::MissingPrice => json!({ "response": { "session": self.to_string() } }),
            AppError::Database(_) | AppError::Template(_) => {
                log::error!("{self}");
                json!({ "response": { "error": "Internal server error" } })
            }
            other => json!({ "response": { "error": other.to_string() } }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

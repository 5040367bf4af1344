use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use serde::Serialize;
use thiserror::Error;

/// Error classes the UI distinguishes. Serialized as `kind` in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    UnknownCategory,
    DuplicateName,
    ReferentialIntegrity,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(rusqlite::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unknown stat category: {0}")]
    UnknownCategory(String),

    #[error("{0}")]
    DuplicateName(String),

    #[error("{0}")]
    ReferentialIntegrity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Db(_) | AppError::Internal(_) => ErrorKind::Internal,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::UnknownCategory(_) => ErrorKind::UnknownCategory,
            AppError::DuplicateName(_) => ErrorKind::DuplicateName,
            AppError::ReferentialIntegrity(_) => ErrorKind::ReferentialIntegrity,
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::UnknownCategory => StatusCode::BAD_REQUEST,
            ErrorKind::DuplicateName | ErrorKind::ReferentialIntegrity => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let message = match self {
            AppError::Db(e) => {
                log::error!("database failure: {}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                log::error!("internal failure: {}", msg);
                "Internal error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status()).json(&serde_json::json!({
            "error": message,
            "kind": self.kind(),
        }))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg.clone().unwrap_or_default();
                if detail.contains("UNIQUE") {
                    AppError::DuplicateName("Player with this name already exists".into())
                } else if detail.contains("FOREIGN KEY") {
                    AppError::ReferentialIntegrity(
                        "Operation violates a foreign key constraint".into(),
                    )
                } else {
                    AppError::Db(e)
                }
            }
            _ => AppError::Db(e),
        }
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("User not found: {0}")]
    UserNotFound(i64),
    #[error("Question not found: {0}")]
    QuestionNotFound(i64),
    #[error("Match not found: {0}")]
    MatchNotFound(String),
    #[error("Cannot like yourself")]
    CannotLikeSelf,
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Questionnaire must be completed first")]
    TestRequired,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code returned to callers.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotAuthenticated(_) => "not_authenticated",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::QuestionNotFound(_) => "question_not_found",
            AppError::MatchNotFound(_) => "match_not_found",
            AppError::CannotLikeSelf => "cannot_like_self",
            AppError::InvalidSelection(_) => "invalid_selection",
            AppError::TestRequired => "test_required",
            AppError::Validation(_) => "validation_error",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound(_)
            | AppError::QuestionNotFound(_)
            | AppError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            AppError::CannotLikeSelf
            | AppError::InvalidSelection(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TestRequired => StatusCode::FORBIDDEN,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::StorageUnavailable(_))
    }

    /// Message safe to hand to callers. Storage and internal failures are
    /// reduced to a generic sentence; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::StorageUnavailable(_) => {
                "Storage is temporarily unavailable, please retry".to_string()
            }
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        if is_transient_sqlx(&error) {
            AppError::StorageUnavailable(error.to_string())
        } else {
            AppError::Internal(format!("Database error: {}", error))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Internal(format!("Stored JSON is malformed: {}", error))
    }
}

fn is_transient_sqlx(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        // SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes.
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|c| c.parse::<i64>().ok())
            .map(|c| matches!(c & 0xff, 5 | 6))
            .unwrap_or(false),
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(detail) => {
                tracing::error!(code = self.code(), detail = %detail, "request_failed")
            }
            AppError::StorageUnavailable(detail) => {
                tracing::warn!(code = self.code(), detail = %detail, "request_failed")
            }
            _ => {}
        }

        let body = serde_json::json!({
            "error": self.code(),
            "message": self.public_message(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_are_stable() {
        assert_eq!(AppError::TestRequired.code(), "test_required");
        assert_eq!(AppError::TestRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::CannotLikeSelf.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UserNotFound(7).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::StorageUnavailable("busy".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = AppError::Internal("no such table: users".into());
        assert!(!err.public_message().contains("users"));
        let err = AppError::InvalidSelection("index 7 out of range".into());
        assert!(err.public_message().contains("index 7"));
    }

    #[test]
    fn pool_timeout_is_transient() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_transient());
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(!err.is_transient());
        assert_eq!(err.code(), "internal_error");
    }
}

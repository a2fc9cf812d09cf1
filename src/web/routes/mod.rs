pub mod health;
pub mod likes;
pub mod questionnaire;
pub mod search;
pub mod users;

use tracing::warn;

use crate::error::AppError;

/// `map_err` adapter that records which caller and operation failed before
/// the error is rendered.
pub(crate) fn log_failure(
    operation: &'static str,
    user_id: i64,
) -> impl FnOnce(AppError) -> AppError {
    move |e| {
        warn!(user_id, operation, code = e.code(), error = %e, "handler_failed");
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_pass_through_unchanged() {
        let result: Result<(), AppError> = Err(AppError::MatchNotFound("m-1".into()));
        let logged = result.map_err(log_failure("match_detail", 7));
        assert!(matches!(logged, Err(AppError::MatchNotFound(id)) if id == "m-1"));

        let ok: Result<u8, AppError> = Ok(3);
        assert_eq!(ok.map_err(log_failure("status", 7)).unwrap(), 3);
    }
}

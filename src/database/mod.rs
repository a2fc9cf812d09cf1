pub mod answer_repo;
pub mod candidate_repo;
pub mod like_repo;
pub mod match_repo;
pub mod question_repo;
pub mod user_repo;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::AppResult;

pub async fn connect(database_url: &str) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Runs `attempt` and, when it fails with a transient storage error, runs it
/// once more. `attempt` must be a whole transaction so the retry starts from
/// a clean slate.
pub async fn with_retry<T, F, Fut>(operation: &'static str, mut attempt: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match attempt().await {
        Err(e) if e.is_transient() => {
            tracing::warn!(operation, error = %e, "storage_transient_failure_retrying");
            attempt().await
        }
        other => other,
    }
}

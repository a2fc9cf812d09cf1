use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Once;

static INIT: Once = Once::new();

pub struct TestContext {
    pub pool: SqlitePool,
}

pub async fn init_test_db() -> TestContext {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("warn")
            .try_init();
    });

    // One connection: every test gets its own private in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    TestContext { pool }
}

/// Inserts a bare user and returns its id.
pub async fn insert_user(pool: &SqlitePool, external_id: i64) -> i64 {
    sqlx::query("INSERT INTO users (external_id, username) VALUES (?1, ?2)")
        .bind(external_id)
        .bind(format!("user{}", external_id))
        .execute(pool)
        .await
        .expect("insert user")
        .last_insert_rowid()
}

/// Answers every catalog question with the same scale index.
pub async fn answer_all(pool: &SqlitePool, user_id: i64, index: i64) {
    sqlx::query(
        "INSERT OR REPLACE INTO test_answers (user_id, question_id, selection_json) \
         SELECT ?1, id, ?2 FROM test_questions",
    )
    .bind(user_id)
    .bind(format!("[{}]", index))
    .execute(pool)
    .await
    .expect("insert answers");
}

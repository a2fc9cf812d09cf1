#![allow(dead_code)]

use std::sync::Once;

use chrono::{TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use tempfile::TempDir;

use roommates::database;

use roommates::models::Gender;
use roommates::services::clock::FixedClock;
use roommates::services::questionnaire_service::{self, AnswerSubmission, SelectionInput};
use roommates::services::user_service::{self, CallerIdentity, ProfileUpdate};

static INIT: Once = Once::new();

pub struct TestContext {
    pub pool: Pool<Sqlite>,
}

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("warn")
            .try_init();
    });
}

pub async fn init_test_db() -> TestContext {
    init_tracing();

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

pub struct FileTestContext {
    pub pool: Pool<Sqlite>,
    // Removes the database file when the test ends.
    _dir: TempDir,
}

/// A pool over a database file with the production connection settings,
/// so several connections contend for the same database.
pub async fn init_file_db() -> FileTestContext {
    init_tracing();

    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("roommates.db").display());
    let pool = database::connect(&url)
        .await
        .expect("Failed to open file database");

    FileTestContext { pool, _dir: dir }
}

pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
}

/// Creates a user through first contact and fills in a profile.
pub async fn create_user(
    pool: &SqlitePool,
    external_id: i64,
    gender: Gender,
    city: &str,
) -> i64 {
    let identity = CallerIdentity {
        external_id,
        username: Some(format!("user{}", external_id)),
        ..Default::default()
    };
    let user = user_service::ensure_user(pool, &identity)
        .await
        .expect("ensure user");
    let update = ProfileUpdate {
        gender: Some(gender),
        city: Some(city.to_string()),
        age: Some(25),
        ..Default::default()
    };
    user_service::update_profile(pool, user.id, &update)
        .await
        .expect("update profile");
    user.id
}

/// Submits the whole catalog with one index per question, in position order.
pub async fn answer_catalog(pool: &SqlitePool, user_id: i64, values: &[i64]) {
    let questions = questionnaire_service::load_questions(pool)
        .await
        .expect("load questions");
    let answers: Vec<AnswerSubmission> = questions
        .iter()
        .zip(values)
        .map(|(q, v)| AnswerSubmission {
            question_id: q.id,
            selection: SelectionInput::One(*v),
        })
        .collect();
    questionnaire_service::submit_answers(pool, user_id, &answers)
        .await
        .expect("submit answers");
}

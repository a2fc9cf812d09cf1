use sqlx::SqlitePool;

use crate::models::QuestionRow;

const SQL_LIST_QUESTIONS: &str = r#"
SELECT id, position, title, kind, answers_json
FROM test_questions
ORDER BY position ASC
"#;

const SQL_LOAD_QUESTION: &str = r#"
SELECT id, position, title, kind, answers_json
FROM test_questions
WHERE id = ?1
"#;

pub async fn list_questions(pool: &SqlitePool) -> sqlx::Result<Vec<QuestionRow>> {
    sqlx::query_as::<_, QuestionRow>(SQL_LIST_QUESTIONS)
        .fetch_all(pool)
        .await
}

pub async fn load_question(pool: &SqlitePool, question_id: i64) -> sqlx::Result<Option<QuestionRow>> {
    sqlx::query_as::<_, QuestionRow>(SQL_LOAD_QUESTION)
        .bind(question_id)
        .fetch_optional(pool)
        .await
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM test_questions")
        .fetch_one(pool)
        .await
}

pub struct NewQuestion<'a> {
    pub position: i64,
    pub title: &'a str,
    pub kind: &'a str,
    pub answers_json: &'a str,
}

pub async fn insert_question(pool: &SqlitePool, q: NewQuestion<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(
        "INSERT INTO test_questions (position, title, kind, answers_json) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(q.position)
    .bind(q.title)
    .bind(q.kind)
    .bind(q.answers_json)
    .execute(pool)
    .await?;
    Ok(res.last_insert_rowid())
}

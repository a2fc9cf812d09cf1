use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::models::AnswerRow;

const SQL_LOAD_ANSWERS: &str = r#"
SELECT user_id, question_id, selection_json
FROM test_answers
WHERE user_id = ?1
ORDER BY question_id
"#;

const SQL_UPSERT_ANSWER: &str = r#"
INSERT INTO test_answers (user_id, question_id, selection_json)
VALUES (?1, ?2, ?3)
ON CONFLICT (user_id, question_id) DO UPDATE SET selection_json = excluded.selection_json
"#;

// Answers to questions that no longer exist do not count.
const SQL_COUNT_ANSWERS: &str = r#"
SELECT COUNT(*)
FROM test_answers ta
JOIN test_questions q ON q.id = ta.question_id
WHERE ta.user_id = ?1
"#;

/// Upper bound on bound parameters per statement.
const IN_CHUNK: usize = 500;

pub async fn load_answers(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<AnswerRow>> {
    sqlx::query_as::<_, AnswerRow>(SQL_LOAD_ANSWERS)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn load_answers_for_users(
    pool: &SqlitePool,
    user_ids: &[i64],
) -> sqlx::Result<Vec<AnswerRow>> {
    let mut rows = Vec::new();
    for chunk in user_ids.chunks(IN_CHUNK) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT user_id, question_id, selection_json FROM test_answers WHERE user_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        rows.extend(qb.build_query_as::<AnswerRow>().fetch_all(pool).await?);
    }
    Ok(rows)
}

pub async fn count_answers(pool: &SqlitePool, user_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar(SQL_COUNT_ANSWERS)
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn upsert_answer(
    conn: &mut SqliteConnection,
    user_id: i64,
    question_id: i64,
    selection_json: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_ANSWER)
        .bind(user_id)
        .bind(question_id)
        .bind(selection_json)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn delete_answers(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM test_answers WHERE user_id = ?1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

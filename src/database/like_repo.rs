use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{LikeRow, LikedUserRow};

const SQL_UPSERT_LIKE: &str = r#"
INSERT INTO likes (from_user_id, to_user_id, is_like, created_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (from_user_id, to_user_id) DO UPDATE SET
  is_like = excluded.is_like,
  created_at = excluded.created_at
"#;

const SQL_LOAD_LIKE: &str = r#"
SELECT from_user_id, to_user_id, is_like, created_at
FROM likes
WHERE from_user_id = ?1 AND to_user_id = ?2
"#;

const SQL_LIST_SENT: &str = r#"
SELECT
  u.id, u.username, u.full_name, u.photo_url, u.city, u.age, u.gender, u.bio,
  l.is_like, l.created_at
FROM users u
INNER JOIN likes l ON l.to_user_id = u.id AND l.from_user_id = ?1
ORDER BY l.created_at DESC, u.id ASC
LIMIT ?2
"#;

// Passes are never surfaced to the person who was passed on.
const SQL_LIST_RECEIVED: &str = r#"
SELECT
  u.id, u.username, u.full_name, u.photo_url, u.city, u.age, u.gender, u.bio,
  l.is_like, l.created_at
FROM users u
INNER JOIN likes l ON l.from_user_id = u.id AND l.to_user_id = ?1 AND l.is_like = 1
ORDER BY l.created_at DESC, u.id ASC
LIMIT ?2
"#;

pub async fn upsert_like(
    conn: &mut SqliteConnection,
    from_user_id: i64,
    to_user_id: i64,
    is_like: bool,
    created_at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPSERT_LIKE)
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(is_like)
        .bind(created_at)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn load_like(
    conn: &mut SqliteConnection,
    from_user_id: i64,
    to_user_id: i64,
) -> sqlx::Result<Option<LikeRow>> {
    sqlx::query_as::<_, LikeRow>(SQL_LOAD_LIKE)
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_optional(conn)
        .await
}

pub async fn list_sent(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> sqlx::Result<Vec<LikedUserRow>> {
    sqlx::query_as::<_, LikedUserRow>(SQL_LIST_SENT)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn list_received(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> sqlx::Result<Vec<LikedUserRow>> {
    sqlx::query_as::<_, LikedUserRow>(SQL_LIST_RECEIVED)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{MatchRow, MatchedUserRow};

const SQL_INSERT_MATCH_IF_ABSENT: &str = r#"
INSERT OR IGNORE INTO matches (id, user_low_id, user_high_id, matched_at)
VALUES (?1, ?2, ?3, ?4)
"#;

const SQL_LOAD_MATCH_FOR_PAIR: &str = r#"
SELECT id, user_low_id, user_high_id, matched_at
FROM matches
WHERE user_low_id = ?1 AND user_high_id = ?2
"#;

const SQL_LOAD_MATCH: &str = r#"
SELECT id, user_low_id, user_high_id, matched_at
FROM matches
WHERE id = ?1
"#;

// The like edges are the source of truth; the matches table only adds the
// id and the moment mutuality was first seen.
const SQL_LIST_MATCHED_USERS: &str = r#"
SELECT
  u.id, u.username, u.full_name, u.photo_url, u.city, u.age, u.gender, u.bio,
  m.id AS match_id,
  COALESCE(m.matched_at, MAX(l1.created_at, l2.created_at)) AS matched_at
FROM users u
INNER JOIN likes l1 ON l1.to_user_id = u.id AND l1.from_user_id = ?1 AND l1.is_like = 1
INNER JOIN likes l2 ON l2.from_user_id = u.id AND l2.to_user_id = ?1 AND l2.is_like = 1
LEFT JOIN matches m ON m.user_low_id = MIN(u.id, ?1) AND m.user_high_id = MAX(u.id, ?1)
ORDER BY matched_at DESC, u.id ASC
"#;

/// Orders a pair the way the matches table stores it.
pub fn pair_key(a: i64, b: i64) -> (i64, i64) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

pub async fn insert_match_if_absent(
    conn: &mut SqliteConnection,
    id: &str,
    user_a: i64,
    user_b: i64,
    matched_at: &str,
) -> sqlx::Result<u64> {
    let (low, high) = pair_key(user_a, user_b);
    let res = sqlx::query(SQL_INSERT_MATCH_IF_ABSENT)
        .bind(id)
        .bind(low)
        .bind(high)
        .bind(matched_at)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_match_for_pair(
    conn: &mut SqliteConnection,
    user_a: i64,
    user_b: i64,
) -> sqlx::Result<Option<MatchRow>> {
    let (low, high) = pair_key(user_a, user_b);
    sqlx::query_as::<_, MatchRow>(SQL_LOAD_MATCH_FOR_PAIR)
        .bind(low)
        .bind(high)
        .fetch_optional(conn)
        .await
}

pub async fn delete_match_for_pair(
    conn: &mut SqliteConnection,
    user_a: i64,
    user_b: i64,
) -> sqlx::Result<u64> {
    let (low, high) = pair_key(user_a, user_b);
    let res = sqlx::query("DELETE FROM matches WHERE user_low_id = ?1 AND user_high_id = ?2")
        .bind(low)
        .bind(high)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_match(pool: &SqlitePool, match_id: &str) -> sqlx::Result<Option<MatchRow>> {
    sqlx::query_as::<_, MatchRow>(SQL_LOAD_MATCH)
        .bind(match_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_matched_users(
    pool: &SqlitePool,
    user_id: i64,
) -> sqlx::Result<Vec<MatchedUserRow>> {
    sqlx::query_as::<_, MatchedUserRow>(SQL_LIST_MATCHED_USERS)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

use crate::models::UsersRow;

const SQL_USER_COLUMNS: &str = r#"
    id,
    external_id,
    username,
    full_name,
    photo_url,
    has_apartment,
    city,
    district,
    age,
    gender,
    budget_min,
    budget_max,
    bio,
    apartment_description,
    created_at
"#;

pub struct NewUser<'a> {
    pub external_id: i64,
    pub username: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub photo_url: Option<&'a str>,
}

const SQL_INSERT_USER_IF_ABSENT: &str = r#"
INSERT OR IGNORE INTO users (
  external_id,
  username,
  full_name,
  photo_url,
  has_apartment
) VALUES (?1, ?2, ?3, ?4, 0)
"#;

const SQL_UPDATE_PROFILE: &str = r#"
UPDATE users SET
  full_name = ?2,
  city = ?3,
  district = ?4,
  age = ?5,
  gender = ?6,
  has_apartment = ?7,
  budget_min = ?8,
  budget_max = ?9,
  bio = ?10,
  apartment_description = ?11
WHERE id = ?1
"#;

pub async fn load_user<'e, E>(executor: E, user_id: i64) -> sqlx::Result<Option<UsersRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM users WHERE id = ?1", SQL_USER_COLUMNS);
    sqlx::query_as::<_, UsersRow>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn load_user_by_external_id(
    pool: &SqlitePool,
    external_id: i64,
) -> sqlx::Result<Option<UsersRow>> {
    let sql = format!("SELECT {} FROM users WHERE external_id = ?1", SQL_USER_COLUMNS);
    sqlx::query_as::<_, UsersRow>(&sql)
        .bind(external_id)
        .fetch_optional(pool)
        .await
}

/// Inserts the user unless the external id is already known. Returns the
/// number of rows written (0 when the user existed).
pub async fn insert_user_if_absent(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_USER_IF_ABSENT)
        .bind(user.external_id)
        .bind(user.username)
        .bind(user.full_name)
        .bind(user.photo_url)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Writes every profile column of `user`.
pub async fn update_profile(conn: &mut SqliteConnection, user: &UsersRow) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PROFILE)
        .bind(user.id)
        .bind(user.full_name.as_deref())
        .bind(user.city.as_deref())
        .bind(user.district.as_deref())
        .bind(user.age)
        .bind(user.gender.as_deref())
        .bind(user.has_apartment)
        .bind(user.budget_min)
        .bind(user.budget_max)
        .bind(user.bio.as_deref())
        .bind(user.apartment_description.as_deref())
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

/// Takes the database write lock and reports whether the user exists.
///
/// SQLite has no `SELECT ... FOR UPDATE`. A transaction that reads before
/// it writes holds a shared lock it cannot upgrade while another writer
/// waits on it, and SQLite fails one of them with `SQLITE_BUSY` instead of
/// waiting. Run this as the first statement of any read-modify-write
/// transaction so concurrent callers queue on the busy timeout.
pub async fn claim_user(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<bool> {
    let res = sqlx::query("UPDATE users SET id = id WHERE id = ?1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Removes the user and everything hanging off it. Callers run this inside
/// a transaction.
pub async fn delete_user_cascade(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<u64> {
    sqlx::query("DELETE FROM likes WHERE from_user_id = ?1 OR to_user_id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM matches WHERE user_low_id = ?1 OR user_high_id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM test_answers WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    let res = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected())
}

/// A fully populated profile, used by the demo data loader.
pub struct SeedUser<'a> {
    pub external_id: i64,
    pub username: &'a str,
    pub full_name: &'a str,
    pub photo_url: &'a str,
    pub has_apartment: bool,
    pub city: &'a str,
    pub district: Option<&'a str>,
    pub age: i64,
    pub gender: &'a str,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub bio: &'a str,
    pub apartment_description: Option<&'a str>,
}

const SQL_INSERT_SEED_USER: &str = r#"
INSERT INTO users (
  external_id, username, full_name, photo_url, has_apartment, city, district,
  age, gender, budget_min, budget_max, bio, apartment_description
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
"#;

pub async fn insert_seed_user(conn: &mut SqliteConnection, user: &SeedUser<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_SEED_USER)
        .bind(user.external_id)
        .bind(user.username)
        .bind(user.full_name)
        .bind(user.photo_url)
        .bind(user.has_apartment)
        .bind(user.city)
        .bind(user.district)
        .bind(user.age)
        .bind(user.gender)
        .bind(user.budget_min)
        .bind(user.budget_max)
        .bind(user.bio)
        .bind(user.apartment_description)
        .execute(conn)
        .await?;
    Ok(res.last_insert_rowid())
}

/// Empties every per-user table. The question catalog is left alone.
pub async fn delete_all_users(conn: &mut SqliteConnection) -> sqlx::Result<u64> {
    for table in ["matches", "likes", "test_answers"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *conn)
            .await?;
    }
    let res = sqlx::query("DELETE FROM users").execute(&mut *conn).await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{init_test_db, insert_user};

    #[tokio::test]
    async fn claim_reports_existence_without_changing_the_row() {
        let ctx = init_test_db().await;
        let pool = &ctx.pool;
        let id = insert_user(pool, 1001).await;
        let before = load_user(pool, id).await.unwrap().unwrap();

        let mut tx = pool.begin().await.unwrap();
        assert!(claim_user(&mut tx, id).await.unwrap());
        assert!(!claim_user(&mut tx, id + 100).await.unwrap());
        let inside = load_user(&mut *tx, id).await.unwrap().unwrap();
        tx.commit().await.unwrap();

        assert_eq!(inside.username, before.username);
        let after = load_user(pool, id).await.unwrap().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.external_id, 1001);
    }
}

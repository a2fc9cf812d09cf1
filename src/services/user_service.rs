use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::database::{user_repo, with_retry};
use crate::error::{AppError, AppResult};
use crate::models::{Gender, UsersRow};
use crate::services::questionnaire_service;

/// A caller whose credentials the identity provider has already verified.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallerIdentity {
    pub external_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfileView {
    pub id: i64,
    pub external_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub has_apartment: bool,
    pub city: Option<String>,
    pub district: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub bio: Option<String>,
    pub apartment_description: Option<String>,
    #[serde(rename = "testCompleted", skip_serializing_if = "Option::is_none")]
    pub test_completed: Option<bool>,
}

impl UserProfileView {
    fn from_row(row: UsersRow, test_completed: Option<bool>) -> Self {
        let gender = row.gender();
        UserProfileView {
            id: row.id,
            external_id: row.external_id,
            username: row.username,
            full_name: row.full_name,
            photo_url: row.photo_url,
            has_apartment: row.has_apartment,
            city: row.city,
            district: row.district,
            age: row.age,
            gender,
            budget_min: row.budget_min,
            budget_max: row.budget_max,
            bio: row.bio,
            apartment_description: row.apartment_description,
            test_completed,
        }
    }
}

/// Partial profile update. Absent fields are left alone; an empty string
/// clears a text field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub has_apartment: Option<bool>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub bio: Option<String>,
    pub apartment_description: Option<String>,
}

pub const MIN_AGE: i64 = 16;
pub const MAX_AGE: i64 = 100;
const MAX_NAME_LEN: usize = 100;
const MAX_TEXT_LEN: usize = 2000;

fn clean_text(raw: &str, field: &str, max_len: usize) -> AppResult<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} is longer than {} characters",
            field, max_len
        )));
    }
    Ok(if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    })
}

/// Applies `update` to `row` and enforces the profile invariants: an
/// apartment owner carries no budget, a seeker carries no apartment
/// description.
pub fn apply_profile_update(mut row: UsersRow, update: &ProfileUpdate) -> AppResult<UsersRow> {
    if let Some(name) = &update.full_name {
        row.full_name = clean_text(name, "full_name", MAX_NAME_LEN)?;
    }
    if let Some(city) = &update.city {
        row.city = clean_text(city, "city", MAX_NAME_LEN)?;
    }
    if let Some(district) = &update.district {
        row.district = clean_text(district, "district", MAX_NAME_LEN)?;
    }
    if let Some(age) = update.age {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(AppError::Validation(format!(
                "age must be between {} and {}",
                MIN_AGE, MAX_AGE
            )));
        }
        row.age = Some(age);
    }
    if let Some(gender) = update.gender {
        row.gender = Some(gender.as_str().to_string());
    }
    if let Some(has_apartment) = update.has_apartment {
        row.has_apartment = has_apartment;
    }
    for (field, value) in [("budget_min", update.budget_min), ("budget_max", update.budget_max)] {
        if value.is_some_and(|v| v < 0) {
            return Err(AppError::Validation(format!("{} must not be negative", field)));
        }
    }
    if update.budget_min.is_some() {
        row.budget_min = update.budget_min;
    }
    if update.budget_max.is_some() {
        row.budget_max = update.budget_max;
    }
    if let Some(bio) = &update.bio {
        row.bio = clean_text(bio, "bio", MAX_TEXT_LEN)?;
    }
    if let Some(description) = &update.apartment_description {
        row.apartment_description =
            clean_text(description, "apartment_description", MAX_TEXT_LEN)?;
    }

    if row.has_apartment {
        row.budget_min = None;
        row.budget_max = None;
    } else {
        row.apartment_description = None;
        if let (Some(min), Some(max)) = (row.budget_min, row.budget_max) {
            if min > max {
                return Err(AppError::Validation(
                    "budget_min must not exceed budget_max".to_string(),
                ));
            }
        }
    }

    Ok(row)
}

/// Loads the caller's user row, creating it on first contact.
pub async fn ensure_user(pool: &SqlitePool, identity: &CallerIdentity) -> AppResult<UsersRow> {
    if let Some(row) = user_repo::load_user_by_external_id(pool, identity.external_id).await? {
        return Ok(row);
    }

    let created = user_repo::insert_user_if_absent(
        pool,
        user_repo::NewUser {
            external_id: identity.external_id,
            username: identity.username.as_deref(),
            full_name: identity.full_name.as_deref(),
            photo_url: identity.photo_url.as_deref(),
        },
    )
    .await?;
    if created > 0 {
        info!(external_id = identity.external_id, "user_created");
    }

    user_repo::load_user_by_external_id(pool, identity.external_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "user {} vanished right after insert",
                identity.external_id
            ))
        })
}

pub async fn load_user(pool: &SqlitePool, user_id: i64) -> AppResult<UsersRow> {
    user_repo::load_user(pool, user_id)
        .await?
        .ok_or(AppError::UserNotFound(user_id))
}

/// The caller's own profile, including questionnaire completion.
pub async fn load_own_profile(pool: &SqlitePool, user_id: i64) -> AppResult<UserProfileView> {
    let row = load_user(pool, user_id).await?;
    let completed = questionnaire_service::is_complete(pool, user_id).await?;
    Ok(UserProfileView::from_row(row, Some(completed)))
}

pub async fn load_user_profile_view(pool: &SqlitePool, user_id: i64) -> AppResult<UserProfileView> {
    let row = load_user(pool, user_id).await?;
    Ok(UserProfileView::from_row(row, None))
}

/// Applies a partial update. The read and the write share one transaction,
/// so concurrent updates touching different fields both survive.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    update: &ProfileUpdate,
) -> AppResult<UserProfileView> {
    with_retry("update_profile", move || async move {
        let mut tx = pool.begin().await?;
        if !user_repo::claim_user(&mut tx, user_id).await? {
            return Err(AppError::UserNotFound(user_id));
        }
        let current = user_repo::load_user(&mut *tx, user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))?;
        let updated = apply_profile_update(current, update)?;
        user_repo::update_profile(&mut tx, &updated).await?;
        tx.commit().await?;
        Ok::<_, AppError>(())
    })
    .await?;
    info!(user_id, "profile_updated");
    load_own_profile(pool, user_id).await
}

/// Deletes the account together with its likes, matches and answers.
pub async fn delete_account(pool: &SqlitePool, user_id: i64) -> AppResult<()> {
    let removed = with_retry("delete_account", move || async move {
        let mut tx = pool.begin().await?;
        let removed = user_repo::delete_user_cascade(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok::<_, AppError>(removed)
    })
    .await?;
    if removed == 0 {
        return Err(AppError::UserNotFound(user_id));
    }
    info!(user_id, "account_deleted");
    Ok(())
}

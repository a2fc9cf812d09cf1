use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::{GenderPolicy, Settings};
use crate::database::candidate_repo::{self, CandidateQuery};
use crate::error::{AppError, AppResult};
use crate::models::{CandidateRow, Gender};
use crate::services::compatibility;
use crate::services::questionnaire_service;
use crate::services::user_service;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchFilters {
    pub city: Option<String>,
    pub district: Option<String>,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub has_apartment: Option<bool>,
    /// `true` keeps only candidates who already have an apartment.
    pub looking_for_apartment: Option<bool>,
    /// Overrides the configured gender policy for this search.
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub has_apartment: bool,
    pub city: Option<String>,
    pub district: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub budget_min: Option<i64>,
    pub budget_max: Option<i64>,
    pub bio: Option<String>,
    pub apartment_description: Option<String>,
    pub compatibility: Option<u8>,
}

impl From<CandidateRow> for CandidateView {
    fn from(row: CandidateRow) -> Self {
        CandidateView {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            photo_url: row.photo_url,
            has_apartment: row.has_apartment,
            city: row.city,
            district: row.district,
            age: row.age,
            gender: row.gender,
            budget_min: row.budget_min,
            budget_max: row.budget_max,
            bio: row.bio,
            apartment_description: row.apartment_description,
            compatibility: row.compatibility_percentage,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn check_range(field: &str, min: Option<i64>, max: Option<i64>) -> AppResult<()> {
    if [min, max].iter().flatten().any(|v| *v < 0) {
        return Err(AppError::Validation(format!("{} must not be negative", field)));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(AppError::Validation(format!(
                "{}_min must not exceed {}_max",
                field, field
            )));
        }
    }
    Ok(())
}

impl SearchFilters {
    pub fn validate(&self) -> AppResult<()> {
        check_range("age", self.age_min, self.age_max)?;
        check_range("budget", self.budget_min, self.budget_max)?;
        if self.looking_for_apartment == Some(true) && self.has_apartment == Some(false) {
            return Err(AppError::Validation(
                "looking_for_apartment contradicts has_apartment=false".to_string(),
            ));
        }
        Ok(())
    }

    fn apartment_filter(&self) -> Option<bool> {
        match self.looking_for_apartment {
            Some(true) => Some(true),
            _ => self.has_apartment,
        }
    }
}

/// The gender a candidate must have, if any. An explicit filter wins over
/// the policy; a requester without a gender is not restricted by it.
pub fn resolve_gender(
    policy: GenderPolicy,
    requester: Option<Gender>,
    requested: Option<Gender>,
) -> Option<Gender> {
    if requested.is_some() {
        return requested;
    }
    match policy {
        GenderPolicy::Same => requester,
        GenderPolicy::Opposite => requester.map(Gender::opposite),
        GenderPolicy::Any => None,
    }
}

/// Orders candidates by score, highest first. Unscored candidates sink to
/// the end; the sort is stable so equal scores keep ascending id order.
pub fn rank_candidates(candidates: &mut [CandidateRow]) {
    candidates.sort_by(|a, b| b.compatibility_percentage.cmp(&a.compatibility_percentage));
}

pub async fn search_candidates(
    pool: &SqlitePool,
    settings: &Settings,
    requester_id: i64,
    filters: &SearchFilters,
) -> AppResult<Vec<CandidateView>> {
    filters.validate()?;

    let status = questionnaire_service::completion_status(pool, requester_id).await?;
    if !status.is_completed {
        return Err(AppError::TestRequired);
    }
    let requester = user_service::load_user(pool, requester_id).await?;

    let gender = resolve_gender(settings.gender_policy, requester.gender(), filters.gender);
    let query = CandidateQuery {
        gender: gender.map(Gender::as_str),
        city: non_blank(&filters.city),
        district: non_blank(&filters.district),
        age_min: filters.age_min,
        age_max: filters.age_max,
        budget_min: filters.budget_min,
        budget_max: filters.budget_max,
        has_apartment: filters.apartment_filter(),
    };

    let mut candidates =
        candidate_repo::load_candidates(pool, requester_id, status.question_count, &query).await?;

    let questions = questionnaire_service::load_questions(pool).await?;
    let mut ids: Vec<i64> = candidates.iter().map(|c| c.id).collect();
    ids.push(requester_id);
    let answer_sets = questionnaire_service::load_answer_sets(pool, &ids).await?;

    if let Some(own) = answer_sets.get(&requester_id) {
        for candidate in candidates.iter_mut() {
            candidate.compatibility_percentage = answer_sets.get(&candidate.id).map(|theirs| {
                compatibility::compatibility(settings.scoring_variant, &questions, own, theirs)
            });
        }
    }

    rank_candidates(&mut candidates);
    let eligible = candidates.len();
    candidates.truncate(settings.search_limit);

    info!(
        user_id = requester_id,
        eligible,
        returned = candidates.len(),
        "search_completed"
    );
    Ok(candidates.into_iter().map(CandidateView::from).collect())
}

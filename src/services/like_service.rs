use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::config::Settings;
use crate::database::{like_repo, match_repo, user_repo, with_retry};
use crate::error::{AppError, AppResult};
use crate::models::{AnswerSet, LikedUserRow, MatchRow, MatchedUserRow};
use crate::services::clock::Clock;
use crate::services::compatibility::{self, CompatibilityInsights};
use crate::services::questionnaire_service;

/// Sent/received lists are capped at this many entries.
pub const LIKES_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwipeRequest {
    pub to_user_id: i64,
    pub is_like: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchInfo {
    pub id: String,
    pub user_ids: [i64; 2],
    pub matched_at: String,
}

impl From<MatchRow> for MatchInfo {
    fn from(row: MatchRow) -> Self {
        MatchInfo {
            id: row.id,
            user_ids: [row.user_low_id, row.user_high_id],
            matched_at: row.matched_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SwipeResult {
    pub is_match: bool,
    /// True only for the swipe that first made the pair mutual.
    pub newly_matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_info: Option<MatchInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub match_id: Option<String>,
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub matched_at: String,
    pub compatibility: Option<u8>,
}

impl MatchView {
    fn from_row(row: MatchedUserRow, compatibility: Option<u8>) -> Self {
        MatchView {
            match_id: row.match_id,
            user_id: row.id,
            username: row.username,
            full_name: row.full_name,
            photo_url: row.photo_url,
            city: row.city,
            age: row.age,
            gender: row.gender,
            bio: row.bio,
            matched_at: row.matched_at,
            compatibility,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LikedUserView {
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub city: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub is_like: bool,
    pub created_at: String,
}

impl From<LikedUserRow> for LikedUserView {
    fn from(row: LikedUserRow) -> Self {
        LikedUserView {
            user_id: row.id,
            username: row.username,
            full_name: row.full_name,
            photo_url: row.photo_url,
            city: row.city,
            age: row.age,
            gender: row.gender,
            bio: row.bio,
            is_like: row.is_like,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeDirection {
    Sent,
    Received,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairCompatibility {
    pub user_id: i64,
    /// `None` while the other user has not finished the questionnaire.
    pub compatibility: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<CompatibilityInsights>,
}

/// Records a like or a pass from `from_user_id` on `to_user_id`.
///
/// The edge upsert, the reciprocal read and the match bookkeeping share one
/// transaction that takes the write lock before reading anything, so two
/// users liking each other at the same moment still produce exactly one
/// match row. A pass removes any materialized match for
/// the pair. Repeating a swipe is harmless.
pub async fn record_swipe(
    pool: &SqlitePool,
    clock: &dyn Clock,
    from_user_id: i64,
    to_user_id: i64,
    is_like: bool,
) -> AppResult<SwipeResult> {
    if from_user_id == to_user_id {
        return Err(AppError::CannotLikeSelf);
    }
    let now = clock.timestamp();
    let now = now.as_str();

    let (match_row, newly_matched) = with_retry("record_swipe", move || async move {
        let mut tx = pool.begin().await?;
        if !user_repo::claim_user(&mut tx, to_user_id).await? {
            return Err(AppError::UserNotFound(to_user_id));
        }

        like_repo::upsert_like(&mut tx, from_user_id, to_user_id, is_like, now).await?;

        let outcome = if is_like {
            let reciprocal = like_repo::load_like(&mut tx, to_user_id, from_user_id).await?;
            if reciprocal.is_some_and(|edge| edge.is_like) {
                let match_id = Uuid::new_v4().to_string();
                let inserted = match_repo::insert_match_if_absent(
                    &mut tx,
                    &match_id,
                    from_user_id,
                    to_user_id,
                    now,
                )
                .await?;
                let row = match_repo::load_match_for_pair(&mut tx, from_user_id, to_user_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "match for {}/{} missing after insert",
                            from_user_id, to_user_id
                        ))
                    })?;
                (Some(row), inserted > 0)
            } else {
                (None, false)
            }
        } else {
            match_repo::delete_match_for_pair(&mut tx, from_user_id, to_user_id).await?;
            (None, false)
        };

        tx.commit().await?;
        Ok::<_, AppError>(outcome)
    })
    .await?;

    info!(
        from_user_id,
        to_user_id,
        is_like,
        is_match = match_row.is_some(),
        newly_matched,
        "swipe_recorded"
    );

    Ok(SwipeResult {
        is_match: match_row.is_some(),
        newly_matched,
        match_info: match_row.map(MatchInfo::from),
    })
}

async fn pair_score(
    pool: &SqlitePool,
    settings: &Settings,
    user_id: i64,
    other_id: i64,
) -> AppResult<Option<u8>> {
    if !questionnaire_service::is_complete(pool, user_id).await?
        || !questionnaire_service::is_complete(pool, other_id).await?
    {
        return Ok(None);
    }
    let questions = questionnaire_service::load_questions(pool).await?;
    let sets = questionnaire_service::load_answer_sets(pool, &[user_id, other_id]).await?;
    Ok(match (sets.get(&user_id), sets.get(&other_id)) {
        (Some(a), Some(b)) => Some(compatibility::compatibility(
            settings.scoring_variant,
            &questions,
            a,
            b,
        )),
        _ => None,
    })
}

/// Mutual matches, newest first, each with a freshly computed score.
pub async fn list_matches(
    pool: &SqlitePool,
    settings: &Settings,
    user_id: i64,
) -> AppResult<Vec<MatchView>> {
    let rows = match_repo::list_matched_users(pool, user_id).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let status = questionnaire_service::completion_status(pool, user_id).await?;
    let question_count = status.question_count;
    let questions = questionnaire_service::load_questions(pool).await?;
    let mut ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    ids.push(user_id);
    let sets = questionnaire_service::load_answer_sets(pool, &ids).await?;

    let is_complete = |id: i64| {
        sets.get(&id)
            .map(|s| {
                let answered = questions.iter().filter(|q| s.contains_key(&q.id)).count() as i64;
                question_count > 0 && answered >= question_count
            })
            .unwrap_or(false)
    };

    let own = sets.get(&user_id).filter(|_| is_complete(user_id));
    Ok(rows
        .into_iter()
        .map(|row| {
            let score = match (own, sets.get(&row.id)) {
                (Some(a), Some(b)) if is_complete(row.id) => Some(compatibility::compatibility(
                    settings.scoring_variant,
                    &questions,
                    a,
                    b,
                )),
                _ => None,
            };
            MatchView::from_row(row, score)
        })
        .collect())
}

/// One materialized match, visible only to its two participants.
pub async fn get_match(
    pool: &SqlitePool,
    settings: &Settings,
    user_id: i64,
    match_id: &str,
) -> AppResult<MatchView> {
    let row = match_repo::load_match(pool, match_id)
        .await?
        .ok_or_else(|| AppError::MatchNotFound(match_id.to_string()))?;
    let other_id = row
        .other_user(user_id)
        .ok_or_else(|| AppError::MatchNotFound(match_id.to_string()))?;

    let matched = match_repo::list_matched_users(pool, user_id)
        .await?
        .into_iter()
        .find(|m| m.id == other_id)
        .ok_or_else(|| AppError::MatchNotFound(match_id.to_string()))?;
    let score = pair_score(pool, settings, user_id, other_id).await?;
    Ok(MatchView::from_row(matched, score))
}

pub async fn list_likes(
    pool: &SqlitePool,
    user_id: i64,
    direction: LikeDirection,
) -> AppResult<Vec<LikedUserView>> {
    let rows = match direction {
        LikeDirection::Sent => like_repo::list_sent(pool, user_id, LIKES_PAGE_LIMIT).await?,
        LikeDirection::Received => {
            like_repo::list_received(pool, user_id, LIKES_PAGE_LIMIT).await?
        }
    };
    Ok(rows.into_iter().map(LikedUserView::from).collect())
}

/// Score and insights between the caller and another user. The caller must
/// have finished the questionnaire; the other user may not have, in which
/// case the score is `None`.
pub async fn get_pairwise_compatibility(
    pool: &SqlitePool,
    settings: &Settings,
    user_id: i64,
    other_id: i64,
) -> AppResult<PairCompatibility> {
    if !questionnaire_service::is_complete(pool, user_id).await? {
        return Err(AppError::TestRequired);
    }
    if user_repo::load_user(pool, other_id).await?.is_none() {
        return Err(AppError::UserNotFound(other_id));
    }
    if !questionnaire_service::is_complete(pool, other_id).await? {
        return Ok(PairCompatibility {
            user_id: other_id,
            compatibility: None,
            insights: None,
        });
    }

    let questions = questionnaire_service::load_questions(pool).await?;
    let sets = questionnaire_service::load_answer_sets(pool, &[user_id, other_id]).await?;
    let empty = AnswerSet::new();
    let own = sets.get(&user_id).unwrap_or(&empty);
    let theirs = sets.get(&other_id).unwrap_or(&empty);
    let insights = compatibility::insights(settings.scoring_variant, &questions, own, theirs);

    Ok(PairCompatibility {
        user_id: other_id,
        compatibility: Some(insights.score),
        insights: Some(insights),
    })
}

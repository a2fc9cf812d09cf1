use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::warn;

use crate::error::AppError;
use crate::services::like_service::{
    self, LikeDirection, LikedUserView, MatchView, SwipeRequest, SwipeResult,
};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::log_failure;
use crate::web::AppState;

pub async fn swipe_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<SwipeRequest>,
) -> Result<Json<SwipeResult>, AppError> {
    like_service::record_swipe(
        &state.pool,
        state.clock.as_ref(),
        auth_user.id,
        body.to_user_id,
        body.is_like,
    )
    .await
    .map(Json)
    .map_err(|e| {
        warn!(
            user_id = auth_user.id,
            to_user_id = body.to_user_id,
            error = %e,
            "swipe_failed"
        );
        e
    })
}

pub async fn matches_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    like_service::list_matches(&state.pool, &state.settings, auth_user.id)
        .await
        .map(Json)
        .map_err(log_failure("list_matches", auth_user.id))
}

pub async fn match_detail_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(match_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MatchView>, AppError> {
    like_service::get_match(&state.pool, &state.settings, auth_user.id, &match_id)
        .await
        .map(Json)
        .map_err(|e| {
            warn!(
                user_id = auth_user.id,
                match_id = %match_id,
                error = %e,
                "match_detail_failed"
            );
            e
        })
}

pub async fn sent_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<LikedUserView>>, AppError> {
    like_service::list_likes(&state.pool, auth_user.id, LikeDirection::Sent)
        .await
        .map(Json)
        .map_err(log_failure("list_sent_likes", auth_user.id))
}

pub async fn received_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<LikedUserView>>, AppError> {
    like_service::list_likes(&state.pool, auth_user.id, LikeDirection::Received)
        .await
        .map(Json)
        .map_err(log_failure("list_received_likes", auth_user.id))
}

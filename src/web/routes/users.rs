use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use crate::error::AppError;
use crate::services::like_service::{self, PairCompatibility};
use crate::services::user_service::{self, ProfileUpdate, UserProfileView};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::log_failure;
use crate::web::AppState;

pub async fn me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<UserProfileView>, AppError> {
    user_service::load_own_profile(&state.pool, auth_user.id)
        .await
        .map(Json)
        .map_err(log_failure("load_own_profile", auth_user.id))
}

pub async fn update_me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfileView>, AppError> {
    user_service::update_profile(&state.pool, auth_user.id, &update)
        .await
        .map(Json)
        .map_err(log_failure("update_profile", auth_user.id))
}

pub async fn delete_me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    user_service::delete_account(&state.pool, auth_user.id)
        .await
        .map_err(log_failure("delete_account", auth_user.id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<UserProfileView>, AppError> {
    user_service::load_user_profile_view(&state.pool, user_id)
        .await
        .map(Json)
        .map_err(log_failure("load_user_profile", auth_user.id))
}

pub async fn compatibility_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<PairCompatibility>, AppError> {
    like_service::get_pairwise_compatibility(&state.pool, &state.settings, auth_user.id, user_id)
        .await
        .map(Json)
        .map_err(log_failure("pairwise_compatibility", auth_user.id))
}

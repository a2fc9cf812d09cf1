use axum::{extract::State, Extension, Json};
use crate::error::AppError;
use crate::services::search_service::{self, CandidateView, SearchFilters};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::log_failure;
use crate::web::AppState;

pub async fn search_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(filters): Json<SearchFilters>,
) -> Result<Json<Vec<CandidateView>>, AppError> {
    search_service::search_candidates(&state.pool, &state.settings, auth_user.id, &filters)
        .await
        .map(Json)
        .map_err(log_failure("search", auth_user.id))
}

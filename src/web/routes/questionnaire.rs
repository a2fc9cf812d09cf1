use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use crate::error::AppError;
use crate::models::{Question, Selection};
use crate::services::questionnaire_service::{
    self, CompletionStatus, SaveAnswerRequest, SubmitAnswersRequest,
};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::log_failure;
use crate::web::AppState;

pub async fn questions_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Question>>, AppError> {
    questionnaire_service::load_questions(&state.pool)
        .await
        .map(Json)
        .map_err(log_failure("load_questions", auth_user.id))
}

pub async fn submit_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<SubmitAnswersRequest>,
) -> Result<Json<Value>, AppError> {
    let saved = questionnaire_service::submit_answers(&state.pool, auth_user.id, &body.answers)
        .await
        .map_err(log_failure("submit_answers", auth_user.id))?;
    let status = questionnaire_service::completion_status(&state.pool, auth_user.id)
        .await
        .map_err(log_failure("completion_status", auth_user.id))?;
    Ok(Json(json!({ "saved": saved, "status": status })))
}

pub async fn save_answer_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(question_id): Path<i64>,
    State(state): State<AppState>,
    Json(body): Json<SaveAnswerRequest>,
) -> Result<Json<CompletionStatus>, AppError> {
    questionnaire_service::save_answer(&state.pool, auth_user.id, question_id, &body.selection)
        .await
        .map_err(log_failure("save_answer", auth_user.id))?;
    questionnaire_service::completion_status(&state.pool, auth_user.id)
        .await
        .map(Json)
        .map_err(log_failure("completion_status", auth_user.id))
}

pub async fn status_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<CompletionStatus>, AppError> {
    questionnaire_service::completion_status(&state.pool, auth_user.id)
        .await
        .map(Json)
        .map_err(log_failure("completion_status", auth_user.id))
}

pub async fn my_answers_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<i64, Selection>>, AppError> {
    questionnaire_service::load_answer_set(&state.pool, auth_user.id)
        .await
        .map(Json)
        .map_err(log_failure("load_answers", auth_user.id))
}

pub async fn reset_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let removed = questionnaire_service::reset_answers(&state.pool, auth_user.id)
        .await
        .map_err(log_failure("reset_answers", auth_user.id))?;
    Ok(Json(json!({ "removed": removed })))
}

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::web::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await?;
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "scoring": state.settings.scoring_variant,
    })))
}

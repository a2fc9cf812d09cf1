use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;
use crate::services::user_service::{self, CallerIdentity};
use crate::web::AppState;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: i64,
}

// Identity tokens are verified upstream; only the payload is read here.
#[derive(Deserialize)]
struct TokenPayload {
    sub: Subject,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Subject {
    Number(i64),
    Text(String),
}

impl Subject {
    fn external_id(&self) -> Option<i64> {
        match self {
            Subject::Number(id) => Some(*id),
            Subject::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|c| c.strip_prefix("access_token="))
        })
}

/// Reads the caller identity out of a `header.payload.signature` token.
pub fn identity_from_token(token: &str) -> Result<CallerIdentity, AppError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AppError::NotAuthenticated("malformed token".into()));
    }
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|_| AppError::NotAuthenticated("token payload is not base64".into()))?;
    let payload: TokenPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|_| AppError::NotAuthenticated("token payload is not valid".into()))?;
    let external_id = payload
        .sub
        .external_id()
        .ok_or_else(|| AppError::NotAuthenticated("token subject is not a user id".into()))?;

    Ok(CallerIdentity {
        external_id,
        username: payload.username,
        full_name: payload.name,
        photo_url: payload.picture,
    })
}

fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Result<CallerIdentity, AppError> {
    if let Some(token) = extract_token(headers) {
        return identity_from_token(token);
    }

    // Local development without an identity provider.
    if let Some(external_id) = state.settings.dev_external_id {
        return Ok(CallerIdentity {
            external_id,
            username: Some("dev_user".to_string()),
            full_name: Some("Development User".to_string()),
            photo_url: None,
        });
    }

    Err(AppError::NotAuthenticated("no credentials supplied".into()))
}

async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    path: &str,
) -> Result<AuthenticatedUser, AppError> {
    let identity = resolve_identity(state, headers).map_err(|e| {
        warn!(path, error = %e, "auth_rejected");
        e
    })?;

    let user = user_service::ensure_user(&state.pool, &identity)
        .await
        .map_err(|e| {
            warn!(
                external_id = identity.external_id,
                path,
                code = e.code(),
                error = %e,
                "user_provisioning_failed"
            );
            e
        })?;

    Ok(AuthenticatedUser { id: user.id })
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match authenticate(&state, request.headers(), &path).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

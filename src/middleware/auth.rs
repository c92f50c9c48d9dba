use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use secrecy::SecretString;
use tracing::debug;

use crate::app_state::AppState;
use crate::db::repositories::user_repository::UserRepository;
use crate::error::AppError;

/// Resolve the opaque bearer credential into a Principal and stash it in
/// the request extensions. Requests without a resolvable principal never
/// reach a handler.
pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or_else(|| {
        AppError::Unauthenticated("missing bearer credential".to_string())
    })?;

    let principal = UserRepository::resolve_principal(&state.db, &token)
        .await?
        .ok_or_else(|| {
            debug!("Bearer credential did not resolve to an active user");
            AppError::Unauthenticated("invalid or expired credential".to_string())
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<SecretString> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(SecretString::from(token.to_string()))
    }
}

use crate::errors::AppError;
use crate::handlers::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated caller identity, resolved by the gate and bound to the
/// request for every downstream handler.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Authentication gate applied to every API route.
///
/// Extracts the bearer credential, delegates verification to the identity
/// provider, and injects the resolved subject id into request extensions.
/// Runs before any handler logic; no store is touched on rejection.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            AppError::Unauthenticated("Authorization header is not a bearer credential".to_string())
        })?;

    let subject = state.auth_client.verify_token(token).await?;

    req.extensions_mut().insert(AuthUser(subject));
    Ok(next.run(req).await)
}

/// Ownership check: callers may only touch their own documents.
pub fn ensure_owner(auth: &AuthUser, user_id: &str) -> Result<(), AppError> {
    if auth.0 == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "subject {} may not access data of user {}",
            auth.0, user_id
        )))
    }
}

//! Bearer access token (Supabase HS256 JWT) verification → AuthCtx in extensions.
//!
//! Checks run in this order, each short-circuiting:
//! 1. `Authorization: Bearer <token>` present (401 otherwise)
//! 2. verification secret configured (500 otherwise)
//! 3. token verifies and carries a subject (401 otherwise)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AccessJwtError;
use crate::state::AppState;

/// Put the given routes behind bearer authentication.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(AppError::Unauthorized)?;

    let claims = match state.auth.verify(token) {
        Ok(claims) => claims,
        Err(err @ AccessJwtError::SecretNotConfigured) => {
            tracing::error!("SUPABASE_JWT_SECRET is not configured; rejecting request");
            return Err(err.into());
        }
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            return Err(AppError::Unauthorized);
        }
    };

    let auth_ctx = AuthCtx {
        user_id: claims.sub,
        role: claims.role,
    };

    // middleware → extractor
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

// `Bearer <token>`; the scheme is case-insensitive, the token must be non-empty.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

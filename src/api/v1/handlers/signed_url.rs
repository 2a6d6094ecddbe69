/*
 * Responsibility
 * - POST /signed-url: ownership check → 60 s signed download URL
 * - The caller is already authenticated (AuthCtx from the access middleware)
 */
use axum::{Json, body::Bytes, extract::State};

use crate::{
    api::v1::{
        dto::signed_url::{SignedUrlRequest, SignedUrlResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    services::files::SIGNED_URL_TTL_SECONDS,
    state::AppState,
};

pub async fn get_signed_url(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    body: Bytes,
) -> Result<Json<SignedUrlResponse>, AppError> {
    // Parsed by hand so every malformed body is the same 400, whatever the Content-Type.
    let req = SignedUrlRequest::from_slice(&body).map_err(AppError::BadRequest)?;
    let path = req.validate().map_err(AppError::BadRequest)?;

    let file = state
        .files
        .find_file_ownership(path)
        .await
        // A failed lookup answers like a missing row.
        .map_err(|err| {
            tracing::error!(
                error = %err,
                backend = state.files.backend_name(),
                "file ownership lookup failed"
            );
            AppError::NotFound
        })?
        .ok_or(AppError::NotFound)?;

    if file.owner_id != auth.user_id {
        tracing::warn!(
            file_id = file.id,
            path,
            user_id = %auth.user_id,
            "signed url requested for a file owned by someone else"
        );
        return Err(AppError::Forbidden);
    }

    let signed_url = state
        .files
        .create_signed_url(path, SIGNED_URL_TTL_SECONDS)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, file_id = file.id, "signed url generation failed");
            AppError::SignedUrl
        })?;

    tracing::debug!(
        file_id = file.id,
        user_id = %auth.user_id,
        role = ?auth.role,
        "signed url issued"
    );

    Ok(Json(SignedUrlResponse { signed_url }))
}

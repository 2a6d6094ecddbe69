/*
 * Responsibility
 * - URL layout of v1
 * - /health is public, /signed-url sits behind the bearer auth layer
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{health::health, signed_url::get_signed_url};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = access::apply(
        Router::new().route("/signed-url", post(get_signed_url)),
        state,
    );

    Router::new().route("/health", get(health)).merge(protected)
}

/// Same handler under the path Supabase clients call edge functions on.
pub fn compat_routes(state: AppState) -> Router<AppState> {
    access::apply(
        Router::new().route("/functions/v1/getSignedUrl", post(get_signed_url)),
        state,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum_test::TestServer;
    use serde_json::json;

    use super::*;
    use crate::services::auth::AuthService;
    use crate::services::files::{FileBackend, FileBackendResult, FileOwnership};

    struct NoFiles;

    #[async_trait]
    impl FileBackend for NoFiles {
        fn backend_name(&self) -> &'static str {
            "none"
        }

        async fn find_file_ownership(&self, _: &str) -> FileBackendResult<Option<FileOwnership>> {
            Ok(None)
        }

        async fn create_signed_url(&self, _: &str, _: u64) -> FileBackendResult<String> {
            unreachable!("no file is ever owned")
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let state = AppState::new(Arc::new(AuthService::new(None, None, 0)), Arc::new(NoFiles));
        let app = Router::new().nest("/api/v1", routes(state.clone())).with_state(state);
        let server = TestServer::new(app).unwrap();

        let res = server.get("/api/v1/health").await;

        res.assert_status_ok();
        res.assert_json(&json!({"status": "ok"}));
    }
}

/*
 * Responsibility
 * - Config → services → Router
 * - Router-level middleware (HTTP plumbing, CORS, security headers)
 * - axum::serve()
 */
use std::{panic, sync::Arc};

use anyhow::{Context, Result, bail};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, ConfigError};
use crate::services::auth::AuthService;
use crate::services::files::{FileBackend, SupabaseBackend};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,signed_url=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing too; the request itself is answered
        // by the catch-panic layer.
        tracing::error!(%info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    init_panic_hook();

    let config = Config::from_env()?;

    tracing::info!(
        "starting signed-url service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    if config.jwt_secret.is_none() {
        if config.app_env.is_production() {
            bail!(ConfigError::Missing("SUPABASE_JWT_SECRET"));
        }
        tracing::error!(
            "SUPABASE_JWT_SECRET is not set; every authenticated request will fail with 500"
        );
    }

    let auth = Arc::new(AuthService::new(
        config.jwt_secret.as_deref(),
        config.jwt_audience.as_deref(),
        config.jwt_leeway_seconds,
    ));

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let mut backend = SupabaseBackend::new(
        http,
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
        config.storage_bucket.clone(),
        config.files_table.clone(),
    );

    if let Some(database_url) = &config.database_url {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("failed to connect to DATABASE_URL")?;
        backend = backend.with_database(pool);
    }

    tracing::info!(backend = backend.backend_name(), bucket = %config.storage_bucket, "file backend ready");

    Ok(AppState::new(auth, Arc::new(backend)))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .merge(api::v1::compat_routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(server: &MockServer, secret: Option<&str>) -> Config {
        let uri = server.uri();
        let mut pairs = vec![
            ("SUPABASE_URL", uri.as_str()),
            ("SUPABASE_ANON_KEY", "anon-key"),
            ("SUPABASE_STORAGE_BUCKET", "private-files"),
        ];
        if let Some(secret) = secret {
            pairs.push(("SUPABASE_JWT_SECRET", secret));
        }
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    fn token(sub: &str, secret: &str) -> String {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &json!({"sub": sub, "exp": chrono::Utc::now().timestamp() + 600}),
            &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn end_to_end_against_a_mocked_supabase_project() {
        let supabase = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/files"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "owner_id": "user-1"}])),
            )
            .mount(&supabase)
            .await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/sign/private-files/docs/a.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "signedURL": "/object/sign/private-files/docs/a.pdf?token=xyz"
            })))
            .mount(&supabase)
            .await;

        let config = config(&supabase, Some("secret"));
        let state = build_state(&config).await.unwrap();
        let server = TestServer::new(build_router(state, &config)).unwrap();

        let res = server
            .post("/api/v1/signed-url")
            .add_header(
                HeaderName::from_static("authorization"),
                HeaderValue::from_str(&format!("Bearer {}", token("user-1", "secret"))).unwrap(),
            )
            .json(&json!({"filePath": "docs/a.pdf"}))
            .await;

        res.assert_status_ok();
        res.assert_json(&json!({
            "signedUrl": format!(
                "{}/storage/v1/object/sign/private-files/docs/a.pdf?token=xyz",
                supabase.uri()
            )
        }));
        assert_eq!(res.header("cache-control"), "no-store");
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn rest_lookup_errors_answer_not_found_without_signing() {
        let supabase = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/files"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"JWT invalid"}"#))
            .mount(&supabase)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&supabase)
            .await;

        let config = config(&supabase, Some("secret"));
        let state = build_state(&config).await.unwrap();
        let server = TestServer::new(build_router(state, &config)).unwrap();

        let res = server
            .post("/api/v1/signed-url")
            .add_header(
                HeaderName::from_static("authorization"),
                HeaderValue::from_str(&format!("Bearer {}", token("user-1", "secret"))).unwrap(),
            )
            .json(&json!({"filePath": "docs/a.pdf"}))
            .await;

        res.assert_status(StatusCode::NOT_FOUND);
        res.assert_text("File not found or access denied.");
    }

    #[tokio::test]
    async fn unauthenticated_requests_never_reach_supabase() {
        let supabase = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&supabase)
            .await;

        let config = config(&supabase, Some("secret"));
        let state = build_state(&config).await.unwrap();
        let server = TestServer::new(build_router(state, &config)).unwrap();

        let res = server
            .post("/functions/v1/getSignedUrl")
            .json(&json!({"filePath": "docs/a.pdf"}))
            .await;

        res.assert_status(StatusCode::UNAUTHORIZED);
        res.assert_text("Unauthorized");
    }

    #[tokio::test]
    async fn development_starts_without_a_secret_but_production_does_not() {
        let supabase = MockServer::start().await;

        let mut config = config(&supabase, None);
        assert!(build_state(&config).await.is_ok());

        config.app_env = crate::config::AppEnv::Production;
        assert!(build_state(&config).await.is_err());
    }
}

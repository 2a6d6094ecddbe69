//! CORS policy for browser clients.
//!
//! Policy:
//! - Development: permissive (Allow-Origin: *), WITHOUT credentials.
//! - Production: allowlist origins from Config, WITHOUT credentials.
//!   An empty allowlist allows no cross-origin callers at all.
//!
//! Preflight requests are answered here, before the auth layer sees them.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

pub fn layer(config: &Config) -> CorsLayer {
    let cors = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        // Exact match only; a literal `*` entry matches no origin.
        let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
            allowed.iter().any(|v| v == origin)
        });

        CorsLayer::new().allow_origin(allow_origin)
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(Duration::from_secs(60 * 10))
}

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config))
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{HeaderName, HeaderValue},
        routing::post,
    };
    use axum_test::TestServer;

    use super::*;

    fn production(origins: &str) -> Config {
        let pairs = [
            ("APP_ENV", "production"),
            ("CORS_ALLOWED_ORIGINS", origins),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon-key"),
            ("SUPABASE_STORAGE_BUCKET", "private-files"),
        ];
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    async fn allow_origin_for(config: &Config, origin: &'static str) -> Option<String> {
        let app = apply(Router::new().route("/", post(|| async { "ok" })), config);
        let server = TestServer::new(app).unwrap();

        let res = server
            .post("/")
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static(origin),
            )
            .await;

        res.assert_status_ok();
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn production_allows_only_listed_origins() {
        let config = production("https://app.example, https://admin.example");

        assert_eq!(
            allow_origin_for(&config, "https://app.example").await.as_deref(),
            Some("https://app.example")
        );
        assert_eq!(allow_origin_for(&config, "https://evil.example").await, None);
    }

    #[tokio::test]
    async fn wildcard_entry_in_production_matches_nothing() {
        let config = production("*,https://app.example");

        assert_eq!(allow_origin_for(&config, "https://evil.example").await, None);
        assert_eq!(
            allow_origin_for(&config, "https://app.example").await.as_deref(),
            Some("https://app.example")
        );
    }

    #[tokio::test]
    async fn development_allows_any_origin() {
        let mut config = production("");
        config.app_env = crate::config::AppEnv::Development;

        assert_eq!(
            allow_origin_for(&config, "https://anything.example").await.as_deref(),
            Some("*")
        );
    }
}

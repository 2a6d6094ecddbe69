use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use url::Url;

use crate::repos::file_repo;
use crate::services::files::backend::{
    FileBackend, FileBackendError, FileBackendResult, FileOwnership, normalize_object_path,
};

/// Supabase-backed file backend.
///
/// - Ownership rows come from PostgREST (`/rest/v1/{table}`), or straight from
///   Postgres when a pool is attached.
/// - Signed URLs come from Storage (`/storage/v1/object/sign/{bucket}/{path}`).
///
/// Every call authenticates with the project's anon key (`apikey` + Bearer).
#[derive(Clone)]
pub struct SupabaseBackend {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
    bucket: String,
    table: String,
    db: Option<PgPool>,
}

impl std::fmt::Debug for SupabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseBackend")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .field("table", &self.table)
            .field("direct_db", &self.db.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct OwnershipRow {
    id: i64,
    owner_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl SupabaseBackend {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        anon_key: impl Into<String>,
        bucket: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url,
            anon_key: anon_key.into(),
            bucket: bucket.into(),
            table: table.into(),
            db: None,
        }
    }

    /// Look ownership rows up in Postgres directly instead of going through PostgREST.
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.db = Some(pool);
        self
    }

    // `{base}/{segments...}`, each segment percent-encoded.
    fn endpoint<'a, I>(&self, segments: I) -> FileBackendResult<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FileBackendError::InvalidPayload("base url cannot hold a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> FileBackendResult<reqwest::RequestBuilder> {
        let apikey = HeaderValue::from_str(&self.anon_key)
            .map_err(|_| FileBackendError::InvalidPayload("anon key is not a header value".into()))?;
        Ok(req.header("apikey", apikey).bearer_auth(&self.anon_key))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> FileBackendResult<reqwest::Response> {
        let resp = self.authorize(req)?.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FileBackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }

    async fn find_via_rest(&self, path: &str) -> FileBackendResult<Option<FileOwnership>> {
        let url = self.endpoint(["rest", "v1", self.table.as_str()])?;

        let req = self.http.get(url).query(&[
            ("select", "id,owner_id".to_string()),
            ("path", format!("eq.{path}")),
            ("limit", "2".to_string()),
        ]);

        let rows: Vec<OwnershipRow> = self.send(req).await?.json().await?;

        Ok(single_ownership(rows))
    }
}

impl From<OwnershipRow> for FileOwnership {
    fn from(row: OwnershipRow) -> Self {
        FileOwnership {
            id: row.id,
            // A row without an owner can never match a verified subject.
            owner_id: row.owner_id.unwrap_or_default(),
        }
    }
}

impl From<file_repo::FileRow> for FileOwnership {
    fn from(row: file_repo::FileRow) -> Self {
        FileOwnership {
            id: row.id,
            owner_id: row.owner_id.unwrap_or_default(),
        }
    }
}

// Shared by the PostgREST and Postgres lookups.
fn single_ownership<R: Into<FileOwnership>>(rows: Vec<R>) -> Option<FileOwnership> {
    single(rows).map(Into::into)
}

// `.single()` semantics: exactly one row, anything else is "not found".
fn single<T>(rows: Vec<T>) -> Option<T> {
    let mut rows = rows.into_iter();
    match (rows.next(), rows.next()) {
        (Some(row), None) => Some(row),
        _ => None,
    }
}

#[async_trait]
impl FileBackend for SupabaseBackend {
    fn backend_name(&self) -> &'static str {
        if self.db.is_some() {
            "supabase+postgres"
        } else {
            "supabase"
        }
    }

    async fn find_file_ownership(&self, path: &str) -> FileBackendResult<Option<FileOwnership>> {
        match &self.db {
            Some(pool) => {
                let rows = file_repo::find_by_path(pool, &self.table, path).await?;
                Ok(single_ownership(rows))
            }
            None => self.find_via_rest(path).await,
        }
    }

    async fn create_signed_url(&self, path: &str, ttl_seconds: u64) -> FileBackendResult<String> {
        let object = normalize_object_path(path);

        let segments = ["storage", "v1", "object", "sign", self.bucket.as_str()]
            .into_iter()
            .chain(object.split('/'));
        let url = self.endpoint(segments)?;

        let req = self.http.post(url).json(&SignRequest {
            expires_in: ttl_seconds,
        });
        let signed: SignResponse = self.send(req).await?.json().await?;

        // Storage answers with a path relative to `/storage/v1`.
        let storage_base = self.endpoint(["storage", "v1"])?;
        let relative = signed.signed_url.trim();
        if !relative.starts_with('/') {
            return Err(FileBackendError::InvalidPayload(format!(
                "signedURL is not a path: {relative}"
            )));
        }

        let absolute = Url::parse(&format!("{}{}", storage_base.as_str(), relative))
            .map_err(|e| FileBackendError::InvalidPayload(format!("signedURL: {e}")))?;

        Ok(absolute.to_string())
    }
}

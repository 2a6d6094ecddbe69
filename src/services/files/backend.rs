//! File backend interface used by the signed-url handler.
use async_trait::async_trait;
use thiserror::Error;

use crate::repos::error::RepoError;

/// Signed URLs handed out by the service are valid for this long.
pub const SIGNED_URL_TTL_SECONDS: u64 = 60;

pub type FileBackendResult<T> = Result<T, FileBackendError>;

/// Backend-layer errors (transport/status/payload).
///
/// Kept separate from `AppError` so the handler decides which status a
/// failure becomes (lookup → 500, signing → 500 with its own message).
#[derive(Debug, Error)]
pub enum FileBackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected backend payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Ownership row of a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOwnership {
    pub id: i64,
    pub owner_id: String,
}

/// The two backend capabilities the handler needs.
///
/// Implementations must be cheap to share (`Arc<dyn FileBackend>` in `AppState`).
#[async_trait]
pub trait FileBackend: Send + Sync {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Ownership row for `path`.
    //
    // Returns:
    // - `Ok(Some(_))` exactly one row matched
    // - `Ok(None)`    no row, or the path is ambiguous (several rows)
    async fn find_file_ownership(&self, path: &str) -> FileBackendResult<Option<FileOwnership>>;

    // Absolute signed download URL for `path`, valid for `ttl_seconds`.
    async fn create_signed_url(&self, path: &str, ttl_seconds: u64) -> FileBackendResult<String>;
}

/// Collapse repeated `/` and strip leading/trailing ones, the way the storage
/// API expects object keys.
pub fn normalize_object_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_object_path_cleans_slashes() {
        assert_eq!(normalize_object_path("docs/a.pdf"), "docs/a.pdf");
        assert_eq!(normalize_object_path("/docs//a.pdf/"), "docs/a.pdf");
        assert_eq!(normalize_object_path("///"), "");
        assert_eq!(normalize_object_path("a b/c%d.pdf"), "a b/c%d.pdf");
    }
}

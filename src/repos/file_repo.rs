/*
 * Responsibility
 * - Read-only lookup of file ownership rows straight from Postgres
 * - Used instead of PostgREST when DATABASE_URL is configured
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct FileRow {
    pub id: i64,
    pub owner_id: Option<String>,
}

/// Rows whose `path` equals `path` (at most two, enough to detect ambiguity).
///
/// `table` must already be validated as a plain identifier (see `Config`).
pub async fn find_by_path(db: &PgPool, table: &str, path: &str) -> Result<Vec<FileRow>, RepoError> {
    let sql = format!(
        r#"
        SELECT id::bigint AS id, owner_id::text AS owner_id
        FROM "{table}"
        WHERE path = $1
        LIMIT 2
        "#
    );

    let rows = sqlx::query_as::<_, FileRow>(&sql)
        .bind(path)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

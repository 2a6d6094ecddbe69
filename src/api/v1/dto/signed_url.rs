/*
 * Responsibility
 * - Request/response DTOs of the signed-url endpoint
 * - validate() does the shape check (non-empty filePath)
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SignedUrlRequest {
    #[serde(rename = "filePath", default)]
    pub file_path: Option<String>,
}

impl SignedUrlRequest {
    /// Parse a raw body; anything that is not a JSON object with an optional
    /// string `filePath` is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self, &'static str> {
        serde_json::from_slice(body).map_err(|_| "filePath is required")
    }

    pub fn validate(&self) -> Result<&str, &'static str> {
        match self.file_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Ok(path),
            _ => Err("filePath is required"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
}

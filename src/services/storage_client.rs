//! Client for the provider's storage API: folder listing, uploads, and
//! synchronous public-URL construction.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::file_entry::StoredFile;

/// Bucket holding every student upload.
pub const UPLOADS_BUCKET: &str = "uploads";
/// Folder inside the bucket; the portal never writes anywhere else.
pub const PDF_FOLDER: &str = "pdfs";
/// The only accepted upload type.
pub const PDF_MIME: &str = "application/pdf";

const LIST_LIMIT: usize = 100;
const UPLOAD_CACHE_CONTROL: &str = "max-age=3600";

#[derive(Debug, Error)]
pub enum StorageApiError {
    #[error("{message}")]
    Provider { status: u16, message: String },
    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy<'a>,
}

#[derive(Debug, Serialize)]
struct SortBy<'a> {
    column: &'a str,
    order: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct StorageErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the provider's storage endpoints.
#[derive(Clone)]
pub struct StorageClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl StorageClient {
    pub fn new(http: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn provider_error(resp: reqwest::Response) -> StorageApiError {
        let status = resp.status();
        let payload = resp.json::<StorageErrorPayload>().await.unwrap_or_default();
        let message = payload
            .message
            .or(payload.error)
            .unwrap_or_else(|| format!("storage request failed (HTTP {status})"));
        StorageApiError::Provider {
            status: status.as_u16(),
            message,
        }
    }

    /// First page of the PDF folder, newest first. No pagination beyond the
    /// first `LIST_LIMIT` entries.
    pub async fn list_pdfs(
        &self,
        access_token: Option<&str>,
    ) -> Result<Vec<StoredFile>, StorageApiError> {
        let url = format!("{}/storage/v1/object/list/{UPLOADS_BUCKET}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token.unwrap_or(&self.api_key))
            .json(&ListRequest {
                prefix: PDF_FOLDER,
                limit: LIST_LIMIT,
                offset: 0,
                sort_by: SortBy {
                    column: "created_at",
                    order: "desc",
                },
            })
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(resp.json::<Vec<StoredFile>>().await?)
        } else {
            Err(Self::provider_error(resp).await)
        }
    }

    /// Single non-overwriting upload with a fixed cache-control hint and an
    /// explicit content type.
    pub async fn upload_pdf(
        &self,
        file_name: &str,
        bytes: Bytes,
        access_token: &str,
    ) -> Result<(), StorageApiError> {
        let url = format!(
            "{}/storage/v1/object/{UPLOADS_BUCKET}/{PDF_FOLDER}/{file_name}",
            self.base_url
        );
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .header(header::CACHE_CONTROL, UPLOAD_CACHE_CONTROL)
            .header("x-upsert", "false")
            .header(header::CONTENT_TYPE, PDF_MIME)
            .body(bytes)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::provider_error(resp).await)
        }
    }

    /// Public retrieval URL for a file in the PDF folder. Pure string
    /// construction, no network round trip.
    pub fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{UPLOADS_BUCKET}/{PDF_FOLDER}/{file_name}",
            self.base_url
        )
    }
}

/// Storage key for a new upload: `{identifier}_{epoch-millis}.{extension}`,
/// keeping the original file's extension.
pub fn object_key(identifier: &str, original_name: &str, now: DateTime<Utc>) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("pdf");
    format!("{identifier}_{}.{ext}", now.timestamp_millis())
}

/// Substitute the one provider error worth translating: a row-level-security
/// complaint means the bucket policy was never set up, which the raw message
/// does not say.
pub fn friendly_upload_error(err: &StorageApiError) -> String {
    let raw = err.to_string();
    if raw.contains("row-level security") {
        "The storage bucket has no insert policy configured. Ask an administrator to add a \
         row-level security policy for the uploads bucket."
            .to_string()
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn client() -> StorageClient {
        StorageClient::new(
            Client::new(),
            "https://project.supabase.co/",
            "anon-key",
        )
    }

    #[test]
    fn test_object_key_keeps_extension() {
        let now = Utc.timestamp_millis_opt(1_754_500_000_000).unwrap();
        assert_eq!(
            object_key("12345", "lecture notes.pdf", now),
            "12345_1754500000000.pdf"
        );
    }

    #[test]
    fn test_object_key_defaults_extension() {
        let now = Utc.timestamp_millis_opt(1_754_500_000_000).unwrap();
        assert_eq!(object_key("12345", "noext", now), "12345_1754500000000.pdf");
    }

    #[test]
    fn test_public_url_contains_storage_path() {
        let url = client().public_url("12345_1754500000000.pdf");
        assert_eq!(
            url,
            "https://project.supabase.co/storage/v1/object/public/uploads/pdfs/12345_1754500000000.pdf"
        );
    }

    #[test]
    fn test_row_level_security_error_is_rewritten() {
        let err = StorageApiError::Provider {
            status: 403,
            message: "new row violates row-level security policy".into(),
        };
        assert!(friendly_upload_error(&err).contains("insert policy"));
    }

    #[test]
    fn test_other_errors_pass_through_verbatim() {
        let err = StorageApiError::Provider {
            status: 404,
            message: "Bucket not found".into(),
        };
        assert_eq!(friendly_upload_error(&err), "Bucket not found");
    }
}

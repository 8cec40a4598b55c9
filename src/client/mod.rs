//! # Render Service Client
//!
//! Everything that leaves the process goes through [`MergeService`]: template
//! and spreadsheet uploads, render calls, progress polling and archive
//! downloads. [`HttpMergeClient`] is the production implementation; tests
//! swap in their own.
//!
//! ## Wire format
//!
//! | Call | Response |
//! |------|----------|
//! | template upload | `{filename, image_url}` |
//! | spreadsheet upload | `{columns, preview, all_data?}` |
//! | render | `{preview_urls: [..]}` |
//! | progress | `{percent}` |
//! | prepare archive | `{timestamp, unique_id, file_count}` |
//! | any failure | non-2xx with `{error}` |

pub mod endpoints;
mod http;

pub use endpoints::{DownloadMode, Endpoints, PreviewScope};
pub use http::HttpMergeClient;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DataMergeError;
use crate::progress::ProgressKind;
use crate::spreadsheet::{SpreadsheetData, cell_text};
use crate::submission::RenderRequest;
use crate::template::TemplateUpload;

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Guessed from the file name.
    pub content_type: String,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            bytes,
            content_type,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DataMergeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

/// `{preview_urls}` answer to a render call.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderResponse {
    pub preview_urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressResponse {
    pub percent: f64,
}

/// Body of archive requests.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveRequest<'a> {
    pub preview_urls: &'a [String],
}

/// Handle of a staged archive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchiveHandle {
    #[serde(deserialize_with = "text_or_number")]
    pub timestamp: String,
    #[serde(deserialize_with = "text_or_number")]
    pub unique_id: String,
    pub file_count: usize,
}

/// Error body of any failed call.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(cell_text(&value))
}

/// The render service, as seen by a merge session.
#[async_trait]
pub trait MergeService: Send + Sync {
    /// Routes this service was configured with.
    fn endpoints(&self) -> &Endpoints;

    async fn upload_template(&self, file: &UploadFile) -> Result<TemplateUpload, DataMergeError>;

    async fn upload_spreadsheet(&self, file: &UploadFile) -> Result<SpreadsheetData, DataMergeError>;

    /// Render the request's records; one preview URL per record, in order.
    async fn render(&self, request: &RenderRequest) -> Result<Vec<String>, DataMergeError>;

    /// Current percentage, or `None` when there is nothing to poll.
    async fn progress(&self, kind: ProgressKind) -> Result<Option<f64>, DataMergeError>;

    async fn prepare_archive(&self, preview_urls: &[String]) -> Result<ArchiveHandle, DataMergeError>;

    async fn fetch_archive(&self, handle: &ArchiveHandle) -> Result<Vec<u8>, DataMergeError>;

    /// Archive streamed back in one call.
    async fn download_archive(&self, preview_urls: &[String]) -> Result<Vec<u8>, DataMergeError>;
}

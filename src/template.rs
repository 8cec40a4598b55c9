//! # Template Image
//!
//! The base image every record is composited onto. Client-side we only
//! track where the service stored it and its native size; the native size is
//! read from the file before upload so no round-trip is needed to learn it.

use serde::Deserialize;

use crate::client::UploadFile;
use crate::editor::preview::decode_dimensions;
use crate::error::DataMergeError;
use crate::geometry::Size;

/// Template-store answer to an upload.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateUpload {
    /// Server-assigned file name, sent back with every render request.
    pub filename: String,
    /// URL the template can be displayed from.
    pub image_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// The uploaded template for the current editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub filename: String,
    pub url: String,
    /// Native pixel size of the image (template space).
    pub original: Size,
}

impl Template {
    pub fn new(filename: impl Into<String>, url: impl Into<String>, original: Size) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            original,
        }
    }

    pub fn from_upload(upload: TemplateUpload, original: Size) -> Self {
        Self::new(upload.filename, upload.image_url, original)
    }

    /// Size of the on-screen preview canvas: the image downscaled to fit `max_canvas`.
    pub fn canvas_size(&self, max_canvas: Size) -> Size {
        self.original.fit_within(max_canvas)
    }
}

/// Check a file is a decodable image and return its native size.
pub fn validate_template_file(file: &UploadFile) -> Result<Size, DataMergeError> {
    if file.file_name.trim().is_empty() || file.bytes.is_empty() {
        return Err(DataMergeError::validation("Please select an image file to upload"));
    }
    if !file.content_type.starts_with("image/") {
        return Err(DataMergeError::validation(
            "Please select a valid image file (JPEG, PNG, etc.)",
        ));
    }
    decode_dimensions(&file.bytes).map_err(|e| {
        DataMergeError::validation(format!("Error processing image: {}", e))
    })
}

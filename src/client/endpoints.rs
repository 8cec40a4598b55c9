//! Render-service routes per editor variant.
//!
//! | Operation | combined | images-only | text-only | text-on-template |
//! |-----------|----------|-------------|-----------|------------------|
//! | Upload template | `/upload_template` | `/upload_image_template` | — | `/upload_template` |
//! | Upload spreadsheet | `/upload_csv` | `/upload_image_csv` | `/upload_csv` | `/upload_csv` |
//! | Render | `/preview_combined_images` | `/preview_images` | `/generate_text_images` | `/preview_images` |
//! | Progress | `/preview_progress`, `/download_progress` | — | — | — |
//! | Archive | `/download_individual` + `/download_batch/{ts}/{id}` | `/download_previews` | `/download_text_previews` | `/download_previews` |

use crate::editor::capabilities::Variant;
use crate::progress::ProgressKind;

/// How a finished batch becomes a zip archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Ask the service to stage an archive, then fetch it by handle.
    Prepared {
        prepare: &'static str,
        /// Prefix; `/{timestamp}/{unique_id}` is appended.
        fetch: &'static str,
    },
    /// The archive streams back from a single POST.
    Direct(&'static str),
}

/// Which records the preview action renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewScope {
    /// Only the first record; others render on demand while navigating.
    FirstRecord,
    /// Every record up front; downloads reuse those renders.
    AllRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// Multipart field `template`. Absent when the variant has no template.
    pub upload_template: Option<&'static str>,
    /// Multipart field `csv`.
    pub upload_spreadsheet: &'static str,
    pub render: &'static str,
    pub preview_progress: Option<&'static str>,
    pub download_progress: Option<&'static str>,
    pub download: DownloadMode,
    pub preview_scope: PreviewScope,
}

impl Endpoints {
    pub const COMBINED: Self = Self {
        upload_template: Some("/upload_template"),
        upload_spreadsheet: "/upload_csv",
        render: "/preview_combined_images",
        preview_progress: Some("/preview_progress"),
        download_progress: Some("/download_progress"),
        download: DownloadMode::Prepared {
            prepare: "/download_individual",
            fetch: "/download_batch",
        },
        preview_scope: PreviewScope::FirstRecord,
    };

    pub const IMAGES_ONLY: Self = Self {
        upload_template: Some("/upload_image_template"),
        upload_spreadsheet: "/upload_image_csv",
        render: "/preview_images",
        preview_progress: None,
        download_progress: None,
        download: DownloadMode::Direct("/download_previews"),
        preview_scope: PreviewScope::AllRecords,
    };

    pub const TEXT_ONLY: Self = Self {
        upload_template: None,
        upload_spreadsheet: "/upload_csv",
        render: "/generate_text_images",
        preview_progress: None,
        download_progress: None,
        download: DownloadMode::Direct("/download_text_previews"),
        preview_scope: PreviewScope::AllRecords,
    };

    pub const TEXT_ON_TEMPLATE: Self = Self {
        upload_template: Some("/upload_template"),
        upload_spreadsheet: "/upload_csv",
        render: "/preview_images",
        preview_progress: None,
        download_progress: None,
        download: DownloadMode::Direct("/download_previews"),
        preview_scope: PreviewScope::AllRecords,
    };

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Combined => Self::COMBINED,
            Variant::ImagesOnly => Self::IMAGES_ONLY,
            Variant::TextOnly => Self::TEXT_ONLY,
            Variant::TextOnTemplate => Self::TEXT_ON_TEMPLATE,
        }
    }

    pub fn progress(&self, kind: ProgressKind) -> Option<&'static str> {
        match kind {
            ProgressKind::Preview => self.preview_progress,
            ProgressKind::Download => self.download_progress,
        }
    }
}

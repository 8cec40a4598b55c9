//! # Configuration
//!
//! Two halves, both with sensible defaults:
//!
//! | Type | Covers |
//! |------|--------|
//! | [`ClientConfig`] | Where the render service lives and how we talk to it |
//! | [`EditorConfig`] | Which editor variant runs and how geometry is translated |
//!
//! ## Usage
//!
//! ```
//! use datamerge::config::{ClientConfig, EditorConfig};
//! use datamerge::editor::capabilities::Variant;
//!
//! let client = ClientConfig::new("http://localhost:5000");
//! let editor = EditorConfig::for_variant(Variant::ImagesOnly);
//! assert_eq!(client.poll_interval.as_millis(), 500);
//! assert!(editor.capabilities().supports_images);
//! ```

use std::time::Duration;

use crate::editor::capabilities::{Capabilities, Variant};
use crate::geometry::{MAX_CANVAS, Size};
use crate::progress::ProgressPolicy;
use crate::submission::FontScaling;

/// Default render service address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Connection settings for the render service.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL every endpoint path and relative result URL is joined onto.
    pub base_url: String,
    /// Per-request timeout. Whole-batch renders can take minutes.
    pub timeout: Duration,
    /// How often progress endpoints are polled while a render runs.
    pub poll_interval: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(600),
            poll_interval: Duration::from_millis(500),
            user_agent: format!("datamerge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Editor behaviour for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub variant: Variant,
    /// Largest preview canvas; templates are downscaled to fit.
    pub max_canvas: Size,
    pub font_scaling: FontScaling,
    pub progress: ProgressPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

impl EditorConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            max_canvas: MAX_CANVAS,
            font_scaling: variant.capabilities().font_scaling,
            progress: ProgressPolicy::default(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.variant.capabilities()
    }
}

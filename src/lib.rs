//! # datamerge - Template-Based Bulk Image Generation
//!
//! datamerge is the client side of a mail-merge for images: place text and
//! image boxes over a template, bind each box to a spreadsheet column, and
//! let a render service stamp every record into its own image. It provides:
//!
//! - **Box layout editor**: create, select, drag, resize and style boxes over
//!   a scaled-down template preview, with a live preview of the first record
//! - **Submission geometry**: translation of the layout into template pixels
//! - **Render service client**: uploads, render calls, progress polling and
//!   archive downloads over HTTP
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use datamerge::{
//!     client::{HttpMergeClient, UploadFile},
//!     config::{ClientConfig, EditorConfig},
//!     editor::boxes::BoxKind,
//!     workflow::MergeSession,
//! };
//!
//! # async fn demo() -> Result<(), datamerge::DataMergeError> {
//! let config = EditorConfig::default();
//! let client = HttpMergeClient::new(&ClientConfig::new("http://localhost:5000"), config.variant)?;
//! let mut session = MergeSession::new(client, config, Duration::from_millis(500));
//!
//! session.upload_template(&UploadFile::from_path("card.png").await?).await?;
//! session.upload_spreadsheet(&UploadFile::from_path("people.csv").await?).await?;
//!
//! let id = session.add_box(BoxKind::Text, "name").await?;
//! session.editor_mut().move_box(id, 0.0, -120.0)?;
//! session.editor_mut().toggle_bold();
//!
//! session.generate_previews().await?;
//! let archive = session.download_all().await?;
//! std::fs::write("cards.zip", archive.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`editor`] | Box layout editor session, gestures, style controls, live preview |
//! | [`submission`] | Preview-to-template geometry and render request bodies |
//! | [`geometry`] | Points, sizes, rectangles, scale factors |
//! | [`template`] | Template upload validation and canvas fit |
//! | [`spreadsheet`] | Records and spreadsheet upload decoding |
//! | [`client`] | Render service trait and HTTP implementation |
//! | [`progress`] | Progress bar model and polling |
//! | [`navigator`] | Per-record preview navigation |
//! | [`workflow`] | Handler-level orchestration with status messages |
//! | [`layout`] | JSON layout documents |
//! | [`config`] | Client and editor configuration |
//! | [`error`] | Error types |

pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod navigator;
pub mod progress;
pub mod spreadsheet;
pub mod submission;
pub mod template;
pub mod workflow;

// Re-exports for convenience
pub use editor::EditorSession;
pub use error::DataMergeError;
pub use workflow::MergeSession;

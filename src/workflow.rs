//! # Merge Session
//!
//! Handler-level orchestration on top of the editor: every user action that
//! talks to the render service goes through a [`MergeSession`] method.
//!
//! ```text
//! upload_template ─┐
//!                  ├─▶ add_box / gestures / style edits ─▶ generate_previews ─▶ download_all
//! upload_spreadsheet┘                                          │
//!                                                  show_record / next / previous
//! ```
//!
//! Each handler reports its outcome as a [`StatusMessage`]. Failures are
//! logged, returned, and leave the editor as it was. Nothing is retried.

use std::time::Duration;

use log::{error, info};

use crate::client::{DownloadMode, MergeService, PreviewScope, UploadFile};
use crate::config::EditorConfig;
use crate::editor::EditorSession;
use crate::editor::boxes::{BoxId, BoxKind};
use crate::editor::preview::ImageProbe;
use crate::error::DataMergeError;
use crate::navigator::PreviewNavigator;
use crate::progress::{ProgressDisplay, ProgressKind, track};
use crate::spreadsheet::validate_spreadsheet_file;
use crate::template::{Template, validate_template_file};

/// Message shown in the page's status area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Which trigger buttons are usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerState {
    pub generate: bool,
    pub download: bool,
}

/// A finished zip archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    pub bytes: Vec<u8>,
    pub file_count: usize,
}

/// One page's worth of state: editor, preview snapshot, status and progress.
pub struct MergeSession<S> {
    service: S,
    config: EditorConfig,
    poll_interval: Duration,
    editor: EditorSession,
    navigator: Option<PreviewNavigator>,
    status: Option<StatusMessage>,
    preview_progress: ProgressDisplay,
    download_progress: ProgressDisplay,
}

impl<S> MergeSession<S>
where
    S: MergeService + ImageProbe,
{
    pub fn new(service: S, config: EditorConfig, poll_interval: Duration) -> Self {
        let editor = EditorSession::new(config.capabilities(), config.max_canvas);
        Self {
            service,
            preview_progress: ProgressDisplay::new(config.progress),
            download_progress: ProgressDisplay::new(config.progress),
            config,
            poll_interval,
            editor,
            navigator: None,
            status: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    /// Direct access for gestures and style edits.
    pub fn editor_mut(&mut self) -> &mut EditorSession {
        &mut self.editor
    }

    pub fn navigator(&self) -> Option<&PreviewNavigator> {
        self.navigator.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn preview_progress(&self) -> &ProgressDisplay {
        &self.preview_progress
    }

    pub fn download_progress(&self) -> &ProgressDisplay {
        &self.download_progress
    }

    pub fn triggers(&self) -> TriggerState {
        TriggerState {
            generate: self.ready_to_preview(),
            download: self.navigator.is_some(),
        }
    }

    /// Validate, upload and install a template. Clears all boxes.
    pub async fn upload_template(&mut self, file: &UploadFile) -> Result<&Template, DataMergeError> {
        if let Err(e) = self.install_template(file).await {
            return Err(self.fail("Error uploading template", e));
        }
        self.navigator = None;
        self.report(StatusMessage::info("Template uploaded successfully"));
        self.editor
            .template()
            .ok_or_else(|| DataMergeError::validation("Template was not installed"))
    }

    async fn install_template(&mut self, file: &UploadFile) -> Result<(), DataMergeError> {
        let original = validate_template_file(file)?;
        let upload = self.service.upload_template(file).await?;
        self.editor
            .set_template(Template::from_upload(upload, original))
    }

    /// Validate, upload and install a spreadsheet, then load image previews.
    ///
    /// Returns the number of records.
    pub async fn upload_spreadsheet(&mut self, file: &UploadFile) -> Result<usize, DataMergeError> {
        let uploaded = match validate_spreadsheet_file(&file.file_name) {
            Ok(()) => self.service.upload_spreadsheet(file).await,
            Err(e) => Err(e),
        };
        let data = match uploaded {
            Ok(data) => data,
            Err(e) => return Err(self.fail("Error uploading file", e)),
        };
        let rows = data.rows().len();
        self.editor.load_spreadsheet(data);
        self.navigator = None;
        self.report(StatusMessage::info("CSV data uploaded successfully"));
        self.load_images().await;
        Ok(rows)
    }

    /// Add a box bound to `column`, styled from the current controls.
    pub async fn add_box(&mut self, kind: BoxKind, column: &str) -> Result<BoxId, DataMergeError> {
        match self.editor.create_box(kind, column, None) {
            Ok(id) => {
                self.load_images().await;
                Ok(id)
            }
            Err(e) => Err(self.fail("Error adding box", e)),
        }
    }

    /// Resolve every pending image preview through the probe.
    pub async fn load_images(&mut self) {
        for (id, url) in self.editor.pending_image_loads() {
            let result = self.service.probe(&url).await;
            self.editor.complete_image_load(id, &url, result);
        }
    }

    /// Render previews with the current boxes and reset navigation.
    ///
    /// Combined pages render only the first record; the others render every
    /// record up front.
    pub async fn generate_previews(&mut self) -> Result<&PreviewNavigator, DataMergeError> {
        if !self.ready_to_preview() {
            return Err(self.fail(
                "Error generating previews",
                DataMergeError::validation("Please complete all steps before previewing images"),
            ));
        }
        let mut navigator = match self.snapshot() {
            Ok(n) => n,
            Err(e) => return Err(self.fail("Error generating previews", e)),
        };
        let scope = self.service.endpoints().preview_scope;
        let request = match scope {
            PreviewScope::FirstRecord => navigator.request(0, 1),
            PreviewScope::AllRecords => navigator.full_request(),
        };

        self.preview_progress.show();
        let result = track(
            &self.service,
            ProgressKind::Preview,
            self.poll_interval,
            &mut self.preview_progress,
            self.service.render(&request),
        )
        .await;
        self.preview_progress.hide();

        match result {
            Ok(urls) if urls.is_empty() => Err(self.fail(
                "Error generating previews",
                DataMergeError::MalformedResponse("Server returned no preview URLs".to_string()),
            )),
            Ok(urls) => {
                navigator.store(0, urls);
                let message = match scope {
                    PreviewScope::FirstRecord => {
                        format!("Preview generated. Total records: {}", navigator.total())
                    }
                    PreviewScope::AllRecords => "Previews generated successfully!".to_string(),
                };
                self.report(StatusMessage::info(message));
                Ok(self.navigator.insert(navigator))
            }
            Err(e) => Err(self.fail("Error generating previews", e)),
        }
    }

    /// Show a 1-based record number, rendering it if needed.
    pub async fn show_record(&mut self, record_number: i64) -> Result<String, DataMergeError> {
        let shown = match self.navigator.as_mut() {
            Some(navigator) => navigator
                .jump(&self.service, record_number)
                .await
                .map(|url| (url, navigator.total())),
            None => Err(DataMergeError::validation("Generate previews first")),
        };
        match shown {
            Ok((url, total)) => {
                let text = format!("Showing record {} of {}", record_number, total);
                self.report(StatusMessage::info(text));
                Ok(url)
            }
            Err(e) => Err(self.fail("Error generating preview", e)),
        }
    }

    pub async fn next_record(&mut self) -> Result<Option<String>, DataMergeError> {
        self.step(1).await
    }

    pub async fn previous_record(&mut self) -> Result<Option<String>, DataMergeError> {
        self.step(-1).await
    }

    async fn step(&mut self, direction: isize) -> Result<Option<String>, DataMergeError> {
        let Some(navigator) = self.navigator.as_mut() else {
            return Ok(None);
        };
        match navigator.navigate(&self.service, direction).await {
            Ok(url) => Ok(url),
            Err(e) => Err(self.fail("Error generating preview", e)),
        }
    }

    /// Render every record with the previewed layout and fetch the zip.
    pub async fn download_all(&mut self) -> Result<Archive, DataMergeError> {
        if self.navigator.is_none() {
            return Err(self.fail(
                "Error downloading preview images",
                DataMergeError::validation("No preview data available to download"),
            ));
        }
        self.report(StatusMessage::info(
            "Generating all images for download. This may take a moment...",
        ));
        self.download_progress.show();
        let result = self.download().await;
        self.download_progress.hide();

        match result {
            Ok(archive) => {
                self.report(StatusMessage::info(format!(
                    "Download initiated for {} images.",
                    archive.file_count
                )));
                Ok(archive)
            }
            Err(e) => Err(self.fail("Error downloading preview images", e)),
        }
    }

    async fn download(&mut self) -> Result<Archive, DataMergeError> {
        let navigator = self
            .navigator
            .as_mut()
            .ok_or_else(|| DataMergeError::validation("No preview data available to download"))?;
        let policy = self.config.progress;

        let urls = match (self.service.endpoints().download, navigator.all_urls()) {
            (DownloadMode::Direct(_), Some(urls)) => urls,
            _ => {
                let request = navigator.full_request();
                let urls = track(
                    &self.service,
                    ProgressKind::Download,
                    self.poll_interval,
                    &mut self.download_progress,
                    self.service.render(&request),
                )
                .await?;
                if urls.len() != navigator.total() {
                    return Err(DataMergeError::MalformedResponse(format!(
                        "Expected {} preview URLs, got {}",
                        navigator.total(),
                        urls.len()
                    )));
                }
                navigator.store(0, urls.clone());
                urls
            }
        };
        info!("Generated {} images. Preparing download...", urls.len());
        self.download_progress.update(policy.rendered);

        let archive = match self.service.endpoints().download {
            DownloadMode::Prepared { .. } => {
                let handle = self.service.prepare_archive(&urls).await?;
                self.download_progress.update(policy.prepared);
                let bytes = self.service.fetch_archive(&handle).await?;
                Archive {
                    bytes,
                    file_count: handle.file_count,
                }
            }
            DownloadMode::Direct(_) => Archive {
                bytes: self.service.download_archive(&urls).await?,
                file_count: urls.len(),
            },
        };
        self.download_progress.update(100.0);
        Ok(archive)
    }

    fn ready_to_preview(&self) -> bool {
        let template_ok =
            !self.editor.capabilities().requires_template || self.editor.template().is_some();
        let data_ok = self.editor.spreadsheet().is_some_and(|s| !s.is_empty());
        template_ok && data_ok && !self.editor.boxes().is_empty()
    }

    /// Freeze the current boxes and records for rendering.
    fn snapshot(&self) -> Result<PreviewNavigator, DataMergeError> {
        let boxes = self.editor.submission_geometry(self.config.font_scaling)?;
        let records = self
            .editor
            .spreadsheet()
            .map(|s| s.rows().to_vec())
            .unwrap_or_default();
        let template = self.editor.template().map(|t| t.filename.clone());
        let canvas = if self.editor.capabilities().requires_template {
            None
        } else {
            self.editor.canvas()
        };
        Ok(PreviewNavigator::new(template, boxes, records, canvas))
    }

    fn report(&mut self, status: StatusMessage) {
        info!("{}", status.text);
        self.status = Some(status);
    }

    /// Record a failed action. Validation messages are shown bare.
    fn fail(&mut self, action: &str, e: DataMergeError) -> DataMergeError {
        let text = match &e {
            DataMergeError::Validation(message) => message.clone(),
            other => format!("{}: {}", action, other),
        };
        error!("{}", text);
        self.status = Some(StatusMessage::error(text));
        e
    }
}

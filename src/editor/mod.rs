//! # Box Layout Editor
//!
//! An [`EditorSession`] owns everything one editing page needs: the template,
//! the spreadsheet data, the boxes placed over the preview canvas, the
//! current selection, the active pointer gesture and the style-control form.
//!
//! ## Invariants
//!
//! - Every box lies fully inside the preview canvas (unless the box is larger
//!   than the canvas, in which case it is pinned to the origin).
//! - No box is smaller than the variant's minimum size.
//! - At most one box is selected; the style controls always mirror it.
//! - At most one drag or resize gesture is active.
//!
//! ## Example
//!
//! ```
//! use datamerge::editor::{EditorSession, boxes::BoxKind, capabilities::Capabilities};
//! use datamerge::geometry::{MAX_CANVAS, Size};
//! use datamerge::spreadsheet::{Record, SpreadsheetData};
//! use datamerge::template::Template;
//!
//! let mut editor = EditorSession::new(Capabilities::COMBINED, MAX_CANVAS);
//! editor.set_template(Template::new("t.png", "/t.png", Size::new(1600.0, 1200.0)))?;
//! editor.load_spreadsheet(SpreadsheetData::new(
//!     vec!["name".into()],
//!     vec![Record::from([("name".into(), "Ada".into())])],
//! ));
//!
//! let id = editor.create_box(BoxKind::Text, "name", None)?;
//! editor.move_box(id, -1000.0, 0.0)?;
//! assert_eq!(editor.get(id).unwrap().position().x, 0.0);
//! # Ok::<(), datamerge::DataMergeError>(())
//! ```

pub mod boxes;
pub mod capabilities;
pub mod controls;
pub mod gesture;
pub mod preview;

use log::{debug, warn};

use crate::error::DataMergeError;
use crate::geometry::{Point, Rect, Size, clamp_origin};
use crate::spreadsheet::{Record, SpreadsheetData};
use crate::submission::{BoxConfig, FontScaling, compute_submission_geometry};
use crate::template::Template;

use boxes::{BoxId, BoxKind, LayoutBox, TextStyle};
use capabilities::Capabilities;
use controls::StyleControls;
use gesture::Gesture;
use preview::BoxPreview;

/// Editing state of one page.
#[derive(Debug, Clone)]
pub struct EditorSession {
    capabilities: Capabilities,
    max_canvas: Size,
    canvas: Option<Size>,
    template: Option<Template>,
    spreadsheet: Option<SpreadsheetData>,
    boxes: Vec<LayoutBox>,
    selected: Option<BoxId>,
    gesture: Gesture,
    controls: StyleControls,
}

impl EditorSession {
    /// Create an empty session.
    ///
    /// Variants without a template get a blank canvas of `max_canvas` right away.
    pub fn new(capabilities: Capabilities, max_canvas: Size) -> Self {
        let canvas = (!capabilities.requires_template).then_some(max_canvas);
        Self {
            capabilities,
            max_canvas,
            canvas,
            template: None,
            spreadsheet: None,
            boxes: Vec::new(),
            selected: None,
            gesture: Gesture::Idle,
            controls: StyleControls::default(),
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Preview canvas size, once known.
    pub fn canvas(&self) -> Option<Size> {
        self.canvas
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn spreadsheet(&self) -> Option<&SpreadsheetData> {
        self.spreadsheet.as_ref()
    }

    /// Boxes in creation order.
    pub fn boxes(&self) -> &[LayoutBox] {
        &self.boxes
    }

    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn selected(&self) -> Option<BoxId> {
        self.selected
    }

    pub fn selected_box(&self) -> Option<&LayoutBox> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn controls(&self) -> &StyleControls {
        &self.controls
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Size of template space: the template's native size, or the blank
    /// canvas for variants without a template.
    pub fn original_size(&self) -> Option<Size> {
        match &self.template {
            Some(t) => Some(t.original),
            None if !self.capabilities.requires_template => self.canvas,
            None => None,
        }
    }

    /// Install a (new) template. Clears every box and the selection.
    pub fn set_template(&mut self, template: Template) -> Result<(), DataMergeError> {
        if !self.capabilities.requires_template {
            return Err(DataMergeError::validation(format!(
                "The {} editor does not use a template",
                self.capabilities.variant
            )));
        }
        if template.original.is_empty() {
            return Err(DataMergeError::validation("Template image has no size"));
        }
        let canvas = template.canvas_size(self.max_canvas);
        debug!(
            "template {} ({}x{}) laid out at {}x{}",
            template.filename,
            template.original.width,
            template.original.height,
            canvas.width,
            canvas.height
        );
        self.canvas = Some(canvas);
        self.template = Some(template);
        self.boxes.clear();
        self.selected = None;
        self.gesture = Gesture::Idle;
        Ok(())
    }

    /// Replace the spreadsheet data and refresh every box preview.
    pub fn load_spreadsheet(&mut self, data: SpreadsheetData) {
        self.spreadsheet = Some(data);
        let ids: Vec<BoxId> = self.boxes.iter().map(|b| b.id).collect();
        for id in ids {
            self.refresh_preview(id);
        }
    }

    /// The record live previews are rendered from.
    pub fn first_record(&self) -> Option<&Record> {
        self.spreadsheet.as_ref().and_then(|s| s.first_record())
    }

    /// Add a box centered in the canvas and select it.
    ///
    /// `style_defaults` applies to text boxes; `None` uses the current style
    /// controls.
    pub fn create_box(
        &mut self,
        kind: BoxKind,
        column: &str,
        style_defaults: Option<TextStyle>,
    ) -> Result<BoxId, DataMergeError> {
        let sheet = self
            .spreadsheet
            .as_ref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DataMergeError::validation("Please upload data first"))?;
        if !self.capabilities.supports(kind) {
            return Err(DataMergeError::validation(format!(
                "The {} editor does not support {} boxes",
                self.capabilities.variant, kind
            )));
        }
        if !sheet.has_column(column) {
            return Err(DataMergeError::validation(format!(
                "Unknown column '{}'",
                column
            )));
        }
        let canvas = self
            .canvas
            .ok_or_else(|| DataMergeError::validation("Please upload a template first"))?;

        let rect = Rect::centered_in(self.capabilities.default_size(kind), canvas);
        let style = match kind {
            BoxKind::Text => Some(style_defaults.unwrap_or_else(|| self.controls.style.clone())),
            BoxKind::Image => None,
        };
        let layout_box = LayoutBox::new(kind, column.to_string(), rect, style);
        let id = layout_box.id;
        debug!(
            "created {} box {} for column '{}' at ({}, {})",
            kind, id, column, rect.origin.x, rect.origin.y
        );
        self.boxes.push(layout_box);
        self.select_box(id)?;
        self.refresh_preview(id);
        Ok(id)
    }

    /// Select `id` and mirror its attributes into the style controls.
    pub fn select_box(&mut self, id: BoxId) -> Result<(), DataMergeError> {
        let b = self
            .boxes
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| unknown_box(id))?;
        self.controls.sync_from(b);
        self.selected = Some(id);
        Ok(())
    }

    /// Move by a pointer delta, clamped so the box stays inside the canvas.
    pub fn move_box(&mut self, id: BoxId, dx: f64, dy: f64) -> Result<Point, DataMergeError> {
        let current = self.get(id).ok_or_else(|| unknown_box(id))?.position;
        self.place_box(id, current.x + dx, current.y + dy)
    }

    /// Move to an absolute position, with the same clamping as [`move_box`](Self::move_box).
    pub fn place_box(&mut self, id: BoxId, x: f64, y: f64) -> Result<Point, DataMergeError> {
        let canvas = self.require_canvas()?;
        let b = self.box_mut(id)?;
        b.position = clamp_origin(Point::new(x, y), b.size, canvas);
        Ok(b.position)
    }

    /// Resize with the top-left corner fixed.
    ///
    /// Never below the variant minimum; capped at the canvas edge unless
    /// that would break the minimum. Re-renders the preview.
    pub fn resize_box(&mut self, id: BoxId, width: f64, height: f64) -> Result<Size, DataMergeError> {
        let canvas = self.require_canvas()?;
        let min = self.capabilities.min_size;
        let b = self.box_mut(id)?;
        let max_w = canvas.width - b.position.x;
        let max_h = canvas.height - b.position.y;
        b.size = Size::new(width.min(max_w).max(min.width), height.min(max_h).max(min.height));
        let size = b.size;
        self.refresh_preview(id);
        Ok(size)
    }

    /// Remove a box. Selection is cleared only if it pointed at this box.
    pub fn delete_box(&mut self, id: BoxId) -> Result<LayoutBox, DataMergeError> {
        let index = self
            .boxes
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| unknown_box(id))?;
        let removed = self.boxes.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.gesture.box_id() == Some(id) {
            self.gesture = Gesture::Idle;
        }
        debug!("deleted {} box {}", removed.kind, id);
        Ok(removed)
    }

    /// Re-render a box's live content from the first record.
    pub fn update_preview_content(&mut self, id: BoxId) -> Result<&BoxPreview, DataMergeError> {
        if self.get(id).is_none() {
            return Err(unknown_box(id));
        }
        self.refresh_preview(id);
        Ok(&self.box_mut(id)?.preview)
    }

    /// Image URLs waiting for an [`ImageProbe`](preview::ImageProbe).
    pub fn pending_image_loads(&self) -> Vec<(BoxId, String)> {
        self.boxes
            .iter()
            .filter_map(|b| b.preview.pending_url().map(|u| (b.id, u.to_string())))
            .collect()
    }

    /// Record the outcome of an image load.
    ///
    /// Ignored if the box is gone or now shows a different URL.
    pub fn complete_image_load(&mut self, id: BoxId, url: &str, result: Result<Size, DataMergeError>) {
        let Ok(b) = self.box_mut(id) else {
            return;
        };
        if b.preview.pending_url() != Some(url) {
            return;
        }
        b.preview = match result {
            Ok(natural) => BoxPreview::Image {
                url: url.to_string(),
                natural,
            },
            Err(e) => {
                warn!("image preview for box {} failed: {}", id, e);
                BoxPreview::InvalidImage {
                    url: url.to_string(),
                }
            }
        };
    }

    /// Template-space configuration of every box, for a render request.
    pub fn submission_geometry(&self, font_scaling: FontScaling) -> Result<Vec<BoxConfig>, DataMergeError> {
        let canvas = self.require_canvas()?;
        let original = self
            .original_size()
            .ok_or_else(|| DataMergeError::validation("Please upload a template first"))?;
        compute_submission_geometry(&self.boxes, original, canvas, font_scaling, &self.capabilities)
    }

    fn require_canvas(&self) -> Result<Size, DataMergeError> {
        self.canvas
            .ok_or_else(|| DataMergeError::validation("Please upload a template first"))
    }

    fn box_mut(&mut self, id: BoxId) -> Result<&mut LayoutBox, DataMergeError> {
        self.boxes
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| unknown_box(id))
    }

    /// Column missing from the first record leaves the content untouched.
    fn refresh_preview(&mut self, id: BoxId) {
        let Some(record) = self.spreadsheet.as_ref().and_then(|s| s.first_record()) else {
            return;
        };
        let Some(b) = self.boxes.iter_mut().find(|b| b.id == id) else {
            return;
        };
        let Some(value) = record.get(&b.column) else {
            return;
        };
        let next = BoxPreview::render(b.kind, b.style.as_ref(), Some(value.as_str()));
        // Keep a loaded (or failed) image when only the geometry changed.
        let same_url = match (&b.preview, next.pending_url()) {
            (BoxPreview::Image { url, .. } | BoxPreview::InvalidImage { url }, Some(next_url)) => {
                url == next_url
            }
            _ => false,
        };
        if !same_url {
            b.preview = next;
        }
    }
}

fn unknown_box(id: BoxId) -> DataMergeError {
    DataMergeError::validation(format!("No box with id {}", id))
}

//! # Layout Documents
//!
//! A layout is the list of boxes of an editing session, saved as JSON in
//! preview pixels. The CLI uses it to drive an editor without a pointer.
//!
//! ```json
//! {
//!   "boxes": [
//!     {"kind": "text", "column": "name", "x": 100, "y": 80, "fontSize": 32, "bold": true},
//!     {"kind": "image", "column": "photo", "x": 500, "y": 300, "width": 200, "height": 200}
//!   ]
//! }
//! ```
//!
//! Missing sizes fall back to the variant's default box size and missing
//! style fields to the default text style.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::editor::EditorSession;
use crate::editor::boxes::{Alignment, BoxId, BoxKind, FontFamily, TextStyle, clamp_font_size, parse_color};
use crate::error::DataMergeError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub boxes: Vec<LayoutEntry>,
}

/// One box of a layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEntry {
    pub kind: BoxKind,
    pub column: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Alignment>,
}

fn is_false(b: &bool) -> bool {
    !b
}

impl LayoutEntry {
    /// Text style described by this entry.
    pub fn style(&self) -> Result<TextStyle, DataMergeError> {
        let defaults = TextStyle::default();
        Ok(TextStyle {
            font_family: self.font_family.unwrap_or(defaults.font_family),
            font_size: self
                .font_size
                .map(clamp_font_size)
                .unwrap_or(defaults.font_size),
            color: match &self.color {
                Some(c) => parse_color(c)?,
                None => defaults.color,
            },
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            strikethrough: self.strikethrough,
            align: self.align.unwrap_or(defaults.align),
        })
    }
}

impl LayoutDocument {
    pub fn from_json(json: &str) -> Result<Self, DataMergeError> {
        serde_json::from_str(json)
            .map_err(|e| DataMergeError::validation(format!("Invalid layout: {}", e)))
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DataMergeError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Snapshot the boxes of an editor session.
    pub fn capture(editor: &EditorSession) -> Self {
        let boxes = editor
            .boxes()
            .iter()
            .map(|b| {
                let style = b.style().cloned().unwrap_or_default();
                let text = b.kind() == BoxKind::Text;
                LayoutEntry {
                    kind: b.kind(),
                    column: b.column().to_string(),
                    x: b.position().x,
                    y: b.position().y,
                    width: Some(b.size().width),
                    height: Some(b.size().height),
                    font_size: text.then_some(style.font_size as i64),
                    color: text.then(|| style.color.clone()),
                    font_family: text.then_some(style.font_family),
                    bold: text && style.bold,
                    italic: text && style.italic,
                    underline: text && style.underline,
                    strikethrough: text && style.strikethrough,
                    align: text.then_some(style.align),
                }
            })
            .collect();
        Self { boxes }
    }

    /// Create every box in `editor`, in document order.
    ///
    /// Validates all entries before touching the editor, so a bad document
    /// adds nothing.
    pub fn apply(&self, editor: &mut EditorSession) -> Result<Vec<BoxId>, DataMergeError> {
        let styles = self
            .boxes
            .iter()
            .map(|e| match e.kind {
                BoxKind::Text => e.style().map(Some),
                BoxKind::Image => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;
        for entry in &self.boxes {
            if !editor.capabilities().supports(entry.kind) {
                return Err(DataMergeError::validation(format!(
                    "The {} editor does not support {} boxes",
                    editor.capabilities().variant,
                    entry.kind
                )));
            }
            let known = editor
                .spreadsheet()
                .is_some_and(|s| s.has_column(&entry.column));
            if !known {
                return Err(DataMergeError::validation(format!(
                    "Unknown column '{}'",
                    entry.column
                )));
            }
        }

        let mut ids = Vec::with_capacity(self.boxes.len());
        for (entry, style) in self.boxes.iter().zip(styles) {
            let id = editor.create_box(entry.kind, &entry.column, style)?;
            if entry.width.is_some() || entry.height.is_some() {
                let default = editor.capabilities().default_size(entry.kind);
                editor.place_box(id, 0.0, 0.0)?;
                editor.resize_box(
                    id,
                    entry.width.unwrap_or(default.width),
                    entry.height.unwrap_or(default.height),
                )?;
            }
            editor.place_box(id, entry.x, entry.y)?;
            ids.push(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::capabilities::Capabilities;
    use crate::geometry::{MAX_CANVAS, Point, Size};
    use crate::spreadsheet::{Record, SpreadsheetData};
    use crate::template::Template;
    use pretty_assertions::assert_eq;

    fn editor() -> EditorSession {
        let mut e = EditorSession::new(Capabilities::COMBINED, MAX_CANVAS);
        e.set_template(Template::new("t.png", "/t.png", Size::new(800.0, 600.0)))
            .unwrap();
        e.load_spreadsheet(SpreadsheetData::new(
            vec!["name".to_string(), "photo".to_string()],
            vec![Record::from([
                ("name".to_string(), "Ada".to_string()),
                ("photo".to_string(), "http://img/ada.png".to_string()),
            ])],
        ));
        e
    }

    const DOC: &str = r##"{
        "boxes": [
            {"kind": "text", "column": "name", "x": 100, "y": 80, "fontSize": 300,
             "color": "#F00", "fontFamily": "Georgia", "bold": true, "align": "center"},
            {"kind": "image", "column": "photo", "x": 700, "y": 500, "width": 150, "height": 120}
        ]
    }"##;

    #[test]
    fn test_apply_places_boxes() {
        let mut e = editor();
        let doc = LayoutDocument::from_json(DOC).unwrap();
        let ids = doc.apply(&mut e).unwrap();
        assert_eq!(ids.len(), 2);

        let text = e.get(ids[0]).unwrap();
        assert_eq!(text.position(), Point::new(100.0, 80.0));
        assert_eq!(text.size(), Size::new(150.0, 60.0));
        let style = text.style().unwrap();
        assert_eq!(style.font_size, 200);
        assert_eq!(style.color, "#ff0000");
        assert_eq!(style.font_family, FontFamily::Georgia);
        assert!(style.bold);
        assert_eq!(style.align, Alignment::Center);

        let image = e.get(ids[1]).unwrap();
        assert_eq!(image.size(), Size::new(150.0, 120.0));
        assert_eq!(image.position(), Point::new(650.0, 480.0));
    }

    #[test]
    fn test_bad_entry_adds_nothing() {
        let mut e = editor();
        let doc = LayoutDocument::from_json(
            r#"{"boxes": [{"kind": "text", "column": "name"}, {"kind": "text", "column": "nope"}]}"#,
        )
        .unwrap();
        assert!(doc.apply(&mut e).is_err());
        assert!(e.boxes().is_empty());

        let doc = LayoutDocument::from_json(
            r#"{"boxes": [{"kind": "text", "column": "name", "color": "red"}]}"#,
        )
        .unwrap();
        assert!(doc.apply(&mut e).is_err());
        assert!(e.boxes().is_empty());
    }

    #[test]
    fn test_capture_reapplies_identically() {
        let mut e = editor();
        LayoutDocument::from_json(DOC).unwrap().apply(&mut e).unwrap();
        let captured = LayoutDocument::capture(&e);

        let mut fresh = editor();
        captured.apply(&mut fresh).unwrap();
        assert_eq!(LayoutDocument::capture(&fresh), captured);
    }

    #[test]
    fn test_invalid_json() {
        let err = LayoutDocument::from_json("{").unwrap_err();
        assert!(err.to_string().starts_with("Invalid layout"));
    }
}

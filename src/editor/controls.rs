//! Style-control form state.
//!
//! The form and the selection are coupled 1:1: selecting a box loads its
//! attributes into the controls, and every control edit writes straight
//! through to the selected text box. Edits with nothing (or an image box)
//! selected are ignored and report `false`.

use crate::error::DataMergeError;

use super::EditorSession;
use super::boxes::{
    Alignment, BoxKind, FONT_SIZE_STEP, FontFamily, LayoutBox, TextStyle, clamp_font_size,
    parse_color,
};

/// Current values of the property-editing form.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleControls {
    /// Column picker value.
    pub column: Option<String>,
    /// Text style inputs. Also the defaults for newly created text boxes.
    pub style: TextStyle,
    /// Which property tab is showing.
    pub active_tab: BoxKind,
}

impl Default for StyleControls {
    fn default() -> Self {
        Self {
            column: None,
            style: TextStyle::default(),
            active_tab: BoxKind::Text,
        }
    }
}

impl StyleControls {
    /// Load a box's attributes into the form.
    pub fn sync_from(&mut self, b: &LayoutBox) {
        self.column = Some(b.column.clone());
        self.active_tab = b.kind;
        if let Some(style) = &b.style {
            self.style = style.clone();
        }
    }
}

impl EditorSession {
    /// Apply `edit` to the selected text box, then mirror and re-render.
    ///
    /// The box's stored style always changes. Its preview is left as it was
    /// when the column is missing from the first record.
    fn edit_selected_text(&mut self, edit: impl FnOnce(&mut TextStyle)) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let Ok(b) = self.box_mut(id) else {
            return false;
        };
        let Some(style) = b.style.as_mut() else {
            return false;
        };
        edit(style);
        let updated = style.clone();
        self.controls.style = updated;
        self.refresh_preview(id);
        true
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.edit_selected_text(|s| s.bold = !s.bold)
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.edit_selected_text(|s| s.italic = !s.italic)
    }

    pub fn toggle_underline(&mut self) -> bool {
        self.edit_selected_text(|s| s.underline = !s.underline)
    }

    /// Only the combined variant offers strikethrough.
    pub fn toggle_strikethrough(&mut self) -> bool {
        if !self.capabilities.supports_strikethrough {
            return false;
        }
        self.edit_selected_text(|s| s.strikethrough = !s.strikethrough)
    }

    /// Set the font size, clamped to 8..=200. Returns the applied size.
    pub fn set_font_size(&mut self, size: i64) -> Option<u32> {
        let size = clamp_font_size(size);
        self.edit_selected_text(|s| s.font_size = size)
            .then_some(size)
    }

    /// Nudge the font size by `steps` increments of 2 points.
    pub fn step_font_size(&mut self, steps: i32) -> Option<u32> {
        let current = self.selected_box()?.style()?.font_size;
        self.set_font_size(current as i64 + (steps * FONT_SIZE_STEP) as i64)
    }

    /// Set the text color (`#rrggbb` or `#rgb`).
    pub fn set_color(&mut self, color: &str) -> Result<bool, DataMergeError> {
        let color = parse_color(color)?;
        Ok(self.edit_selected_text(|s| s.color = color))
    }

    pub fn set_font_family(&mut self, family: FontFamily) -> bool {
        self.edit_selected_text(|s| s.font_family = family)
    }

    pub fn set_alignment(&mut self, align: Alignment) -> bool {
        self.edit_selected_text(|s| s.align = align)
    }

    /// Rebind the selected box (text or image) to another column.
    pub fn set_column(&mut self, column: &str) -> Result<bool, DataMergeError> {
        let known = self
            .spreadsheet
            .as_ref()
            .is_some_and(|s| s.has_column(column));
        if !known {
            return Err(DataMergeError::validation(format!("Unknown column '{}'", column)));
        }
        let Some(id) = self.selected else {
            return Ok(false);
        };
        self.box_mut(id)?.column = column.to_string();
        self.controls.column = Some(column.to_string());
        self.refresh_preview(id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::capabilities::Capabilities;
    use crate::geometry::{MAX_CANVAS, Size};
    use crate::spreadsheet::{Record, SpreadsheetData};
    use crate::template::Template;

    fn editor(caps: Capabilities) -> EditorSession {
        let mut e = EditorSession::new(caps, MAX_CANVAS);
        if caps.requires_template {
            e.set_template(Template::new("t.png", "/t.png", Size::new(800.0, 600.0)))
                .unwrap();
        }
        e.load_spreadsheet(SpreadsheetData::new(
            vec!["name".to_string(), "title".to_string(), "photo".to_string()],
            vec![Record::from([
                ("name".to_string(), "Ada".to_string()),
                ("title".to_string(), "Countess".to_string()),
                ("photo".to_string(), "http://img/ada.png".to_string()),
            ])],
        ));
        e
    }

    #[test]
    fn test_select_syncs_controls() {
        let mut e = editor(Capabilities::COMBINED);
        let style = TextStyle {
            font_size: 40,
            color: "#ff0000".to_string(),
            font_family: FontFamily::Georgia,
            bold: true,
            align: Alignment::Right,
            ..TextStyle::default()
        };
        let a = e.create_box(BoxKind::Text, "name", Some(style.clone())).unwrap();
        let b = e.create_box(BoxKind::Text, "title", Some(TextStyle::default())).unwrap();
        assert_eq!(e.controls().style, TextStyle::default());
        assert_eq!(e.controls().column.as_deref(), Some("title"));

        e.select_box(a).unwrap();
        assert_eq!(e.controls().style, style);
        assert_eq!(e.controls().column.as_deref(), Some("name"));
        assert_eq!(e.selected(), Some(a));
        assert_ne!(e.selected(), Some(b));
    }

    #[test]
    fn test_select_image_switches_tab_keeps_text_inputs() {
        let mut e = editor(Capabilities::COMBINED);
        e.create_box(BoxKind::Text, "name", None).unwrap();
        e.set_font_size(30);
        let img = e.create_box(BoxKind::Image, "photo", None).unwrap();
        e.select_box(img).unwrap();
        assert_eq!(e.controls().active_tab, BoxKind::Image);
        assert_eq!(e.controls().style.font_size, 30);
    }

    #[test]
    fn test_toggles_apply_to_selected_text_box() {
        let mut e = editor(Capabilities::COMBINED);
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        assert!(e.toggle_bold());
        assert!(e.toggle_italic());
        assert!(e.toggle_underline());
        assert!(e.toggle_strikethrough());
        let style = e.get(id).unwrap().style().unwrap();
        assert!(style.bold && style.italic && style.underline && style.strikethrough);
        assert_eq!(&e.controls().style, style);

        assert!(e.toggle_bold());
        assert!(!e.get(id).unwrap().style().unwrap().bold);
    }

    #[test]
    fn test_strikethrough_unavailable_outside_combined() {
        let mut e = editor(Capabilities::TEXT_ONLY);
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        assert!(!e.toggle_strikethrough());
        assert!(!e.get(id).unwrap().style().unwrap().strikethrough);
    }

    #[test]
    fn test_edits_ignored_without_text_selection() {
        let mut e = editor(Capabilities::COMBINED);
        assert!(!e.toggle_bold());
        assert_eq!(e.set_font_size(50), None);

        let img = e.create_box(BoxKind::Image, "photo", None).unwrap();
        assert!(!e.toggle_bold());
        assert!(!e.set_alignment(Alignment::Center));
        assert!(e.get(img).unwrap().style().is_none());
    }

    #[test]
    fn test_font_size_clamped_and_stepped() {
        let mut e = editor(Capabilities::COMBINED);
        e.create_box(BoxKind::Text, "name", None).unwrap();
        assert_eq!(e.set_font_size(3), Some(8));
        assert_eq!(e.set_font_size(1000), Some(200));
        assert_eq!(e.step_font_size(1), Some(200));
        assert_eq!(e.step_font_size(-1), Some(198));
        assert_eq!(e.set_font_size(9), Some(9));
        assert_eq!(e.step_font_size(-1), Some(8));
        assert_eq!(e.controls().style.font_size, 8);
    }

    #[test]
    fn test_color_validation() {
        let mut e = editor(Capabilities::COMBINED);
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        assert!(e.set_color("#00FF00").unwrap());
        assert_eq!(e.get(id).unwrap().style().unwrap().color, "#00ff00");
        assert!(e.set_color("green").is_err());
        assert_eq!(e.get(id).unwrap().style().unwrap().color, "#00ff00");
    }

    #[test]
    fn test_style_edit_rerenders_preview() {
        let mut e = editor(Capabilities::COMBINED);
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        e.set_font_family(FontFamily::Verdana);
        match e.get(id).unwrap().preview() {
            crate::editor::preview::BoxPreview::Text { style, content, .. } => {
                assert_eq!(style.font_family, FontFamily::Verdana);
                assert_eq!(content, "Ada");
            }
            other => panic!("unexpected preview {:?}", other),
        }
    }

    #[test]
    fn test_set_column() {
        let mut e = editor(Capabilities::COMBINED);
        let id = e.create_box(BoxKind::Text, "name", None).unwrap();
        assert!(e.set_column("title").unwrap());
        assert_eq!(e.get(id).unwrap().column(), "title");
        assert_eq!(e.get(id).unwrap().preview().label(), Some("Countess"));
        assert!(e.set_column("nope").is_err());
    }

    #[test]
    fn test_style_edit_keeps_preview_when_column_absent_from_first_record() {
        let mut e = EditorSession::new(Capabilities::TEXT_ONLY, MAX_CANVAS);
        e.load_spreadsheet(SpreadsheetData::new(
            vec!["name".to_string(), "nickname".to_string()],
            vec![Record::from([("name".to_string(), "Ada".to_string())])],
        ));
        let id = e.create_box(BoxKind::Text, "nickname", None).unwrap();
        let before = e.get(id).unwrap().preview().clone();

        assert!(e.set_font_family(FontFamily::Georgia));
        let b = e.get(id).unwrap();
        assert_eq!(b.style().unwrap().font_family, FontFamily::Georgia);
        assert_eq!(b.preview(), &before);
    }
}

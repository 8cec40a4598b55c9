//! # Submission Geometry
//!
//! The only place editor-space geometry is translated into template space.
//! Every render request is built from [`compute_submission_geometry`].
//!
//! ```text
//! scaleX = original.width  / canvas.width
//! scaleY = original.height / canvas.height
//!
//! x, width  ← preview × scaleX   (rounded to 2 dp)
//! y, height ← preview × scaleY   (rounded to 2 dp)
//! font      ← points × scaleX    (or × max(scaleX, scaleY))
//! ```
//!
//! The font size goes out as `fontSize` (2 dp) or as `size` (whole points),
//! depending on [`FontSizeField`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::editor::boxes::{Alignment, BoxKind, FontFamily, LayoutBox};
use crate::editor::capabilities::Capabilities;
use crate::error::DataMergeError;
use crate::geometry::{ScaleFactors, Size, round2};
use crate::spreadsheet::Record;

/// How text sizes follow the template scale.
///
/// The pages disagree: the combined page scales by the horizontal factor,
/// the older page by the larger of the two. Both are kept selectable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontScaling {
    #[default]
    Horizontal,
    Max,
}

impl FontScaling {
    pub fn factor(self, scale: &ScaleFactors) -> f64 {
        match self {
            FontScaling::Horizontal => scale.x,
            FontScaling::Max => scale.max(),
        }
    }
}

impl fmt::Display for FontScaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontScaling::Horizontal => f.write_str("horizontal"),
            FontScaling::Max => f.write_str("max"),
        }
    }
}

impl FromStr for FontScaling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "horizontal" | "x" => Ok(FontScaling::Horizontal),
            "max" => Ok(FontScaling::Max),
            other => Err(format!(
                "unknown font scaling '{}' (expected horizontal or max)",
                other
            )),
        }
    }
}

/// Where a text box's font size goes in a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSizeField {
    /// `fontSize`, rounded to 2 dp.
    FontSize,
    /// `size`, rounded to whole points.
    RoundedSize,
}

impl FontSizeField {
    pub fn value(self, points: f64) -> FontSizeValue {
        match self {
            FontSizeField::FontSize => FontSizeValue::Points(round2(points)),
            FontSizeField::RoundedSize => FontSizeValue::Whole(points.round().max(0.0) as u32),
        }
    }
}

/// Font size as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FontSizeValue {
    #[serde(rename = "fontSize")]
    Points(f64),
    #[serde(rename = "size")]
    Whole(u32),
}

impl FontSizeValue {
    pub fn points(self) -> f64 {
        match self {
            FontSizeValue::Points(p) => p,
            FontSizeValue::Whole(p) => p as f64,
        }
    }
}

/// Per-box configuration sent to the render service, in template space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxConfig {
    pub column: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub content: BoxContent,
}

impl BoxConfig {
    pub fn is_image(&self) -> bool {
        matches!(self.content, BoxContent::Image(_))
    }
}

/// Kind-specific part of a [`BoxConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxContent {
    Text(TextConfig),
    Image(ImageConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    #[serde(flatten)]
    pub font_size: FontSizeValue,
    pub color: String,
    pub font_family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Only sent by the combined variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    pub align: Alignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub is_image: bool,
}

/// Translate boxes from preview space into template space.
///
/// Fails only when `canvas` is empty (no template laid out yet).
pub fn compute_submission_geometry(
    boxes: &[LayoutBox],
    original: Size,
    canvas: Size,
    font_scaling: FontScaling,
    capabilities: &Capabilities,
) -> Result<Vec<BoxConfig>, DataMergeError> {
    let scale = ScaleFactors::between(original, canvas)
        .ok_or_else(|| DataMergeError::validation("Template canvas has no size"))?;
    let font_factor = font_scaling.factor(&scale);

    let configs = boxes
        .iter()
        .map(|b| {
            let rect = scale.apply(b.rect());
            let content = match (b.kind(), b.style()) {
                (BoxKind::Text, Some(style)) => BoxContent::Text(TextConfig {
                    font_size: capabilities
                        .font_field
                        .value(style.font_size as f64 * font_factor),
                    color: style.color.clone(),
                    font_family: style.font_family,
                    bold: style.bold,
                    italic: style.italic,
                    underline: style.underline,
                    strikethrough: capabilities
                        .supports_strikethrough
                        .then_some(style.strikethrough),
                    align: style.align,
                }),
                _ => BoxContent::Image(ImageConfig { is_image: true }),
            };
            BoxConfig {
                column: b.column().to_string(),
                x: rect.origin.x,
                y: rect.origin.y,
                width: rect.size.width,
                height: rect.size.height,
                content,
            }
        })
        .collect();

    Ok(configs)
}

/// JSON body of a render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Server-side template file name; absent for the text-only variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub csv_data: Vec<Record>,
    pub text_boxes: Vec<BoxConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_height: Option<f64>,
}

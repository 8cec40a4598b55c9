//! Box model: the positioned, styled annotations placed over the template.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DataMergeError;
use crate::geometry::{Point, Rect, Size};

use super::preview::BoxPreview;

/// Smallest font size the style controls accept, in points.
pub const MIN_FONT_SIZE: u32 = 8;
/// Largest font size the style controls accept, in points.
pub const MAX_FONT_SIZE: u32 = 200;
/// Increment used by the font size step buttons.
pub const FONT_SIZE_STEP: i32 = 2;

/// Stable identity of a box within an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxId(Uuid);

impl BoxId {
    pub(crate) fn new() -> Self {
        BoxId(Uuid::new_v4())
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// What a box renders: text from a column, or an image whose URL is in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxKind {
    Text,
    Image,
}

impl fmt::Display for BoxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxKind::Text => f.write_str("text"),
            BoxKind::Image => f.write_str("image"),
        }
    }
}

/// The fixed font list offered by the style controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    #[serde(rename = "Arial")]
    Arial,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    #[serde(rename = "Helvetica")]
    Helvetica,
    #[serde(rename = "Georgia")]
    Georgia,
    #[serde(rename = "Verdana")]
    Verdana,
    #[serde(rename = "Courier New")]
    CourierNew,
}

impl FontFamily {
    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Arial,
            FontFamily::TimesNewRoman,
            FontFamily::Helvetica,
            FontFamily::Georgia,
            FontFamily::Verdana,
            FontFamily::CourierNew,
        ]
    }

    /// Display name, as sent to the render service.
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::Georgia => "Georgia",
            FontFamily::Verdana => "Verdana",
            FontFamily::CourierNew => "Courier New",
        }
    }
}

impl FromStr for FontFamily {
    type Err = DataMergeError;

    /// Case and whitespace insensitive; "Times" is accepted for Times New Roman.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "arial" => Ok(FontFamily::Arial),
            "timesnewroman" | "times" => Ok(FontFamily::TimesNewRoman),
            "helvetica" => Ok(FontFamily::Helvetica),
            "georgia" => Ok(FontFamily::Georgia),
            "verdana" => Ok(FontFamily::Verdana),
            "couriernew" => Ok(FontFamily::CourierNew),
            _ => Err(DataMergeError::validation(format!("Unknown font family '{}'", s))),
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn name(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

impl FromStr for Alignment {
    type Err = DataMergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" | "centre" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            "justify" => Ok(Alignment::Justify),
            _ => Err(DataMergeError::validation(format!("Unknown alignment '{}'", s))),
        }
    }
}

/// Style attributes of a text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: FontFamily,
    /// Font size in points (preview space).
    pub font_size: u32,
    /// `#rrggbb`
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub align: Alignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Arial,
            font_size: 24,
            color: "#000000".to_string(),
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            align: Alignment::Left,
        }
    }
}

impl TextStyle {
    /// CSS `text-decoration` value for the live preview.
    pub fn text_decoration(&self) -> String {
        let mut parts = Vec::new();
        if self.underline {
            parts.push("underline");
        }
        if self.strikethrough {
            parts.push("line-through");
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Clamp a font size to the accepted range.
pub fn clamp_font_size(size: i64) -> u32 {
    size.clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u32
}

/// Validate and normalise a `#rrggbb` color (also accepts `#rgb`).
pub fn parse_color(s: &str) -> Result<String, DataMergeError> {
    let hex = s
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| DataMergeError::validation(format!("Color must start with '#': '{}'", s)))?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DataMergeError::validation(format!("Invalid color '{}'", s)));
    }
    match hex.len() {
        6 => Ok(format!("#{}", hex.to_lowercase())),
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            Ok(format!("#{}", expanded.to_lowercase()))
        }
        _ => Err(DataMergeError::validation(format!("Invalid color '{}'", s))),
    }
}

/// A box placed over the template preview.
///
/// Geometry is in preview space and only changes through the editor, which
/// keeps it inside the canvas and above the variant minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub(crate) id: BoxId,
    pub(crate) kind: BoxKind,
    pub(crate) column: String,
    pub(crate) position: Point,
    pub(crate) size: Size,
    pub(crate) style: Option<TextStyle>,
    pub(crate) preview: BoxPreview,
}

impl LayoutBox {
    pub(crate) fn new(kind: BoxKind, column: String, rect: Rect, style: Option<TextStyle>) -> Self {
        let preview = match kind {
            BoxKind::Text => BoxPreview::text_placeholder(style.clone().unwrap_or_default()),
            BoxKind::Image => BoxPreview::ImagePlaceholder,
        };
        Self {
            id: BoxId::new(),
            kind,
            column,
            position: rect.origin,
            size: rect.size,
            style,
            preview,
        }
    }

    pub fn id(&self) -> BoxId {
        self.id
    }

    pub fn kind(&self) -> BoxKind {
        self.kind
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// Text style; `None` for image boxes.
    pub fn style(&self) -> Option<&TextStyle> {
        self.style.as_ref()
    }

    /// Live preview content last rendered for this box.
    pub fn preview(&self) -> &BoxPreview {
        &self.preview
    }
}

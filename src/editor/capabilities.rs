//! # Editor Variants
//!
//! The editor comes in four flavours that differ only in which box kinds
//! they accept, their size limits, how text sizes reach the render service
//! and the routes they talk to.
//!
//! | Variant | Text box | Image box | Minimum | Strikethrough | Font size sent as |
//! |---------|----------|-----------|---------|---------------|-------------------|
//! | text-only | 150×50 | — | 50×30 | no | `size`, whole points |
//! | images-only | — | 200×200 | 100×100 | no | — |
//! | text-on-template | 150×50 | 200×200 | 100×40 | no | `size`, × max scale, rounded |
//! | combined | 150×60 | 200×200 | 100×50 | yes | `fontSize`, × scaleX, 2 dp |

use std::fmt;
use std::str::FromStr;

use crate::geometry::Size;
use crate::submission::{FontScaling, FontSizeField};

use super::boxes::BoxKind;

/// Which editor page is being driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    TextOnly,
    ImagesOnly,
    /// Text (and `@image` columns) over an uploaded template.
    TextOnTemplate,
    #[default]
    Combined,
}

impl Variant {
    pub fn all() -> &'static [Variant] {
        &[
            Variant::TextOnly,
            Variant::ImagesOnly,
            Variant::TextOnTemplate,
            Variant::Combined,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::TextOnly => "text-only",
            Variant::ImagesOnly => "images-only",
            Variant::TextOnTemplate => "text-on-template",
            Variant::Combined => "combined",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Variant::TextOnly => Capabilities::TEXT_ONLY,
            Variant::ImagesOnly => Capabilities::IMAGES_ONLY,
            Variant::TextOnTemplate => Capabilities::TEXT_ON_TEMPLATE,
            Variant::Combined => Capabilities::COMBINED,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text-only" | "text_only" | "text" => Ok(Variant::TextOnly),
            "images-only" | "images_only" | "images" | "image" => Ok(Variant::ImagesOnly),
            "text-on-template" | "text_on_template" | "template-text" => {
                Ok(Variant::TextOnTemplate)
            }
            "combined" => Ok(Variant::Combined),
            other => Err(format!(
                "unknown variant '{}' (expected text-only, images-only, text-on-template or combined)",
                other
            )),
        }
    }
}

/// Capability set and size limits for one editor variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capabilities {
    pub variant: Variant,
    pub supports_text: bool,
    pub supports_images: bool,
    /// Whether text boxes carry a strikethrough flag to the render service.
    pub supports_strikethrough: bool,
    /// Whether a template image must be uploaded before boxes can be placed.
    pub requires_template: bool,
    /// Smallest size a resize can shrink a box to.
    pub min_size: Size,
    pub text_default_size: Size,
    pub image_default_size: Size,
    /// Default font scaling into template space.
    pub font_scaling: FontScaling,
    /// Key and precision of the font size in render requests.
    pub font_field: FontSizeField,
}

impl Capabilities {
    pub const TEXT_ONLY: Self = Self {
        variant: Variant::TextOnly,
        supports_text: true,
        supports_images: false,
        supports_strikethrough: false,
        requires_template: false,
        min_size: Size::new(50.0, 30.0),
        text_default_size: Size::new(150.0, 50.0),
        image_default_size: Size::new(200.0, 200.0),
        font_scaling: FontScaling::Horizontal,
        font_field: FontSizeField::RoundedSize,
    };

    pub const IMAGES_ONLY: Self = Self {
        variant: Variant::ImagesOnly,
        supports_text: false,
        supports_images: true,
        supports_strikethrough: false,
        requires_template: true,
        min_size: Size::new(100.0, 100.0),
        text_default_size: Size::new(150.0, 60.0),
        image_default_size: Size::new(200.0, 200.0),
        font_scaling: FontScaling::Horizontal,
        font_field: FontSizeField::FontSize,
    };

    pub const TEXT_ON_TEMPLATE: Self = Self {
        variant: Variant::TextOnTemplate,
        supports_text: true,
        supports_images: true,
        supports_strikethrough: false,
        requires_template: true,
        min_size: Size::new(100.0, 40.0),
        text_default_size: Size::new(150.0, 50.0),
        image_default_size: Size::new(200.0, 200.0),
        font_scaling: FontScaling::Max,
        font_field: FontSizeField::RoundedSize,
    };

    pub const COMBINED: Self = Self {
        variant: Variant::Combined,
        supports_text: true,
        supports_images: true,
        supports_strikethrough: true,
        requires_template: true,
        min_size: Size::new(100.0, 50.0),
        text_default_size: Size::new(150.0, 60.0),
        image_default_size: Size::new(200.0, 200.0),
        font_scaling: FontScaling::Horizontal,
        font_field: FontSizeField::FontSize,
    };

    pub fn supports(&self, kind: BoxKind) -> bool {
        match kind {
            BoxKind::Text => self.supports_text,
            BoxKind::Image => self.supports_images,
        }
    }

    pub fn default_size(&self, kind: BoxKind) -> Size {
        match kind {
            BoxKind::Text => self.text_default_size,
            BoxKind::Image => self.image_default_size,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::COMBINED
    }
}

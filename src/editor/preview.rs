//! Live box content.
//!
//! Every box shows what it would look like for the **first** spreadsheet
//! record. Text boxes carry the full style; image boxes load the column's
//! value as a URL through an [`ImageProbe`] and fall back to a fixed message
//! when that fails, so a broken image is never displayed.

use std::io::Cursor;

use async_trait::async_trait;

use crate::error::DataMergeError;
use crate::geometry::Size;

use super::boxes::{BoxKind, TextStyle};

/// Shown in a text box whose value is empty or missing.
pub const TEXT_PLACEHOLDER: &str = "Text Preview";
/// Shown in an image box whose value is empty.
pub const IMAGE_PLACEHOLDER: &str = "Image Placeholder";
/// Shown in an image box whose URL failed to load.
pub const INVALID_IMAGE_MESSAGE: &str = "Invalid Image URL";

/// Rendered content of a box.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxPreview {
    /// Styled text. `placeholder` is set when the record had no value.
    Text {
        content: String,
        style: TextStyle,
        placeholder: bool,
    },
    /// Image box with no URL in the record.
    ImagePlaceholder,
    /// URL known, waiting for the probe.
    ImageLoading { url: String },
    /// URL loaded; natural pixel size of the image.
    Image { url: String, natural: Size },
    /// URL failed to load or decode.
    InvalidImage { url: String },
}

impl BoxPreview {
    pub(crate) fn text_placeholder(style: TextStyle) -> Self {
        BoxPreview::Text {
            content: TEXT_PLACEHOLDER.to_string(),
            style,
            placeholder: true,
        }
    }

    /// Build the preview for a box from the value of its column.
    pub(crate) fn render(kind: BoxKind, style: Option<&TextStyle>, value: Option<&str>) -> Self {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match kind {
            BoxKind::Text => {
                let style = style.cloned().unwrap_or_default();
                match value {
                    Some(v) => BoxPreview::Text {
                        content: v.to_string(),
                        style,
                        placeholder: false,
                    },
                    None => BoxPreview::text_placeholder(style),
                }
            }
            BoxKind::Image => match value {
                Some(url) => BoxPreview::ImageLoading {
                    url: url.to_string(),
                },
                None => BoxPreview::ImagePlaceholder,
            },
        }
    }

    /// Text displayed in the box body, if it shows text rather than an image.
    pub fn label(&self) -> Option<&str> {
        match self {
            BoxPreview::Text { content, .. } => Some(content),
            BoxPreview::ImagePlaceholder => Some(IMAGE_PLACEHOLDER),
            BoxPreview::ImageLoading { .. } => None,
            BoxPreview::Image { .. } => None,
            BoxPreview::InvalidImage { .. } => Some(INVALID_IMAGE_MESSAGE),
        }
    }

    /// URL of an image that is waiting to be loaded.
    pub fn pending_url(&self) -> Option<&str> {
        match self {
            BoxPreview::ImageLoading { url } => Some(url),
            _ => None,
        }
    }

    /// On-screen size of a loaded image inside a box of `box_size`.
    ///
    /// Recomputed from the natural size on every call so a resize rescales
    /// the image immediately.
    pub fn displayed_image_size(&self, box_size: Size) -> Option<Size> {
        match self {
            BoxPreview::Image { natural, .. } => Some(natural.contain_in(box_size)),
            _ => None,
        }
    }
}

/// Loads an image URL and reports its natural size.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<Size, DataMergeError>;
}

/// Read the pixel dimensions of encoded image bytes.
pub fn decode_dimensions(bytes: &[u8]) -> Result<Size, DataMergeError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DataMergeError::ResourceLoad(format!("Failed to read image: {}", e)))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DataMergeError::ResourceLoad(format!("Failed to decode image: {}", e)))?;
    if width == 0 || height == 0 {
        return Err(DataMergeError::ResourceLoad("Image has no pixels".to_string()));
    }
    Ok(Size::new(width as f64, height as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_render_text_value() {
        let style = TextStyle::default();
        let p = BoxPreview::render(BoxKind::Text, Some(&style), Some("Alice"));
        assert_eq!(p.label(), Some("Alice"));
    }

    #[test]
    fn test_render_text_empty_falls_back_to_placeholder() {
        let p = BoxPreview::render(BoxKind::Text, None, Some("   "));
        assert!(matches!(p, BoxPreview::Text { placeholder: true, .. }));
        assert_eq!(p.label(), Some(TEXT_PLACEHOLDER));
    }

    #[test]
    fn test_render_image_states() {
        let p = BoxPreview::render(BoxKind::Image, None, Some("http://x/a.png"));
        assert_eq!(p.pending_url(), Some("http://x/a.png"));
        assert_eq!(p.label(), None);

        let p = BoxPreview::render(BoxKind::Image, None, None);
        assert_eq!(p.label(), Some(IMAGE_PLACEHOLDER));
    }

    #[test]
    fn test_invalid_image_shows_message() {
        let p = BoxPreview::InvalidImage {
            url: "http://x/missing.png".to_string(),
        };
        assert_eq!(p.label(), Some(INVALID_IMAGE_MESSAGE));
        assert_eq!(p.displayed_image_size(Size::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_displayed_image_size_contains() {
        let p = BoxPreview::Image {
            url: "u".to_string(),
            natural: Size::new(400.0, 200.0),
        };
        assert_eq!(
            p.displayed_image_size(Size::new(200.0, 200.0)),
            Some(Size::new(200.0, 100.0))
        );
        // Small images are not blown up.
        assert_eq!(
            p.displayed_image_size(Size::new(800.0, 800.0)),
            Some(Size::new(400.0, 200.0))
        );
    }

    #[test]
    fn test_decode_dimensions() {
        let size = decode_dimensions(&png_bytes(12, 7)).unwrap();
        assert_eq!(size, Size::new(12.0, 7.0));
    }

    #[test]
    fn test_decode_dimensions_garbage() {
        let err = decode_dimensions(b"<html>not found</html>").unwrap_err();
        assert!(matches!(err, DataMergeError::ResourceLoad(_)));
    }
}

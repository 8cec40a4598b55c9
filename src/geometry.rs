//! # Geometry
//!
//! Points, sizes and scale factors for the two coordinate spaces the editor
//! works in:
//!
//! - **Preview space**: the scaled-down canvas shown on screen (at most
//!   800×600), top-left origin.
//! - **Template space**: the native pixel resolution of the uploaded
//!   template image.
//!
//! ```text
//! template = preview × (original / canvas)
//! ```

use serde::{Deserialize, Serialize};

/// Largest preview canvas the template is downscaled into.
pub const MAX_CANVAS: Size = Size {
    width: 800.0,
    height: 600.0,
};

/// A position in pixels, top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if either side is zero, negative or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Downscale to fit within `bounds`, preserving aspect ratio.
    ///
    /// Sizes already inside the bounds are returned unchanged (never upscaled).
    pub fn fit_within(self, bounds: Size) -> Size {
        if self.width > bounds.width || self.height > bounds.height {
            let ratio = (bounds.width / self.width).min(bounds.height / self.height);
            Size::new(self.width * ratio, self.height * ratio)
        } else {
            self
        }
    }

    /// Scale to fit entirely inside `bounds`, preserving aspect ratio
    /// (CSS `object-fit: contain` with `max-width/max-height: 100%`).
    pub fn contain_in(self, bounds: Size) -> Size {
        if self.is_empty() {
            return Size::default();
        }
        self.fit_within(bounds)
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `1600x1200`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width: f64 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{}'", w))?;
        let height: f64 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{}'", h))?;
        let size = Size::new(width, height);
        if size.is_empty() {
            return Err(format!("size must be positive, got '{}'", s));
        }
        Ok(size)
    }
}

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Rectangle of `size` centered in `container`, clamped inside it.
    pub fn centered_in(size: Size, container: Size) -> Rect {
        let x = container.width / 2.0 - size.width / 2.0;
        let y = container.height / 2.0 - size.height / 2.0;
        Rect::new(clamp_origin(Point::new(x, y), size, container), size)
    }
}

/// Clamp a position so a box of `size` stays fully inside `container`.
///
/// Each axis is clamped to `[0, container - size]`. A box larger than the
/// container is pinned to 0.
pub fn clamp_origin(origin: Point, size: Size, container: Size) -> Point {
    Point::new(
        clamp_axis(origin.x, container.width - size.width),
        clamp_axis(origin.y, container.height - size.height),
    )
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Conversion factors from preview space to template space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    /// `(original.width / canvas.width, original.height / canvas.height)`.
    ///
    /// Returns `None` when the canvas is empty.
    pub fn between(original: Size, canvas: Size) -> Option<ScaleFactors> {
        if canvas.is_empty() {
            return None;
        }
        Some(ScaleFactors {
            x: original.width / canvas.width,
            y: original.height / canvas.height,
        })
    }

    pub fn identity() -> Self {
        ScaleFactors { x: 1.0, y: 1.0 }
    }

    pub fn max(&self) -> f64 {
        self.x.max(self.y)
    }

    /// Map a preview-space rectangle into template space, rounded to 2 dp.
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect::new(
            Point::new(round2(rect.origin.x * self.x), round2(rect.origin.y * self.y)),
            Size::new(
                round2(rect.size.width * self.x),
                round2(rect.size.height * self.y),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_within_downscales_wide_image() {
        let fitted = Size::new(1600.0, 1200.0).fit_within(MAX_CANVAS);
        assert_eq!(fitted, Size::new(800.0, 600.0));
    }

    #[test]
    fn test_fit_within_limited_by_height() {
        let fitted = Size::new(1000.0, 1500.0).fit_within(MAX_CANVAS);
        assert_eq!(fitted, Size::new(400.0, 600.0));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        let small = Size::new(320.0, 240.0);
        assert_eq!(small.fit_within(MAX_CANVAS), small);
    }

    #[test]
    fn test_clamp_origin_inside() {
        let p = clamp_origin(Point::new(10.0, 20.0), Size::new(100.0, 50.0), MAX_CANVAS);
        assert_eq!(p, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_clamp_origin_negative_and_overflow() {
        let size = Size::new(150.0, 60.0);
        assert_eq!(
            clamp_origin(Point::new(-40.0, -1.0), size, MAX_CANVAS),
            Point::new(0.0, 0.0)
        );
        assert_eq!(
            clamp_origin(Point::new(790.0, 590.0), size, MAX_CANVAS),
            Point::new(650.0, 540.0)
        );
    }

    #[test]
    fn test_clamp_origin_box_larger_than_container() {
        let p = clamp_origin(Point::new(30.0, 30.0), Size::new(900.0, 700.0), MAX_CANVAS);
        assert_eq!(p, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_centered_in() {
        let r = Rect::centered_in(Size::new(150.0, 60.0), MAX_CANVAS);
        assert_eq!(r.origin, Point::new(325.0, 270.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.004), 0.0);
    }

    #[test]
    fn test_scale_factors_apply() {
        let s = ScaleFactors::between(Size::new(1600.0, 1200.0), MAX_CANVAS).unwrap();
        let r = s.apply(Rect::new(Point::new(100.0, 100.0), Size::new(150.0, 60.0)));
        assert_eq!(r.origin, Point::new(200.0, 200.0));
        assert_eq!(r.size, Size::new(300.0, 120.0));
    }

    #[test]
    fn test_scale_factors_empty_canvas() {
        assert!(ScaleFactors::between(Size::new(10.0, 10.0), Size::default()).is_none());
    }

    #[test]
    fn test_size_from_str() {
        assert_eq!("1600x1200".parse::<Size>().unwrap(), Size::new(1600.0, 1200.0));
        assert!("1600".parse::<Size>().is_err());
        assert!("0x10".parse::<Size>().is_err());
    }
}

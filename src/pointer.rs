//! Pointer geometry for drawing and resizing boxes.
//!
//! The host reports pointer positions in screen space together with the
//! on-screen rectangle of the displayed image. Everything is converted to the
//! image's native pixel space before any box math happens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Point, Rect};

/// Native pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

impl ImageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and positive.
    pub fn is_valid(&self) -> bool {
        is_positive(self.width) && is_positive(self.height)
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Where the image is currently displayed, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a screen position onto native image pixels.
    ///
    /// X and Y are scaled independently and the result is clamped to the
    /// image bounds. Returns `None` while the displayed image has no size,
    /// or when any input is not finite.
    pub fn to_image_point(&self, screen: Point, image: ImageSize) -> Option<Point> {
        if !is_positive(self.width) || !is_positive(self.height) || !image.is_valid() {
            return None;
        }
        if ![self.left, self.top, screen.x, screen.y]
            .iter()
            .all(|v| v.is_finite())
        {
            return None;
        }
        let scale_x = image.width / self.width;
        let scale_y = image.height / self.height;
        let x = (screen.x - self.left) * scale_x;
        let y = (screen.y - self.top) * scale_y;
        Some(Point::new(
            x.clamp(0.0, image.width),
            y.clamp(0.0, image.height),
        ))
    }
}

/// Corner handle grabbed on the active box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeHandle {
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "sw")]
    SouthWest,
    #[serde(rename = "se")]
    SouthEast,
}

impl ResizeHandle {
    /// Short compass name, as used by the host ("nw", "se", ...).
    pub fn name(&self) -> &'static str {
        match self {
            ResizeHandle::NorthWest => "nw",
            ResizeHandle::NorthEast => "ne",
            ResizeHandle::SouthWest => "sw",
            ResizeHandle::SouthEast => "se",
        }
    }

    pub fn all() -> &'static [ResizeHandle] {
        &[
            ResizeHandle::NorthWest,
            ResizeHandle::NorthEast,
            ResizeHandle::SouthWest,
            ResizeHandle::SouthEast,
        ]
    }

    fn moves_left(&self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::SouthWest)
    }

    fn moves_right(&self) -> bool {
        matches!(self, ResizeHandle::NorthEast | ResizeHandle::SouthEast)
    }

    fn moves_top(&self) -> bool {
        matches!(self, ResizeHandle::NorthWest | ResizeHandle::NorthEast)
    }

    fn moves_bottom(&self) -> bool {
        matches!(self, ResizeHandle::SouthWest | ResizeHandle::SouthEast)
    }

    /// Drag the edges this handle controls to `point`.
    ///
    /// Each moved edge stays at least `min_size` away from the opposite one,
    /// so the box never inverts.
    pub fn apply(&self, rect: Rect, point: Point, min_size: f32) -> Rect {
        let mut out = rect;
        if self.moves_left() {
            out.x1 = point.x.min(rect.x2 - min_size);
        }
        if self.moves_right() {
            out.x2 = point.x.max(rect.x1 + min_size);
        }
        if self.moves_top() {
            out.y1 = point.y.min(rect.y2 - min_size);
        }
        if self.moves_bottom() {
            out.y2 = point.y.max(rect.y1 + min_size);
        }
        out
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown handle name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resize handle '{0}', expected one of nw, ne, sw, se")]
pub struct ParseHandleError(pub String);

impl FromStr for ResizeHandle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nw" => Ok(ResizeHandle::NorthWest),
            "ne" => Ok(ResizeHandle::NorthEast),
            "sw" => Ok(ResizeHandle::SouthWest),
            "se" => Ok(ResizeHandle::SouthEast),
            _ => Err(ParseHandleError(s.to_string())),
        }
    }
}

/// A box being dragged out in draw mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawStroke {
    /// Where the pointer went down.
    pub anchor: Point,
    /// Current preview box spanning anchor and pointer.
    pub preview: Rect,
}

impl DrawStroke {
    /// Start a stroke with a zero-size preview at `anchor`.
    pub fn begin(anchor: Point) -> Self {
        Self {
            anchor,
            preview: Rect::from_corners(anchor, anchor),
        }
    }

    /// Stretch the preview to the current pointer position.
    pub fn update(&mut self, point: Point) {
        self.preview = Rect::from_corners(self.anchor, point);
    }

    /// The preview if it is larger than `min_size` in both directions.
    pub fn finish(&self, min_size: f32) -> Option<Rect> {
        (self.preview.width() > min_size && self.preview.height() > min_size)
            .then_some(self.preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_to_image_point_scales_axes_independently() {
        // 1000x500 image shown at 500x500 starting at (100, 50)
        let screen = ScreenRect::new(100.0, 50.0, 500.0, 500.0);
        let image = ImageSize::new(1000.0, 500.0);

        let p = screen
            .to_image_point(Point::new(350.0, 300.0), image)
            .expect("valid screen rect");
        assert!(approx_eq(p.x, 500.0));
        assert!(approx_eq(p.y, 250.0));
    }

    #[test]
    fn test_to_image_point_clamps() {
        let screen = ScreenRect::new(0.0, 0.0, 100.0, 100.0);
        let image = ImageSize::new(200.0, 200.0);

        let p = screen
            .to_image_point(Point::new(-20.0, 150.0), image)
            .expect("valid screen rect");
        assert_eq!(p, Point::new(0.0, 200.0));
    }

    #[test]
    fn test_to_image_point_requires_visible_image() {
        let screen = ScreenRect::new(0.0, 0.0, 0.0, 100.0);
        let image = ImageSize::new(200.0, 200.0);
        assert!(screen.to_image_point(Point::new(10.0, 10.0), image).is_none());
    }

    #[test]
    fn test_to_image_point_rejects_non_finite_input() {
        let screen = ScreenRect::new(0.0, 0.0, 100.0, 100.0);
        let image = ImageSize::new(200.0, 200.0);
        let p = Point::new(10.0, 10.0);

        assert!(screen.to_image_point(p, ImageSize::new(f32::NAN, 200.0)).is_none());
        assert!(screen.to_image_point(p, ImageSize::new(200.0, f32::INFINITY)).is_none());
        assert!(
            ScreenRect::new(f32::NAN, 0.0, 100.0, 100.0)
                .to_image_point(p, image)
                .is_none()
        );
        assert!(screen.to_image_point(Point::new(f32::NAN, 5.0), image).is_none());
    }

    #[test]
    fn test_image_size_validity() {
        assert!(ImageSize::new(640.0, 480.0).is_valid());
        assert!(!ImageSize::new(0.0, 480.0).is_valid());
        assert!(!ImageSize::new(f32::NAN, 480.0).is_valid());
        assert!(!ImageSize::new(640.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_handle_moves_only_its_edges() {
        let rect = Rect::new(10.0, 10.0, 50.0, 50.0);

        let nw = ResizeHandle::NorthWest.apply(rect, Point::new(0.0, 5.0), 5.0);
        assert_eq!(nw, Rect::new(0.0, 5.0, 50.0, 50.0));

        let ne = ResizeHandle::NorthEast.apply(rect, Point::new(80.0, 0.0), 5.0);
        assert_eq!(ne, Rect::new(10.0, 0.0, 80.0, 50.0));

        let sw = ResizeHandle::SouthWest.apply(rect, Point::new(2.0, 90.0), 5.0);
        assert_eq!(sw, Rect::new(2.0, 10.0, 50.0, 90.0));

        let se = ResizeHandle::SouthEast.apply(rect, Point::new(70.0, 60.0), 5.0);
        assert_eq!(se, Rect::new(10.0, 10.0, 70.0, 60.0));
    }

    #[test]
    fn test_handle_never_inverts_box() {
        let rect = Rect::new(10.0, 10.0, 50.0, 50.0);

        // Drag the north-west corner far past the south-east one
        let nw = ResizeHandle::NorthWest.apply(rect, Point::new(100.0, 100.0), 5.0);
        assert_eq!(nw, Rect::new(45.0, 45.0, 50.0, 50.0));
        assert!(nw.is_normalized());

        let se = ResizeHandle::SouthEast.apply(rect, Point::new(0.0, 0.0), 5.0);
        assert_eq!(se, Rect::new(10.0, 10.0, 15.0, 15.0));
        assert!(se.is_normalized());
    }

    #[test]
    fn test_handle_parsing() {
        for handle in ResizeHandle::all() {
            assert_eq!(handle.name().parse::<ResizeHandle>(), Ok(*handle));
        }
        assert_eq!("SE".parse::<ResizeHandle>(), Ok(ResizeHandle::SouthEast));
        assert!("n".parse::<ResizeHandle>().is_err());
    }

    #[test]
    fn test_draw_stroke_any_direction() {
        let mut stroke = DrawStroke::begin(Point::new(50.0, 50.0));
        assert_eq!(stroke.preview, Rect::new(50.0, 50.0, 50.0, 50.0));

        stroke.update(Point::new(20.0, 80.0));
        assert_eq!(stroke.preview, Rect::new(20.0, 50.0, 50.0, 80.0));

        stroke.update(Point::new(90.0, 10.0));
        assert_eq!(stroke.preview, Rect::new(50.0, 10.0, 90.0, 50.0));
    }

    #[test]
    fn test_draw_stroke_rejects_small_boxes() {
        let mut stroke = DrawStroke::begin(Point::new(0.0, 0.0));
        stroke.update(Point::new(5.0, 40.0));
        assert!(stroke.finish(5.0).is_none());

        stroke.update(Point::new(6.0, 6.0));
        assert_eq!(stroke.finish(5.0), Some(Rect::new(0.0, 0.0, 6.0, 6.0)));
    }
}

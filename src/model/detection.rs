//! Box geometry and per-box detection records.

use serde::{Deserialize, Serialize};

use crate::constants::MANUAL_BOX_SCORE;

/// A 2D point in native image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box stored as `[x1, y1, x2, y2]`.
///
/// Serialized as a plain four-element array, which is how the detection
/// backend sends boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a normalized box spanning two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Whether `x1 <= x2` and `y1 <= y2`.
    pub fn is_normalized(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[f32; 4]> for Rect {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<Rect> for [f32; 4] {
    fn from(rect: Rect) -> Self {
        rect.to_array()
    }
}

/// One box on an image together with its editing annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Box geometry in native pixels.
    pub rect: Rect,
    /// Backend confidence in `[0, 1]`. Always 1.0 for drawn boxes.
    pub score: f32,
    /// Geometry differs from what the backend produced (resize or merge).
    pub modified: bool,
    /// Soft-deleted. Kept for undo, skipped by conflicts and export.
    pub eliminated: bool,
    /// Drawn by the user rather than detected.
    pub is_manual: bool,
}

impl Detection {
    /// A backend detection with no edits applied.
    pub fn detected(rect: Rect, score: f32) -> Self {
        Self {
            rect,
            score,
            modified: false,
            eliminated: false,
            is_manual: false,
        }
    }

    /// A box drawn by the user.
    pub fn manual(rect: Rect) -> Self {
        Self {
            rect,
            score: MANUAL_BOX_SCORE,
            modified: false,
            eliminated: false,
            is_manual: true,
        }
    }

    /// Whether the box still takes part in conflicts, merges and export.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    /// Whether any user annotation flag is set on this box.
    pub fn has_user_edits(&self) -> bool {
        self.modified || self.eliminated || self.is_manual
    }
}

//! Data models for the box editor.

mod conflict;
mod detection;

pub use conflict::{Conflict, ConflictKind};
pub use detection::{Detection, Point, Rect};

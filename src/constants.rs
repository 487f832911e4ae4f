//! Global constants for the box editor

/// Minimum width/height (in native image pixels) for a drawn or resized box.
pub const MIN_BOX_SIZE: f32 = 5.0;

/// Intersection-over-smaller-area ratio above which two boxes are reported
/// as overlapping.
pub const OVERLAP_THRESHOLD: f32 = 0.5;

/// Score assigned to boxes drawn by the user.
pub const MANUAL_BOX_SCORE: f32 = 1.0;

/// Score assumed for backend boxes that arrive without one.
pub const MISSING_SCORE: f32 = 0.0;

//! Box area, intersection and conflict detection.
//!
//! Everything here is a pure function of its inputs so it can be re-run
//! after every edit without caching.

use crate::constants::OVERLAP_THRESHOLD;
use crate::model::{Conflict, Detection, Rect};

/// Area of a box. Degenerate boxes have zero area.
pub fn area(rect: &Rect) -> f32 {
    rect.width() * rect.height()
}

/// Area shared by two boxes, never negative.
pub fn intersection_area(a: &Rect, b: &Rect) -> f32 {
    let x_overlap = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let y_overlap = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    x_overlap * y_overlap
}

/// Whether `inner` lies within `outer`, edges included.
pub fn contains(outer: &Rect, inner: &Rect) -> bool {
    inner.x1 >= outer.x1 && inner.y1 >= outer.y1 && inner.x2 <= outer.x2 && inner.y2 <= outer.y2
}

/// Classify a single pair of boxes.
///
/// Returns `None` when the boxes do not touch, or overlap by no more than
/// `threshold` of the smaller area without one containing the other.
pub fn classify_pair(
    i: usize,
    a: &Rect,
    j: usize,
    b: &Rect,
    threshold: f32,
) -> Option<Conflict> {
    let intersection = intersection_area(a, b);
    if intersection <= 0.0 {
        return None;
    }

    if contains(a, b) || contains(b, a) {
        return Some(Conflict::containment(i, j));
    }

    let ratio = intersection / area(a).min(area(b));
    (ratio > threshold).then(|| Conflict::overlap(i, j, ratio))
}

/// Find containment and high-overlap pairs among the active detections
/// using the default threshold.
pub fn detect_conflicts(detections: &[Detection]) -> Vec<Conflict> {
    detect_conflicts_with_threshold(detections, OVERLAP_THRESHOLD)
}

/// Find containment and overlap pairs among the active detections.
///
/// Pairs are visited as `(i, j)` with `i < j`; eliminated boxes are skipped.
pub fn detect_conflicts_with_threshold(detections: &[Detection], threshold: f32) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (i, a) in detections.iter().enumerate() {
        if a.eliminated {
            continue;
        }
        for (j, b) in detections.iter().enumerate().skip(i + 1) {
            if b.eliminated {
                continue;
            }
            if let Some(conflict) = classify_pair(i, &a.rect, j, &b.rect, threshold) {
                conflicts.push(conflict);
            }
        }
    }
    conflicts
}

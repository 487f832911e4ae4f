//! Box colours by confidence.
//!
//! Hosts use these to paint box outlines so weak detections stand out.

/// Colour for drawn boxes, regardless of score.
pub const MANUAL_COLOR: [u8; 3] = [0x3b, 0x82, 0xf6];

/// Upper score bounds (exclusive) and their colours, lowest first.
const SCORE_BANDS: [(f32, [u8; 3]); 4] = [
    (0.5, [0xef, 0x44, 0x44]),  // red
    (0.7, [0xf9, 0x73, 0x16]),  // orange
    (0.85, [0xea, 0xb3, 0x08]), // yellow
    (0.95, [0x22, 0xc5, 0x5e]), // green
];

/// Colour for scores at or above the last band.
const TOP_SCORE_COLOR: [u8; 3] = [0x15, 0x80, 0x3d];

/// RGB colour for a box with the given score.
pub fn score_color(score: f32, is_manual: bool) -> [u8; 3] {
    if is_manual {
        return MANUAL_COLOR;
    }
    SCORE_BANDS
        .iter()
        .find(|(bound, _)| score < *bound)
        .map(|(_, color)| *color)
        .unwrap_or(TOP_SCORE_COLOR)
}

/// Format an RGB colour as `#rrggbb`.
pub fn to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

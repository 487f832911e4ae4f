//! Geometric conflicts between pairs of boxes.

use serde::{Deserialize, Serialize};

/// How two boxes collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// One box lies fully inside the other.
    Containment,
    /// The boxes share more than the threshold of the smaller box's area.
    Overlap,
}

impl ConflictKind {
    /// Get the display name for this conflict kind.
    pub fn name(&self) -> &'static str {
        match self {
            ConflictKind::Containment => "Containment",
            ConflictKind::Overlap => "Overlap",
        }
    }
}

/// A suggestion raised for two non-eliminated boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    /// Box indices, lower index first.
    pub indices: (usize, usize),
    /// Human readable summary (1-based box numbers).
    pub message: String,
}

impl Conflict {
    pub fn containment(i: usize, j: usize) -> Self {
        Self {
            kind: ConflictKind::Containment,
            indices: (i, j),
            message: format!("Box #{} is inside Box #{}", i + 1, j + 1),
        }
    }

    pub fn overlap(i: usize, j: usize, ratio: f32) -> Self {
        Self {
            kind: ConflictKind::Overlap,
            indices: (i, j),
            message: format!(
                "High Overlap ({:.0}%) between #{} & #{}",
                ratio * 100.0,
                i + 1,
                j + 1
            ),
        }
    }

    /// Whether this conflict involves the given box.
    pub fn involves(&self, index: usize) -> bool {
        self.indices.0 == index || self.indices.1 == index
    }
}

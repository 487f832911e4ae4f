//! Image records exchanged with the host application.
//!
//! On the wire the per-box annotations are parallel arrays. Inside the crate
//! they are folded into one [`Detection`] per box; these types convert
//! between the two shapes.

use serde::{Deserialize, Serialize};

use super::error::FormatError;
use crate::constants::MISSING_SCORE;
use crate::model::{Detection, Rect};
use crate::store::DetectionSet;

/// Detection results for one image, plus editing annotations once the image
/// has been through the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Boxes as `[x1, y1, x2, y2]`
    pub boxes: Vec<Rect>,
    /// One confidence per box
    #[serde(default)]
    pub scores: Vec<f32>,
    /// Class labels, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Number of boxes
    #[serde(default)]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eliminated: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_manual: Option<Vec<bool>>,
}

fn flag(flags: &Option<Vec<bool>>, index: usize) -> bool {
    flags
        .as_ref()
        .and_then(|f| f.get(index).copied())
        .unwrap_or(false)
}

impl Analysis {
    /// Build an analysis from fresh backend output.
    pub fn detected(boxes: Vec<Rect>, scores: Vec<f32>) -> Self {
        let count = boxes.len();
        Self {
            boxes,
            scores,
            labels: None,
            count,
            modified: Some(vec![false; count]),
            eliminated: Some(vec![false; count]),
            is_manual: Some(vec![false; count]),
        }
    }

    /// Fold the parallel arrays into one record per box.
    ///
    /// `boxes` decides the length. Missing or short annotation arrays read as
    /// `false`, missing scores as [`MISSING_SCORE`].
    pub fn to_detections(&self) -> DetectionSet {
        let detections = self
            .boxes
            .iter()
            .enumerate()
            .map(|(i, rect)| Detection {
                rect: *rect,
                score: self.scores.get(i).copied().unwrap_or(MISSING_SCORE),
                modified: flag(&self.modified, i),
                eliminated: flag(&self.eliminated, i),
                is_manual: flag(&self.is_manual, i),
            })
            .collect();
        DetectionSet::from_detections(detections)
    }

    /// Copy of this analysis with boxes and annotations taken from `set`.
    ///
    /// Labels are carried over as they are.
    pub fn with_detections(&self, set: &DetectionSet) -> Self {
        Self {
            boxes: set.iter().map(|d| d.rect).collect(),
            scores: set.iter().map(|d| d.score).collect(),
            labels: self.labels.clone(),
            count: set.len(),
            modified: Some(set.iter().map(|d| d.modified).collect()),
            eliminated: Some(set.iter().map(|d| d.eliminated).collect()),
            is_manual: Some(set.iter().map(|d| d.is_manual).collect()),
        }
    }

    /// Check coordinates and scores.
    pub fn validate(&self) -> Result<(), FormatError> {
        for (i, rect) in self.boxes.iter().enumerate() {
            let coords = rect.to_array();
            if coords.iter().any(|c| !c.is_finite()) {
                return Err(FormatError::invalid_coordinates(i, "non-finite value"));
            }
            if !rect.is_normalized() {
                return Err(FormatError::invalid_coordinates(
                    i,
                    format!("inverted box {:?}", coords),
                ));
            }
        }
        for (i, &score) in self.scores.iter().enumerate() {
            if !(0.0..=1.0).contains(&score) {
                return Err(FormatError::InvalidScore { index: i, score });
            }
        }
        Ok(())
    }
}

/// One image as the host application tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File name
    pub name: String,
    /// Unique image identifier (object or data URL)
    pub url: String,
    /// Detection results, once the image has been analysed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

impl ImageRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            analysis: None,
        }
    }

    pub fn with_analysis(mut self, analysis: Analysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Identifier used to key the original-state cache.
    pub fn image_id(&self) -> &str {
        &self.url
    }

    /// Live detections for this image, if it was analysed.
    pub fn detections(&self) -> Option<DetectionSet> {
        self.analysis.as_ref().map(Analysis::to_detections)
    }

    /// Copy of this record carrying `set` as its detections.
    pub fn with_detections(&self, set: &DetectionSet) -> Self {
        let analysis = self.analysis.clone().unwrap_or_default();
        Self {
            name: self.name.clone(),
            url: self.url.clone(),
            analysis: Some(analysis.with_detections(set)),
        }
    }

    /// Whether the user edited any box on this image.
    pub fn is_modified(&self) -> bool {
        self.analysis.as_ref().is_some_and(|a| {
            [&a.modified, &a.eliminated, &a.is_manual]
                .iter()
                .any(|flags| flags.as_ref().is_some_and(|f| f.iter().any(|&b| b)))
        })
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a record.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let record: Self = serde_json::from_str(json)?;
        if let Some(analysis) = &record.analysis {
            analysis.validate()?;
        }
        Ok(record)
    }

    /// Read a record from disk.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, FormatError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

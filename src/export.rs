//! Choosing which boxes become crops in the exported dataset.
//!
//! Packaging the crops is done by the backend; this module only decides
//! which boxes of each image are sent to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::ImageRecord;
use crate::model::Rect;
use crate::store::DetectionSet;

/// How boxes are picked per image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStrategy {
    /// Only the highest-scoring box of every image.
    #[default]
    GlobalBest,
    /// Every active box of every image.
    GlobalAll,
    /// User's boxes for edited images, the best box otherwise.
    CustomBest,
    /// User's boxes for edited images, all boxes otherwise.
    CustomAll,
}

impl SaveStrategy {
    /// Get the wire name of this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            SaveStrategy::GlobalBest => "global_best",
            SaveStrategy::GlobalAll => "global_all",
            SaveStrategy::CustomBest => "custom_best",
            SaveStrategy::CustomAll => "custom_all",
        }
    }

    pub fn all() -> &'static [SaveStrategy] {
        &[
            SaveStrategy::GlobalBest,
            SaveStrategy::GlobalAll,
            SaveStrategy::CustomBest,
            SaveStrategy::CustomAll,
        ]
    }

    /// The strategy used once a score threshold is applied.
    ///
    /// "Best" strategies widen to their "all" counterpart so the threshold
    /// has something to filter.
    pub fn widened(self) -> Self {
        match self {
            SaveStrategy::GlobalBest => SaveStrategy::GlobalAll,
            SaveStrategy::CustomBest => SaveStrategy::CustomAll,
            other => other,
        }
    }
}

impl fmt::Display for SaveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SaveStrategy {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SaveStrategy::all()
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| ExportError::UnknownStrategy(s.to_string()))
    }
}

/// Errors raised while building an export manifest.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No image had a box matching the selection criteria
    #[error("No crops match the selection criteria")]
    NothingToExport,

    /// Strategy name not recognised
    #[error("Unknown save strategy '{0}'")]
    UnknownStrategy(String),

    /// Score threshold is NaN or infinite
    #[error("Invalid score threshold {0}, expected a percentage")]
    InvalidThreshold(f32),

    /// Resize target not of the form `WIDTHxHEIGHT` with positive sides
    #[error("Invalid resize '{0}', expected WIDTHxHEIGHT")]
    InvalidResize(String),

    /// Manifest could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Index of the highest-scoring active box. The first one wins on ties.
pub fn best_index(set: &DetectionSet) -> Option<usize> {
    set.iter()
        .enumerate()
        .filter(|(_, d)| d.is_active())
        .fold(None, |best: Option<(usize, f32)>, (i, d)| match best {
            Some((_, score)) if score >= d.score => best,
            _ => Some((i, d.score)),
        })
        .map(|(i, _)| i)
}

/// Indices of the boxes `strategy` picks from `set`.
pub fn select_indices(set: &DetectionSet, strategy: SaveStrategy) -> Vec<usize> {
    let best = || best_index(set).into_iter().collect();
    match strategy {
        SaveStrategy::GlobalBest => best(),
        SaveStrategy::CustomBest if !set.has_user_edits() => best(),
        SaveStrategy::CustomBest | SaveStrategy::GlobalAll | SaveStrategy::CustomAll => {
            set.active_indices().collect()
        }
    }
}

/// Indices picked by `strategy`, optionally filtered by a score threshold.
///
/// `threshold` is a percentage in `[0, 100]`; values outside are clamped.
/// Drawn boxes always pass the threshold. A NaN threshold lets only drawn
/// boxes through; [`build_manifest`] rejects it up front.
pub fn select_with_threshold(
    set: &DetectionSet,
    strategy: SaveStrategy,
    threshold: Option<f32>,
) -> Vec<usize> {
    let Some(threshold) = threshold else {
        return select_indices(set, strategy);
    };
    let threshold = threshold.clamp(0.0, 100.0);
    select_indices(set, strategy.widened())
        .into_iter()
        .filter(|&i| {
            set.get(i)
                .is_some_and(|d| d.is_manual || d.score * 100.0 >= threshold)
        })
        .collect()
}

/// Boxes to crop from one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRequest {
    pub filename: String,
    pub boxes: Vec<Rect>,
}

/// Size every crop is scaled to by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSize {
    pub width: u32,
    pub height: u32,
}

impl CropSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for CropSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for CropSize {
    type Err = ExportError;

    /// Parse `WIDTHxHEIGHT`, e.g. `256x512`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ExportError::InvalidResize(s.to_string());
        let (width, height) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Everything the backend needs to package a folder of crops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// One directory per source image instead of a flat archive
    pub folder_organized: bool,
    /// Scale crops to this size, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<CropSize>,
    /// Boxes to crop per image
    pub metadata: Vec<CropRequest>,
}

impl ExportRequest {
    /// Form fields of the save request, in the names the backend reads.
    ///
    /// `metadata` is sent as a JSON string; the resize fields are only present
    /// when resizing is on.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, ExportError> {
        let mut fields = vec![("folder_organized", self.folder_organized.to_string())];
        if let Some(size) = self.resize {
            fields.push(("resize_w", size.width.to_string()));
            fields.push(("resize_h", size.height.to_string()));
        }
        fields.push(("metadata", serde_json::to_string(&self.metadata)?));
        Ok(fields)
    }
}

/// Build the full save request for a folder.
pub fn build_request(
    images: &[ImageRecord],
    strategy: SaveStrategy,
    threshold: Option<f32>,
    folder_organized: bool,
    resize: Option<CropSize>,
) -> Result<ExportRequest, ExportError> {
    let metadata = build_manifest(images, strategy, threshold)?;
    Ok(ExportRequest {
        folder_organized,
        resize,
        metadata,
    })
}

/// Build the crop list sent to the backend for a whole folder.
///
/// Images without analysis or without any picked box are left out.
pub fn build_manifest(
    images: &[ImageRecord],
    strategy: SaveStrategy,
    threshold: Option<f32>,
) -> Result<Vec<CropRequest>, ExportError> {
    if let Some(t) = threshold.filter(|t| !t.is_finite()) {
        return Err(ExportError::InvalidThreshold(t));
    }

    let manifest: Vec<CropRequest> = images
        .iter()
        .filter_map(|image| {
            let set = image.detections()?;
            let boxes: Vec<Rect> = select_with_threshold(&set, strategy, threshold)
                .into_iter()
                .filter_map(|i| set.get(i).map(|d| d.rect))
                .collect();
            (!boxes.is_empty()).then(|| CropRequest {
                filename: image.name.clone(),
                boxes,
            })
        })
        .collect();

    if manifest.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    log::info!(
        "Export manifest: {} images, {} crops ({}, threshold {:?})",
        manifest.len(),
        manifest.iter().map(|c| c.boxes.len()).sum::<usize>(),
        strategy,
        threshold
    );
    Ok(manifest)
}

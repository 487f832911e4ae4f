//! Folder inference responses from the detection backend.

use serde::{Deserialize, Serialize};

use super::record::{Analysis, ImageRecord};
use crate::model::Rect;

/// Number of images sent to the backend per request.
pub const BATCH_SIZE: usize = 16;

/// Prefix applied to bare base64 images returned by the backend.
const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Response to one folder-inference request. Every array is indexed by the
/// position of the image in the request.
///
/// ```json
/// { "images": ["", "<base64>"], "bounding_box": [[], [[1, 2, 3, 4]]],
///   "scores": [[], [0.9]], "bb_count": [0, 1] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Annotated images, as data URLs or bare base64 JPEG
    #[serde(default)]
    pub images: Vec<String>,
    /// Boxes per image
    #[serde(default)]
    pub bounding_box: Vec<Vec<Rect>>,
    /// Scores per image
    #[serde(default)]
    pub scores: Vec<Vec<f32>>,
    /// Box count per image, 0 for images the backend failed on
    #[serde(default)]
    pub bb_count: Vec<usize>,
}

impl BatchResponse {
    /// Attach this response to the images that were sent.
    ///
    /// Images the backend returned nothing for, or an empty string for a
    /// failed image, keep their own URL.
    pub fn into_records(self, sent: &[ImageRecord]) -> Vec<ImageRecord> {
        let BatchResponse {
            images,
            mut bounding_box,
            mut scores,
            ..
        } = self;

        sent.iter()
            .enumerate()
            .map(|(i, original)| {
                let url = match images.get(i) {
                    Some(img) if img.is_empty() => original.url.clone(),
                    Some(img) if img.starts_with("data:") => img.clone(),
                    Some(img) => format!("{}{}", JPEG_DATA_URL_PREFIX, img),
                    None => original.url.clone(),
                };
                let boxes = bounding_box.get_mut(i).map(std::mem::take).unwrap_or_default();
                let box_scores = scores.get_mut(i).map(std::mem::take).unwrap_or_default();
                ImageRecord::new(original.name.clone(), url)
                    .with_analysis(Analysis::detected(boxes, box_scores))
            })
            .collect()
    }
}

/// Split `images` into request-sized batches.
pub fn batches(images: &[ImageRecord]) -> impl Iterator<Item = &[ImageRecord]> {
    images.chunks(BATCH_SIZE)
}

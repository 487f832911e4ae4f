//! The live list of boxes for one image.
//!
//! Indices are the identity of a box for the whole editing session, so
//! nothing is ever removed: deletion only sets the `eliminated` flag.
//! Out-of-range indices are ignored rather than reported, since they can only
//! come from a stale UI.

use serde::{Deserialize, Serialize};

use crate::model::{Detection, Rect};

/// Ordered detections of a single image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionSet {
    detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from existing records.
    pub fn from_detections(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    /// Get the number of boxes, eliminated ones included.
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Check if the set holds no boxes at all.
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Get a box by index.
    pub fn get(&self, index: usize) -> Option<&Detection> {
        self.detections.get(index)
    }

    /// Get all boxes in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    pub fn as_slice(&self) -> &[Detection] {
        &self.detections
    }

    /// Number of boxes that are not eliminated.
    pub fn active_count(&self) -> usize {
        self.detections.iter().filter(|d| d.is_active()).count()
    }

    /// Indices of boxes that are not eliminated.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.detections
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_active())
            .map(|(i, _)| i)
    }

    /// Whether the box exists and is not eliminated.
    pub fn is_active(&self, index: usize) -> bool {
        self.get(index).is_some_and(Detection::is_active)
    }

    /// Whether any box was drawn, resized, merged or eliminated.
    pub fn has_user_edits(&self) -> bool {
        self.detections.iter().any(Detection::has_user_edits)
    }

    /// Append a user-drawn box and return its index.
    pub fn add_box(&mut self, rect: Rect) -> usize {
        self.detections.push(Detection::manual(rect));
        let index = self.detections.len() - 1;
        log::debug!("Added manual box #{} {:?}", index, rect.to_array());
        index
    }

    /// Replace the geometry of a live box and mark it modified.
    ///
    /// Does nothing for unknown or eliminated boxes.
    pub fn resize_box(&mut self, index: usize, rect: Rect) {
        match self.detections.get_mut(index) {
            Some(det) if det.is_active() => {
                det.rect = rect;
                det.modified = true;
            }
            _ => log::trace!("Ignoring resize of unavailable box #{}", index),
        }
    }

    /// Merge the given boxes into the first one.
    ///
    /// The first index becomes the bounding box of every selected box and is
    /// marked modified; all other selected boxes are eliminated. Unknown
    /// indices are dropped from the selection first. Returns the index of the
    /// surviving box, or `None` if fewer than two valid boxes were given.
    pub fn merge_boxes(&mut self, indices: &[usize]) -> Option<usize> {
        let valid: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.detections.len())
            .collect();
        if valid.len() < 2 {
            log::debug!("Merge needs at least two boxes, got {}", valid.len());
            return None;
        }

        let master = valid[0];
        let merged = valid[1..]
            .iter()
            .fold(self.detections[master].rect, |acc, &i| {
                acc.union(&self.detections[i].rect)
            });

        let master_det = &mut self.detections[master];
        master_det.rect = merged;
        master_det.modified = true;
        for &i in &valid[1..] {
            if i != master {
                self.detections[i].eliminated = true;
            }
        }

        log::debug!(
            "Merged {} boxes into #{} {:?}",
            valid.len(),
            master,
            merged.to_array()
        );
        Some(master)
    }

    /// Eliminate every listed box.
    pub fn batch_eliminate(&mut self, indices: &[usize]) {
        let mut count = 0;
        for &i in indices {
            if let Some(det) = self.detections.get_mut(i) {
                det.eliminated = true;
                count += 1;
            }
        }
        log::debug!("Eliminated {} boxes", count);
    }

    /// Eliminate every box in the set.
    pub fn eliminate_all(&mut self) {
        for det in &mut self.detections {
            det.eliminated = true;
        }
        log::debug!("Eliminated all {} boxes", self.detections.len());
    }

    /// Flip the eliminated flag of a box and return its new value.
    pub fn toggle_elimination(&mut self, index: usize) -> Option<bool> {
        let det = self.detections.get_mut(index)?;
        det.eliminated = !det.eliminated;
        Some(det.eliminated)
    }

    /// Copy geometry and edit flags of one box from an earlier record.
    ///
    /// Score and the manual flag are left alone.
    pub fn restore_from(&mut self, index: usize, original: &Detection) {
        if let Some(det) = self.detections.get_mut(index) {
            det.rect = original.rect;
            det.modified = original.modified;
            det.eliminated = original.eliminated;
        }
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

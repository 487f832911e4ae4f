//! Original box state per image, used to discard edits.
//!
//! The first time an image is opened its detections are copied into the
//! cache. That copy is never touched again during the session, no matter how
//! often the image is reopened or saved.

use std::collections::HashMap;
use std::sync::Arc;

use crate::store::DetectionSet;

/// Immutable original detections of one image.
pub type Snapshot = Arc<DetectionSet>;

/// Session-wide cache of originals, keyed by image identifier (its URL).
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    originals: HashMap<String, Snapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the original for `image_id`, capturing `current` on first access.
    ///
    /// An image without detections gets an empty snapshot.
    pub fn get_or_create(&mut self, image_id: &str, current: Option<&DetectionSet>) -> Snapshot {
        if let Some(snapshot) = self.originals.get(image_id) {
            return Arc::clone(snapshot);
        }
        let snapshot: Snapshot = Arc::new(current.cloned().unwrap_or_default());
        log::debug!(
            "Captured original state for '{}' ({} boxes)",
            image_id,
            snapshot.len()
        );
        self.originals
            .insert(image_id.to_string(), Arc::clone(&snapshot));
        snapshot
    }

    /// Get the original for `image_id` if it was captured.
    pub fn get(&self, image_id: &str) -> Option<Snapshot> {
        self.originals.get(image_id).cloned()
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.originals.contains_key(image_id)
    }

    /// Get the number of images with a captured original.
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Forget the original of one image.
    pub fn remove(&mut self, image_id: &str) -> Option<Snapshot> {
        self.originals.remove(image_id)
    }

    /// Forget every original. Call when the session ends.
    pub fn clear(&mut self) {
        self.originals.clear();
        log::debug!("Snapshot cache cleared");
    }
}

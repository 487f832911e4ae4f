//! Interactive box editing session for one image.
//!
//! [`ImageEditor`] is what a host drives: it forwards pointer events and
//! toolbar actions, reads back boxes, mode and suggestions for rendering, and
//! eventually saves. All handlers are synchronous. Calls that make no sense
//! in the current state (stale indices, wrong mode, image not loaded yet,
//! save in progress) are ignored.

#[cfg(test)]
mod tests;

use crate::config::EditorSettings;
use crate::format::ImageRecord;
use crate::geometry::detect_conflicts_with_threshold;
use crate::mode::{ActiveBox, EditorMode, ModeKind};
use crate::model::{Conflict, Point, Rect};
use crate::pointer::{DrawStroke, ImageSize, ResizeHandle, ScreenRect};
use crate::save::{SaveError, SaveSink};
use crate::snapshot::{Snapshot, SnapshotCache};
use crate::store::DetectionSet;

/// Editing state of the image currently open in the editor.
#[derive(Debug, Clone)]
pub struct ImageEditor {
    /// Last saved (or initially loaded) record of this image.
    record: ImageRecord,
    /// Detections as they were when the image was first opened.
    snapshot: Snapshot,
    /// Working copy being edited.
    detections: DetectionSet,
    mode: EditorMode,
    /// Native image size, unknown until the host has loaded the image.
    image_size: Option<ImageSize>,
    suggestions: Vec<Conflict>,
    /// Record handed to the save sink and not yet confirmed.
    pending_save: Option<ImageRecord>,
    settings: EditorSettings,
}

impl ImageEditor {
    /// Open an image with default settings.
    pub fn open(record: ImageRecord, cache: &mut SnapshotCache) -> Self {
        Self::with_settings(record, cache, EditorSettings::default())
    }

    /// Open an image.
    ///
    /// The first time an image identifier is seen its detections are captured
    /// in `cache` as the state that discarding returns to.
    pub fn with_settings(
        record: ImageRecord,
        cache: &mut SnapshotCache,
        settings: EditorSettings,
    ) -> Self {
        let detections = record.detections().unwrap_or_default();
        let snapshot = cache.get_or_create(record.image_id(), record.detections().as_ref());
        log::debug!(
            "Opened '{}' with {} boxes ({} in original)",
            record.name,
            detections.len(),
            snapshot.len()
        );

        let mut editor = Self {
            record,
            snapshot,
            detections,
            mode: EditorMode::default(),
            image_size: None,
            suggestions: Vec::new(),
            pending_save: None,
            settings,
        };
        editor.refresh_suggestions();
        editor
    }

    /// Replace the open image, dropping all selection and mode state.
    pub fn switch_image(&mut self, record: ImageRecord, cache: &mut SnapshotCache) {
        if self.is_locked() {
            return;
        }
        *self = Self::with_settings(record, cache, self.settings);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The record as last loaded or saved.
    pub fn record(&self) -> &ImageRecord {
        &self.record
    }

    pub fn image_id(&self) -> &str {
        self.record.image_id()
    }

    /// Live detections.
    pub fn detections(&self) -> &DetectionSet {
        &self.detections
    }

    /// Original detections this image returns to on discard.
    pub fn snapshot(&self) -> &DetectionSet {
        &self.snapshot
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.mode.active_index()
    }

    pub fn merge_selection(&self) -> &[usize] {
        self.mode.merge_selection()
    }

    /// Box being drawn, for rendering a preview.
    pub fn preview(&self) -> Option<Rect> {
        self.mode.preview()
    }

    /// Current containment and overlap suggestions.
    pub fn suggestions(&self) -> &[Conflict] {
        &self.suggestions
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Whether a save is waiting for completion.
    pub fn is_saving(&self) -> bool {
        self.pending_save.is_some()
    }

    /// Whether a resize or draw drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.mode.is_dragging()
    }

    /// Whether the live boxes differ from the last loaded or saved record.
    pub fn has_unsaved_changes(&self) -> bool {
        self.record.detections().unwrap_or_default() != self.detections
    }

    /// Whether merging the current selection is possible.
    pub fn can_merge(&self) -> bool {
        self.mode.merge_selection().len() >= 2
    }

    /// Whether deleting the current selection is possible.
    pub fn can_delete_selection(&self) -> bool {
        !self.mode.merge_selection().is_empty()
    }

    fn is_locked(&self) -> bool {
        if self.is_saving() {
            log::trace!("Ignoring input while saving");
        }
        self.is_saving()
    }

    fn refresh_suggestions(&mut self) {
        if self.mode.is_dragging() {
            return;
        }
        self.suggestions = detect_conflicts_with_threshold(
            self.detections.as_slice(),
            self.settings.overlap_threshold,
        );
    }

    // ========================================================================
    // Image loading
    // ========================================================================

    /// Record the native size of the image once the host has loaded it.
    /// Pointer handling stays disabled until then.
    pub fn set_image_size(&mut self, size: ImageSize) {
        if !size.is_valid() {
            log::warn!("Ignoring invalid image size {}x{}", size.width, size.height);
            return;
        }
        self.image_size = Some(size);
        log::debug!("Image size known: {}x{}", size.width, size.height);
    }

    fn to_image_point(&self, screen: Point, rect: ScreenRect) -> Option<Point> {
        let size = self.image_size?;
        rect.to_image_point(screen, size)
    }

    // ========================================================================
    // Modes and selection
    // ========================================================================

    /// Start collecting boxes for merging or bulk deletion.
    pub fn enter_merge_mode(&mut self) {
        if self.is_locked() {
            return;
        }
        self.mode.enter_merge(Vec::new());
        log::debug!("Entered merge mode");
    }

    /// Start drawing new boxes.
    pub fn enter_draw_mode(&mut self) {
        if self.is_locked() {
            return;
        }
        self.mode.enter_draw();
        log::debug!("Entered draw mode");
    }

    /// Leave merge or draw mode, dropping the selection and any preview.
    pub fn cancel_mode(&mut self) {
        if self.is_locked() {
            return;
        }
        if self.mode.kind() != ModeKind::Normal {
            log::debug!("Left {} mode", self.mode.kind().name());
        }
        self.mode.reset();
        self.refresh_suggestions();
    }

    /// Click on a box.
    ///
    /// In normal mode this selects the box, or deselects it if it was
    /// already active. In merge mode it adds or removes the box from the
    /// selection. Eliminated boxes and draw mode ignore clicks.
    pub fn click_box(&mut self, index: usize) {
        if self.is_locked() || !self.detections.is_active(index) {
            return;
        }
        match self.mode.kind() {
            ModeKind::Normal => self.mode.toggle_active(index),
            ModeKind::Merge => self.mode.toggle_merge_member(index),
            ModeKind::Draw => {}
        }
    }

    /// Select the boxes of a suggestion in merge mode so the user can merge
    /// or delete them.
    pub fn apply_suggestion(&mut self, conflict: &Conflict) {
        if self.is_locked() {
            return;
        }
        let (a, b) = conflict.indices;
        let selection: Vec<usize> = [a, b]
            .into_iter()
            .filter(|&i| self.detections.is_active(i))
            .collect();
        log::debug!("Applying suggestion: {}", conflict.message);
        self.mode.enter_merge(selection);
    }

    // ========================================================================
    // Box operations
    // ========================================================================

    /// Merge the selected boxes into the first one selected.
    ///
    /// Returns the surviving index. Only available in merge mode with at
    /// least two boxes selected; goes back to normal mode afterwards.
    pub fn merge_selected(&mut self) -> Option<usize> {
        if self.is_locked() || !self.can_merge() {
            return None;
        }
        let selection = self.mode.merge_selection().to_vec();
        let master = self.detections.merge_boxes(&selection);
        self.mode.reset();
        self.refresh_suggestions();
        master
    }

    /// Eliminate every selected box and go back to normal mode.
    pub fn delete_selected(&mut self) {
        if self.is_locked() || !self.can_delete_selection() {
            return;
        }
        let selection = self.mode.merge_selection().to_vec();
        self.detections.batch_eliminate(&selection);
        self.mode.reset();
        self.refresh_suggestions();
    }

    /// Eliminate every box of the image.
    ///
    /// Clears the active box and any merge selection. Only discarding all
    /// changes brings the boxes back.
    pub fn eliminate_all(&mut self) {
        if self.is_locked() {
            return;
        }
        self.detections.eliminate_all();
        match self.mode.kind() {
            ModeKind::Draw => self.mode.set_active(None),
            ModeKind::Normal | ModeKind::Merge => self.mode.reset(),
        }
        self.refresh_suggestions();
    }

    /// Eliminate a box, or bring it back if it was eliminated.
    ///
    /// A box that becomes eliminated stops being active and leaves the merge
    /// selection.
    pub fn toggle_elimination(&mut self, index: usize) {
        if self.is_locked() {
            return;
        }
        let Some(eliminated) = self.detections.toggle_elimination(index) else {
            return;
        };
        if eliminated {
            self.mode.deactivate(index);
            if self.mode.merge_selection().contains(&index) {
                self.mode.toggle_merge_member(index);
            }
        }
        log::debug!(
            "Box #{} {}",
            index,
            if eliminated { "eliminated" } else { "restored" }
        );
        self.refresh_suggestions();
    }

    // ========================================================================
    // Pointer interaction
    // ========================================================================

    /// Grab a corner handle of a box in normal mode.
    ///
    /// The box becomes active and follows the pointer until release.
    pub fn resize_start(&mut self, index: usize, handle: ResizeHandle) {
        if self.is_locked() || self.image_size.is_none() {
            return;
        }
        if !self.detections.is_active(index) {
            log::trace!("Ignoring resize of unavailable box #{}", index);
            return;
        }
        if let EditorMode::Normal { active } = &mut self.mode {
            *active = Some(ActiveBox {
                index,
                resize: Some(handle),
            });
            log::debug!("Resizing box #{} from {}", index, handle);
        }
    }

    /// Pointer pressed on the image. Starts a new box in draw mode.
    pub fn pointer_down(&mut self, screen: Point, rect: ScreenRect) {
        if self.is_locked() {
            return;
        }
        let Some(point) = self.to_image_point(screen, rect) else {
            return;
        };
        if let EditorMode::Draw { stroke, .. } = &mut self.mode {
            *stroke = Some(DrawStroke::begin(point));
        }
    }

    /// Pointer moved over the image. Updates the resize or draw in progress.
    pub fn pointer_move(&mut self, screen: Point, rect: ScreenRect) {
        if self.is_locked() {
            return;
        }
        let Some(point) = self.to_image_point(screen, rect) else {
            return;
        };
        let min_size = self.settings.min_box_size;

        match &mut self.mode {
            EditorMode::Normal {
                active:
                    Some(ActiveBox {
                        index,
                        resize: Some(handle),
                    }),
            } => {
                let Some(current) = self.detections.get(*index).map(|d| d.rect) else {
                    return;
                };
                let resized = handle.apply(current, point, min_size);
                self.detections.resize_box(*index, resized);
            }
            EditorMode::Draw {
                stroke: Some(stroke),
                ..
            } => stroke.update(point),
            _ => {}
        }
    }

    /// Pointer released. Ends a resize, or commits the drawn box if it is
    /// large enough.
    pub fn pointer_up(&mut self) {
        if self.is_locked() {
            return;
        }
        let min_size = self.settings.min_box_size;

        match &mut self.mode {
            EditorMode::Normal {
                active: Some(active),
            } if active.resize.is_some() => {
                active.resize = None;
                log::debug!("Finished resizing box #{}", active.index);
            }
            EditorMode::Draw { active, stroke } => {
                if let Some(stroke) = stroke.take() {
                    match stroke.finish(min_size) {
                        Some(rect) => *active = Some(self.detections.add_box(rect)),
                        None => log::trace!("Discarded accidental click in draw mode"),
                    }
                }
            }
            _ => {}
        }
        self.refresh_suggestions();
    }

    // ========================================================================
    // Discarding changes
    // ========================================================================

    /// Revert the active box to its original state.
    ///
    /// A box drawn after the original was captured has nothing to revert to,
    /// so it is only deselected.
    pub fn discard_active(&mut self) {
        if self.is_locked() {
            return;
        }
        let Some(index) = self.mode.active_index() else {
            return;
        };
        match self.snapshot.get(index) {
            Some(original) => {
                self.detections.restore_from(index, original);
                if original.eliminated {
                    self.mode.deactivate(index);
                }
                log::debug!("Reverted box #{}", index);
            }
            None => self.mode.set_active(None),
        }
        self.refresh_suggestions();
    }

    /// Revert every box to the original state, clear the merge selection and
    /// leave draw mode.
    pub fn discard_all(&mut self) {
        if self.is_locked() {
            return;
        }
        self.detections = DetectionSet::clone(&self.snapshot);
        match self.mode.kind() {
            ModeKind::Merge => self.mode.enter_merge(Vec::new()),
            ModeKind::Draw => self.mode.reset(),
            ModeKind::Normal => {
                // Drawn boxes are gone after reverting
                let stale = self
                    .mode
                    .active_index()
                    .is_some_and(|i| !self.detections.is_active(i));
                if stale {
                    self.mode.set_active(None);
                }
            }
        }
        log::debug!("Discarded all changes on '{}'", self.record.name);
        self.refresh_suggestions();
    }

    /// Revert the active box if there is one, otherwise everything.
    pub fn discard(&mut self) {
        if self.mode.active_index().is_some() {
            self.discard_active();
        } else {
            self.discard_all();
        }
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Start saving. Returns the record to persist and blocks every other
    /// action until [`finish_save`](Self::finish_save) is called.
    pub fn begin_save(&mut self) -> Result<ImageRecord, SaveError> {
        if self.is_saving() {
            return Err(SaveError::InProgress);
        }
        let record = self.record.with_detections(&self.detections);
        self.pending_save = Some(record.clone());
        log::debug!("Saving '{}' ({} boxes)", record.name, self.detections.len());
        Ok(record)
    }

    /// Complete a save started with [`begin_save`](Self::begin_save).
    ///
    /// On success the saved record becomes the editor's record. On failure
    /// the live boxes are left as they are so the user can retry.
    pub fn finish_save(&mut self, result: Result<(), SaveError>) -> Result<ImageRecord, SaveError> {
        let Some(record) = self.pending_save.take() else {
            log::warn!("finish_save called without a save in progress");
            return Err(SaveError::rejected("no save in progress"));
        };
        match result {
            Ok(()) => {
                log::info!("Saved '{}'", record.name);
                self.record = record.clone();
                Ok(record)
            }
            Err(e) => {
                log::warn!("Saving '{}' failed: {}", record.name, e);
                Err(e)
            }
        }
    }

    /// Save through `sink` in one step.
    pub fn save(&mut self, sink: &mut dyn SaveSink) -> Result<ImageRecord, SaveError> {
        let record = self.begin_save()?;
        let result = sink.save(&record);
        self.finish_save(result)
    }
}

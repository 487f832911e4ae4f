//! Scripted editing sessions.
//!
//! A script is a JSON list of the same events a host would forward to
//! [`ImageEditor`]. Replaying one is how the command-line driver edits an
//! analysis file without a UI.
//!
//! ```json
//! {
//!   "image_size": { "width": 1000, "height": 800 },
//!   "events": [
//!     { "action": "click", "index": 0 },
//!     { "action": "resize_start", "index": 0, "handle": "se" },
//!     { "action": "pointer_move", "x": 400, "y": 300 },
//!     { "action": "pointer_up" },
//!     { "action": "save" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::ImageEditor;
use crate::format::FormatError;
use crate::model::Point;
use crate::pointer::{ImageSize, ResizeHandle, ScreenRect};
use crate::save::{SaveError, SaveSink};

/// Errors raised while loading or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script or record is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Analysis record failed validation
    #[error("Invalid image record: {0}")]
    Format(#[from] FormatError),

    /// Image file could not be probed for its size
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Saving failed
    #[error("Save failed at step {step}: {source}")]
    Save { step: usize, source: SaveError },

    /// A suggestion was referenced that is not currently listed
    #[error("Step {step}: no suggestion #{index} ({available} available)")]
    NoSuchSuggestion {
        step: usize,
        index: usize,
        available: usize,
    },
}

/// One host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Event {
    /// The host finished loading the image
    ImageLoaded { width: f32, height: f32 },
    Click { index: usize },
    EnterMerge,
    EnterDraw,
    CancelMode,
    /// Select the pair of the `index`-th current suggestion
    ApplySuggestion { index: usize },
    MergeSelected,
    DeleteSelected,
    EliminateAll,
    ToggleElimination { index: usize },
    ResizeStart { index: usize, handle: ResizeHandle },
    /// Pointer positions are in screen pixels
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    DiscardActive,
    DiscardAll,
    Discard,
    Save,
}

/// A recorded editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Native image size, if known up front
    #[serde(default)]
    pub image_size: Option<ImageSize>,
    /// Where the image is displayed. Defaults to native size at the origin.
    #[serde(default)]
    pub screen: Option<ScreenRect>,
    pub events: Vec<Event>,
}

/// What a replay did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Number of events applied
    pub steps: usize,
    /// Number of successful saves
    pub saves: usize,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn screen_for(&self, editor: &ImageEditor) -> ScreenRect {
        self.screen.unwrap_or_else(|| {
            let size = editor.image_size().unwrap_or(ImageSize::new(0.0, 0.0));
            ScreenRect::new(0.0, 0.0, size.width, size.height)
        })
    }

    /// Apply every event to `editor`, saving through `sink`.
    ///
    /// Stops at the first failing save.
    pub fn replay(
        &self,
        editor: &mut ImageEditor,
        sink: &mut dyn SaveSink,
    ) -> Result<ReplaySummary, ScriptError> {
        if let Some(size) = self.image_size {
            editor.set_image_size(size);
        }

        let mut summary = ReplaySummary::default();
        for (step, event) in self.events.iter().enumerate() {
            log::trace!("Step {}: {:?}", step, event);
            match *event {
                Event::ImageLoaded { width, height } => {
                    editor.set_image_size(ImageSize::new(width, height));
                }
                Event::Click { index } => editor.click_box(index),
                Event::EnterMerge => editor.enter_merge_mode(),
                Event::EnterDraw => editor.enter_draw_mode(),
                Event::CancelMode => editor.cancel_mode(),
                Event::ApplySuggestion { index } => {
                    let conflict = editor.suggestions().get(index).cloned().ok_or_else(|| {
                        ScriptError::NoSuchSuggestion {
                            step,
                            index,
                            available: editor.suggestions().len(),
                        }
                    })?;
                    editor.apply_suggestion(&conflict);
                }
                Event::MergeSelected => {
                    editor.merge_selected();
                }
                Event::DeleteSelected => editor.delete_selected(),
                Event::EliminateAll => editor.eliminate_all(),
                Event::ToggleElimination { index } => editor.toggle_elimination(index),
                Event::ResizeStart { index, handle } => editor.resize_start(index, handle),
                Event::PointerDown { x, y } => {
                    let screen = self.screen_for(editor);
                    editor.pointer_down(Point::new(x, y), screen);
                }
                Event::PointerMove { x, y } => {
                    let screen = self.screen_for(editor);
                    editor.pointer_move(Point::new(x, y), screen);
                }
                Event::PointerUp => editor.pointer_up(),
                Event::DiscardActive => editor.discard_active(),
                Event::DiscardAll => editor.discard_all(),
                Event::Discard => editor.discard(),
                Event::Save => {
                    editor
                        .save(sink)
                        .map_err(|source| ScriptError::Save { step, source })?;
                    summary.saves += 1;
                }
            }
            summary.steps += 1;
        }

        log::info!(
            "Replayed {} events on '{}', {} saves",
            summary.steps,
            editor.record().name,
            summary.saves
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Analysis, ImageRecord};
    use crate::model::Rect;
    use crate::save::RecordList;
    use crate::snapshot::SnapshotCache;

    fn editor() -> ImageEditor {
        let record = ImageRecord::new("a.jpg", "blob:a").with_analysis(Analysis::detected(
            vec![
                Rect::new(0.0, 0.0, 100.0, 100.0),
                Rect::new(10.0, 10.0, 50.0, 50.0),
            ],
            vec![0.9, 0.6],
        ));
        ImageEditor::open(record, &mut SnapshotCache::new())
    }

    #[test]
    fn test_parse_events() {
        let script = Script::from_json(
            r#"{"events": [
                {"action": "resize_start", "index": 1, "handle": "nw"},
                {"action": "pointer_move", "x": 3, "y": 4},
                {"action": "save"}
            ]}"#,
        )
        .expect("parse script");
        assert_eq!(script.image_size, None);
        assert_eq!(
            script.events,
            vec![
                Event::ResizeStart {
                    index: 1,
                    handle: ResizeHandle::NorthWest
                },
                Event::PointerMove { x: 3.0, y: 4.0 },
                Event::Save,
            ]
        );
    }

    #[test]
    fn test_unknown_action_rejected() {
        let err = Script::from_json(r#"{"events": [{"action": "undo"}]}"#)
            .expect_err("unknown action");
        assert!(matches!(err, ScriptError::Json(_)));
    }

    #[test]
    fn test_replay_merge_suggestion_and_save() {
        let script = Script::from_json(
            r#"{"events": [
                {"action": "apply_suggestion", "index": 0},
                {"action": "merge_selected"},
                {"action": "save"}
            ]}"#,
        )
        .expect("parse script");
        let mut editor = editor();
        let mut list = RecordList::default();

        let summary = script.replay(&mut editor, &mut list).expect("replay");
        assert_eq!(summary, ReplaySummary { steps: 3, saves: 1 });
        let saved = list.get("a.jpg").and_then(|r| r.analysis.clone());
        assert_eq!(
            saved.and_then(|a| a.eliminated),
            Some(vec![false, true])
        );
    }

    #[test]
    fn test_replay_draw_with_default_screen() {
        let script = Script::from_json(
            r#"{"image_size": {"width": 200, "height": 200}, "events": [
                {"action": "enter_draw"},
                {"action": "pointer_down", "x": 150, "y": 150},
                {"action": "pointer_move", "x": 190, "y": 180},
                {"action": "pointer_up"}
            ]}"#,
        )
        .expect("parse script");
        let mut editor = editor();
        script
            .replay(&mut editor, &mut RecordList::default())
            .expect("replay");
        assert_eq!(
            editor.detections().get(2).map(|d| d.rect),
            Some(Rect::new(150.0, 150.0, 190.0, 180.0))
        );
    }

    #[test]
    fn test_missing_suggestion_is_an_error() {
        let script = Script::from_json(
            r#"{"events": [{"action": "apply_suggestion", "index": 3}]}"#,
        )
        .expect("parse script");
        let err = script
            .replay(&mut editor(), &mut RecordList::default())
            .expect_err("only one suggestion");
        assert!(matches!(
            err,
            ScriptError::NoSuchSuggestion {
                step: 0,
                index: 3,
                available: 1
            }
        ));
    }
}

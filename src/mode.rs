//! Editor modes and the selection each one carries.

use serde::{Deserialize, Serialize};

use crate::model::Rect;
use crate::pointer::{DrawStroke, ResizeHandle};

/// Which mode the editor is in, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    #[default]
    Normal,
    Merge,
    Draw,
}

impl ModeKind {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            ModeKind::Normal => "Normal",
            ModeKind::Merge => "Merge",
            ModeKind::Draw => "Draw",
        }
    }
}

/// The box currently selected for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveBox {
    pub index: usize,
    /// Corner being dragged, if a resize is in progress.
    pub resize: Option<ResizeHandle>,
}

impl ActiveBox {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            resize: None,
        }
    }
}

/// Editor mode with the state that only makes sense inside it.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode {
    /// Click to select a single box; drag its corners to resize.
    Normal { active: Option<ActiveBox> },
    /// Click to collect boxes for merging or bulk deletion.
    Merge { selection: Vec<usize> },
    /// Drag on the image to draw new boxes.
    Draw {
        active: Option<usize>,
        stroke: Option<DrawStroke>,
    },
}

impl Default for EditorMode {
    fn default() -> Self {
        EditorMode::Normal { active: None }
    }
}

impl EditorMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            EditorMode::Normal { .. } => ModeKind::Normal,
            EditorMode::Merge { .. } => ModeKind::Merge,
            EditorMode::Draw { .. } => ModeKind::Draw,
        }
    }

    /// Index of the active box, if any.
    pub fn active_index(&self) -> Option<usize> {
        match self {
            EditorMode::Normal { active } => active.map(|a| a.index),
            EditorMode::Draw { active, .. } => *active,
            EditorMode::Merge { .. } => None,
        }
    }

    /// Boxes collected in merge mode. Empty in other modes.
    pub fn merge_selection(&self) -> &[usize] {
        match self {
            EditorMode::Merge { selection } => selection,
            _ => &[],
        }
    }

    /// Preview of the box being drawn.
    pub fn preview(&self) -> Option<Rect> {
        match self {
            EditorMode::Draw {
                stroke: Some(stroke),
                ..
            } => Some(stroke.preview),
            _ => None,
        }
    }

    /// Corner being dragged on the active box.
    pub fn resize_handle(&self) -> Option<ResizeHandle> {
        match self {
            EditorMode::Normal {
                active: Some(ActiveBox { resize, .. }),
            } => *resize,
            _ => None,
        }
    }

    /// Whether a resize or draw drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.resize_handle().is_some() || self.preview().is_some()
    }

    /// Set or clear the active box, keeping the current mode.
    ///
    /// Has no effect in merge mode, which has no active box.
    pub fn set_active(&mut self, index: Option<usize>) {
        match self {
            EditorMode::Normal { active } => *active = index.map(ActiveBox::new),
            EditorMode::Draw { active, .. } => *active = index,
            EditorMode::Merge { .. } => {}
        }
    }

    /// Clear the active box if it is `index`.
    pub fn deactivate(&mut self, index: usize) {
        if self.active_index() == Some(index) {
            self.set_active(None);
        }
    }

    /// Switch to merge mode with the given starting selection.
    pub fn enter_merge(&mut self, selection: Vec<usize>) {
        *self = EditorMode::Merge { selection };
    }

    /// Switch to draw mode. Any merge selection is dropped.
    pub fn enter_draw(&mut self) {
        *self = EditorMode::Draw {
            active: None,
            stroke: None,
        };
    }

    /// Leave merge or draw mode, keeping nothing.
    pub fn reset(&mut self) {
        *self = EditorMode::default();
    }

    /// In normal mode, make `index` the active box or deselect it if it
    /// already is.
    pub fn toggle_active(&mut self, index: usize) {
        if let EditorMode::Normal { active } = self {
            *active = match *active {
                Some(current) if current.index == index => None,
                _ => Some(ActiveBox::new(index)),
            };
        }
    }

    /// In merge mode, add `index` to the selection or remove it.
    pub fn toggle_merge_member(&mut self, index: usize) {
        if let EditorMode::Merge { selection } = self {
            if let Some(pos) = selection.iter().position(|&i| i == index) {
                selection.remove(pos);
            } else {
                selection.push(index);
            }
        }
    }
}

//! Orchid Editor - bounding-box review for orchid detection results
//!
//! The editing core behind the review screen: boxes from the detector are
//! selected, resized, merged, drawn and soft-deleted, with containment and
//! overlap suggestions recomputed after every edit. Rendering and the
//! detection backend belong to the host.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod export;
pub mod format;
pub mod geometry;
pub mod mode;
pub mod model;
pub mod pointer;
pub mod save;
pub mod script;
pub mod snapshot;
pub mod store;

pub use config::{ConfigError, EditorConfig};
pub use editor::ImageEditor;
pub use export::{
    CropRequest, CropSize, ExportError, ExportRequest, SaveStrategy, build_manifest, build_request,
};
pub use format::{Analysis, FormatError, ImageRecord};
pub use model::{Conflict, ConflictKind, Detection, Point, Rect};
pub use pointer::{ImageSize, ResizeHandle, ScreenRect};
pub use save::{SaveError, SaveSink};
pub use snapshot::SnapshotCache;
pub use store::DetectionSet;

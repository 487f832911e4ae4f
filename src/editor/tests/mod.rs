//! Unit tests for the editing session.

mod discard_tests;

use crate::format::{Analysis, ImageRecord};
use crate::model::{Point, Rect};
use crate::pointer::{ImageSize, ScreenRect};
use crate::snapshot::SnapshotCache;

use super::ImageEditor;

/// Image shown at half its native size, at the screen origin.
pub(super) const SCREEN: ScreenRect = ScreenRect {
    left: 0.0,
    top: 0.0,
    width: 500.0,
    height: 500.0,
};

pub(super) const NATIVE: ImageSize = ImageSize {
    width: 1000.0,
    height: 1000.0,
};

/// Screen position of a native image point.
pub(super) fn at(x: f32, y: f32) -> Point {
    Point::new(x / 2.0, y / 2.0)
}

/// Three boxes: 1 lies inside 0, 2 is far away.
pub(super) fn orchid_record() -> ImageRecord {
    ImageRecord::new("orchid.jpg", "blob:orchid").with_analysis(Analysis::detected(
        vec![
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(10.0, 10.0, 50.0, 50.0),
            Rect::new(500.0, 500.0, 600.0, 600.0),
        ],
        vec![0.9, 0.4, 0.7],
    ))
}

/// Editor on [`orchid_record`] with the image size already known.
pub(super) fn open_editor() -> (ImageEditor, SnapshotCache) {
    let mut cache = SnapshotCache::new();
    let mut editor = ImageEditor::open(orchid_record(), &mut cache);
    editor.set_image_size(NATIVE);
    (editor, cache)
}

//! Tests for reverting edits against the original snapshot.

use super::{SCREEN, at, open_editor, orchid_record};
use crate::editor::ImageEditor;
use crate::mode::ModeKind;
use crate::model::Rect;
use crate::pointer::ResizeHandle;
use crate::save::RecordList;

#[test]
fn test_discard_active_reverts_one_box() {
    let (mut editor, _) = open_editor();
    editor.resize_start(0, ResizeHandle::SouthEast);
    editor.pointer_move(at(300.0, 300.0), SCREEN);
    editor.pointer_up();
    editor.resize_start(2, ResizeHandle::SouthEast);
    editor.pointer_move(at(800.0, 800.0), SCREEN);
    editor.pointer_up();

    // Box 2 is active after its resize
    editor.discard();
    let set = editor.detections();
    assert_eq!(set.get(2).map(|d| d.rect), Some(Rect::new(500.0, 500.0, 600.0, 600.0)));
    assert!(set.get(2).is_some_and(|d| !d.modified));
    assert_eq!(set.get(0).map(|d| d.rect), Some(Rect::new(0.0, 0.0, 300.0, 300.0)));
}

#[test]
fn test_discard_active_drawn_box_only_deselects() {
    let (mut editor, _) = open_editor();
    editor.enter_draw_mode();
    editor.pointer_down(at(700.0, 700.0), SCREEN);
    editor.pointer_move(at(800.0, 800.0), SCREEN);
    editor.pointer_up();
    assert_eq!(editor.active_index(), Some(3));

    editor.discard_active();
    assert_eq!(editor.active_index(), None);
    assert_eq!(editor.detections().len(), 4);
}

#[test]
fn test_discard_all_restores_snapshot() {
    let (mut editor, _) = open_editor();
    editor.eliminate_all();
    editor.enter_draw_mode();
    editor.pointer_down(at(700.0, 700.0), SCREEN);
    editor.pointer_move(at(800.0, 800.0), SCREEN);
    editor.pointer_up();
    editor.cancel_mode();

    editor.discard();
    assert_eq!(editor.detections(), editor.snapshot());
    assert_eq!(editor.detections().active_count(), 3);
    assert_eq!(editor.suggestions().len(), 1);
    assert!(!editor.has_unsaved_changes());
}

#[test]
fn test_discard_all_is_idempotent() {
    let (mut editor, _) = open_editor();
    editor.toggle_elimination(1);
    editor.discard_all();
    let once = editor.detections().clone();
    editor.discard_all();
    assert_eq!(editor.detections(), &once);
}

#[test]
fn test_discard_all_leaves_draw_mode_and_clears_merge_selection() {
    let (mut editor, _) = open_editor();
    editor.enter_draw_mode();
    editor.discard_all();
    assert_eq!(editor.mode_kind(), ModeKind::Normal);

    editor.enter_merge_mode();
    editor.click_box(0);
    editor.discard_all();
    assert_eq!(editor.mode_kind(), ModeKind::Merge);
    assert!(editor.merge_selection().is_empty());
}

#[test]
fn test_snapshot_survives_save_and_reopen() {
    let (mut editor, mut cache) = open_editor();
    editor.toggle_elimination(0);
    let mut list = RecordList::default();
    editor.save(&mut list).expect("save to list");

    // Reopen from the saved record: live state is the saved one, the
    // original is still the first one seen
    let saved = list.get("orchid.jpg").cloned().expect("saved record");
    let mut reopened = ImageEditor::open(saved, &mut cache);
    assert!(!reopened.detections().is_active(0));
    assert!(reopened.snapshot().is_active(0));

    reopened.discard();
    assert_eq!(
        reopened.detections(),
        &orchid_record().detections().expect("analysed record")
    );
}

#[test]
fn test_switch_image_resets_selection() {
    let (mut editor, mut cache) = open_editor();
    editor.enter_merge_mode();
    editor.click_box(0);

    editor.switch_image(crate::format::ImageRecord::new("other.jpg", "blob:other"), &mut cache);
    assert_eq!(editor.image_id(), "blob:other");
    assert_eq!(editor.mode_kind(), ModeKind::Normal);
    assert!(editor.detections().is_empty());
    assert_eq!(editor.image_size(), None);
    assert_eq!(cache.len(), 2);
}

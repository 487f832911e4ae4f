//! Tests for image records and the parallel-array analysis shape.

use crate::format::{Analysis, FormatError, ImageRecord};
use crate::model::{Detection, Rect};
use crate::store::DetectionSet;

const BACKEND_JSON: &str = r#"{
    "name": "orchid_01.jpg",
    "url": "blob:orchid_01",
    "analysis": {
        "boxes": [[10, 20, 110, 220], [50, 60, 70, 80]],
        "scores": [0.93, 0.41],
        "labels": ["flower", "flower"],
        "count": 2
    }
}"#;

#[test]
fn test_missing_annotations_default_to_false() {
    let record = ImageRecord::from_json(BACKEND_JSON).expect("parse backend record");
    let set = record.detections().expect("record has analysis");

    assert_eq!(set.len(), 2);
    for det in set.iter() {
        assert!(!det.modified);
        assert!(!det.eliminated);
        assert!(!det.is_manual);
    }
    assert_eq!(set.get(0).map(|d| d.score), Some(0.93));
    assert_eq!(
        set.get(1).map(|d| d.rect),
        Some(Rect::new(50.0, 60.0, 70.0, 80.0))
    );
}

#[test]
fn test_short_arrays_are_padded() {
    let analysis = Analysis {
        boxes: vec![Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(5.0, 5.0, 9.0, 9.0)],
        scores: vec![0.7],
        labels: None,
        count: 2,
        modified: Some(vec![true]),
        eliminated: None,
        is_manual: Some(vec![]),
    };
    let set = analysis.to_detections();

    assert_eq!(set.get(0).map(|d| d.modified), Some(true));
    assert_eq!(set.get(1).map(|d| d.modified), Some(false));
    assert_eq!(set.get(1).map(|d| d.score), Some(0.0));
}

#[test]
fn test_with_detections_fills_every_array() {
    let record = ImageRecord::from_json(BACKEND_JSON).expect("parse backend record");
    let mut set = record.detections().expect("record has analysis");
    set.toggle_elimination(1);
    set.add_box(Rect::new(200.0, 200.0, 260.0, 300.0));

    let saved = record.with_detections(&set);
    let analysis = saved.analysis.as_ref().expect("saved analysis");

    assert_eq!(analysis.count, 3);
    assert_eq!(analysis.boxes.len(), 3);
    assert_eq!(analysis.scores, vec![0.93, 0.41, 1.0]);
    assert_eq!(analysis.eliminated, Some(vec![false, true, false]));
    assert_eq!(analysis.is_manual, Some(vec![false, false, true]));
    assert_eq!(analysis.modified, Some(vec![false, false, false]));
    assert_eq!(
        analysis.labels,
        Some(vec!["flower".to_string(), "flower".to_string()])
    );
    assert_eq!(saved.name, record.name);
    assert_eq!(saved.url, record.url);
    assert!(saved.is_modified());
    assert!(!record.is_modified());
}

#[test]
fn test_saved_record_reads_back_identically() {
    let record = ImageRecord::from_json(BACKEND_JSON).expect("parse backend record");
    let mut set = record.detections().expect("record has analysis");
    set.resize_box(0, Rect::new(12.0, 20.0, 100.0, 200.0));
    let saved = record.with_detections(&set);

    let json = saved.to_json().expect("serialize record");
    assert!(json.contains("\"isManual\""));

    let reread = ImageRecord::from_json(&json).expect("parse saved record");
    assert_eq!(reread.detections(), Some(set));
}

#[test]
fn test_record_without_analysis() {
    let record = ImageRecord::from_json(r#"{"name": "a.jpg", "url": "blob:a"}"#)
        .expect("parse bare record");
    assert!(record.detections().is_none());
    assert!(!record.is_modified());

    let saved = record.with_detections(&DetectionSet::from_detections(vec![Detection::manual(
        Rect::new(0.0, 0.0, 10.0, 10.0),
    )]));
    assert_eq!(saved.analysis.map(|a| a.count), Some(1));
}

#[test]
fn test_inverted_box_is_rejected() {
    let json = r#"{"name": "a.jpg", "url": "blob:a",
        "analysis": {"boxes": [[10, 10, 5, 20]], "scores": [0.5], "count": 1}}"#;
    let err = ImageRecord::from_json(json).expect_err("inverted box");
    assert!(matches!(err, FormatError::InvalidCoordinates { index: 0, .. }));
}

#[test]
fn test_out_of_range_score_is_rejected() {
    let json = r#"{"name": "a.jpg", "url": "blob:a",
        "analysis": {"boxes": [[0, 0, 5, 5]], "scores": [1.5], "count": 1}}"#;
    let err = ImageRecord::from_json(json).expect_err("bad score");
    assert!(matches!(err, FormatError::InvalidScore { index: 0, .. }));
}

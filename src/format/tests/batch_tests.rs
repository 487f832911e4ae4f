//! Tests for folder inference responses.

use crate::format::{BATCH_SIZE, BatchResponse, ImageRecord, batches};
use crate::model::Rect;

fn sent(n: usize) -> Vec<ImageRecord> {
    (0..n)
        .map(|i| ImageRecord::new(format!("img_{i}.jpg"), format!("blob:{i}")))
        .collect()
}

const BACKEND_RESPONSE: &str = r#"{
    "images": ["data:image/png;base64,AAAA", "", "BBBB"],
    "bounding_box": [[[0, 0, 10, 10]], [], [[1, 2, 3, 4], [5, 6, 7, 8]]],
    "scores": [[0.9], [], [0.4, 0.6]],
    "bb_count": [1, 0, 2]
}"#;

#[test]
fn test_into_records_attaches_detections() {
    let response: BatchResponse = serde_json::from_str(BACKEND_RESPONSE).expect("parse response");
    assert_eq!(response.bb_count, vec![1, 0, 2]);

    let records = response.into_records(&sent(3));
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].name, "img_0.jpg");
    assert_eq!(records[0].url, "data:image/png;base64,AAAA");
    assert_eq!(records[2].url, "data:image/jpeg;base64,BBBB");

    let third = records[2].detections().expect("analysis");
    assert_eq!(third.len(), 2);
    assert_eq!(third.get(1).map(|d| d.rect), Some(Rect::new(5.0, 6.0, 7.0, 8.0)));
    assert_eq!(third.get(1).map(|d| d.score), Some(0.6));

    let analysis = records[2].analysis.as_ref().expect("analysis");
    assert_eq!(analysis.count, 2);
    assert_eq!(analysis.eliminated, Some(vec![false, false]));
}

#[test]
fn test_failed_image_keeps_its_url() {
    let response: BatchResponse = serde_json::from_str(BACKEND_RESPONSE).expect("parse response");
    let records = response.into_records(&sent(3));

    assert_eq!(records[1].url, "blob:1");
    let analysis = records[1].analysis.as_ref().expect("analysis");
    assert!(analysis.boxes.is_empty());
    assert_eq!(analysis.count, 0);
}

#[test]
fn test_into_records_keeps_url_when_backend_is_short() {
    let response = BatchResponse::default();
    let records = response.into_records(&sent(1));

    assert_eq!(records[0].url, "blob:0");
    let analysis = records[0].analysis.as_ref().expect("analysis");
    assert!(analysis.boxes.is_empty());
    assert_eq!(analysis.count, 0);
}

#[test]
fn test_batches_split_by_batch_size() {
    let images = sent(BATCH_SIZE * 2 + 3);
    let sizes: Vec<usize> = batches(&images).map(<[ImageRecord]>::len).collect();
    assert_eq!(sizes, vec![BATCH_SIZE, BATCH_SIZE, 3]);
}

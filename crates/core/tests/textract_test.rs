//! Tests for Textract response ingestion.

use piimask_core::textract::parse_blocks;
use piimask_core::{BlockKind, NormalizedBox, PiiCategory, PiiClassifier, PiiError};

const RESPONSE: &str = r#"{
  "DocumentMetadata": { "Pages": 1 },
  "Blocks": [
    {
      "BlockType": "PAGE",
      "Id": "page-1",
      "Geometry": { "BoundingBox": { "Width": 1.0, "Height": 1.0, "Left": 0.0, "Top": 0.0 } },
      "Relationships": [ { "Type": "CHILD", "Ids": ["line-1"] } ]
    },
    {
      "BlockType": "LINE",
      "Id": "line-1",
      "Confidence": 99.1,
      "Text": "Name: Jane Roe",
      "Geometry": { "BoundingBox": { "Width": 0.5, "Height": 0.05, "Left": 0.1, "Top": 0.1 } },
      "Relationships": [ { "Type": "CHILD", "Ids": ["word-1", "word-2", "word-3"] } ]
    },
    { "BlockType": "WORD", "Id": "word-1", "Text": "Name:", "Confidence": 99.5 },
    { "BlockType": "WORD", "Id": "word-2", "Text": "Jane", "Confidence": 98.7 },
    { "BlockType": "WORD", "Id": "word-3", "Text": "Roe", "Confidence": 98.2 },
    {
      "BlockType": "KEY_VALUE_SET",
      "Id": "key-1",
      "EntityTypes": ["KEY"],
      "Confidence": 92.0,
      "Geometry": { "BoundingBox": { "Width": 0.1, "Height": 0.05, "Left": 0.1, "Top": 0.1 } },
      "Relationships": [
        { "Type": "VALUE", "Ids": ["value-1"] },
        { "Type": "CHILD", "Ids": ["word-1"] }
      ]
    },
    {
      "BlockType": "KEY_VALUE_SET",
      "Id": "value-1",
      "EntityTypes": ["VALUE"],
      "Confidence": 91.5,
      "Geometry": {
        "BoundingBox": { "Width": 0.25, "Height": 0.05, "Left": 0.25, "Top": 0.1 },
        "Polygon": [ { "X": 0.25, "Y": 0.1 } ]
      },
      "Relationships": [ { "Type": "CHILD", "Ids": ["word-2", "word-3"] } ]
    },
    { "BlockType": "SELECTION_ELEMENT", "Id": "sel-1", "SelectionStatus": "SELECTED" }
  ]
}"#;

#[test]
fn test_parse_response_keeps_relevant_blocks() {
    let graph = parse_blocks(RESPONSE).unwrap();
    assert_eq!(graph.len(), 6);
    assert!(graph.get("page-1").is_none());
    assert!(graph.get("sel-1").is_none());
    assert_eq!(graph.get("key-1").unwrap().kind, BlockKind::KeyValueKey);
    assert_eq!(graph.get("value-1").unwrap().kind, BlockKind::KeyValueValue);

    let value = graph.get("value-1").unwrap();
    assert_eq!(
        value.geometry,
        Some(NormalizedBox::new(0.25, 0.1, 0.25, 0.05))
    );
    assert_eq!(graph.resolve_text(value), "Jane Roe");
    assert_eq!(graph.get("word-1").unwrap().geometry, None);
}

#[test]
fn test_parsed_response_classifies() {
    let graph = parse_blocks(RESPONSE).unwrap();
    let fields = PiiClassifier::default().detect(&graph, &[]);

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].category, PiiCategory::Name);
    assert_eq!(fields[0].value, "Jane Roe");
    assert_eq!(fields[0].confidence, 91.5);
}

#[test]
fn test_bare_block_array() {
    let json = r#"[
      { "BlockType": "LINE", "Id": "l1", "Text": "9876543210", "Confidence": 97.0 },
      { "BlockType": "TABLE", "Id": "t1" }
    ]"#;
    let graph = parse_blocks(json).unwrap();
    assert_eq!(graph.len(), 1);
    assert_eq!(graph.primary_lines()[0].text, "9876543210");
}

#[test]
fn test_partial_bounding_box_means_no_geometry() {
    let json = r#"[
      {
        "BlockType": "LINE",
        "Id": "l1",
        "Text": "x",
        "Geometry": { "BoundingBox": { "Width": 0.5, "Left": 0.1, "Top": 0.1 } }
      }
    ]"#;
    let graph = parse_blocks(json).unwrap();
    assert_eq!(graph.get("l1").unwrap().geometry, None);
}

#[test]
fn test_malformed_json_is_an_error() {
    let err = parse_blocks(r#"{ "Blocks": [ { "Id": "x" } ] }"#).unwrap_err();
    assert!(matches!(err, PiiError::Json(_)));
    assert!(matches!(parse_blocks("not json"), Err(PiiError::Json(_))));
}

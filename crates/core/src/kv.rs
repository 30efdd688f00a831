//! Key/value pair extraction from the block graph.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

use crate::blocks::{BlockGraph, BlockKind, RelationKind};
use crate::geometry::NormalizedBox;

/// Resolved value side of a form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRecord {
    pub text: String,
    pub geometry: Option<NormalizedBox>,
    pub confidence: f64,
}

/// Key text to value, in first-insertion order.
pub type KeyValueMap = IndexMap<String, ValueRecord>;

/// Build the key to value mapping for one document.
///
/// Key text is lowercased. When two keys resolve to the same text the
/// later value wins but the entry keeps its original position. Links to
/// unknown value ids are skipped.
pub fn extract(graph: &BlockGraph) -> KeyValueMap {
    let mut keys: FxHashMap<&str, String> = FxHashMap::default();
    let mut values: FxHashMap<&str, ValueRecord> = FxHashMap::default();

    for block in graph.blocks() {
        match block.kind {
            BlockKind::KeyValueKey => {
                keys.insert(&block.id, graph.resolve_text(block).to_lowercase());
            }
            BlockKind::KeyValueValue => {
                values.insert(
                    &block.id,
                    ValueRecord {
                        text: graph.resolve_text(block),
                        geometry: block.geometry,
                        confidence: block.confidence,
                    },
                );
            }
            BlockKind::Word | BlockKind::Line => {}
        }
    }

    let mut pairs = KeyValueMap::new();
    for block in graph.iter_kind(BlockKind::KeyValueKey) {
        let key_text = keys.get(block.id.as_str()).cloned().unwrap_or_default();
        for value_id in block.related_ids(RelationKind::ValueLink) {
            match values.get(value_id) {
                Some(value) => {
                    debug!(key = %key_text, value = %value.text, "paired key with value");
                    pairs.insert(key_text.clone(), value.clone());
                }
                None => debug!(key = %key_text, value_id, "dangling value link"),
            }
        }
    }
    pairs
}

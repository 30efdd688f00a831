//! Ingestion of AWS Textract `AnalyzeDocument` (FORMS) output.
//!
//! Only the parts of the response the classifier needs are read. Block
//! types other than key/value sets, words and lines are dropped, as are
//! relationship types other than `CHILD` and `VALUE`.

use serde::Deserialize;
use tracing::debug;

use crate::blocks::{Block, BlockGraph, BlockKind, Relation, RelationKind};
use crate::error::Result;
use crate::geometry::NormalizedBox;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Response {
        #[serde(rename = "Blocks")]
        blocks: Vec<RawBlock>,
    },
    Blocks(Vec<RawBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBlock {
    block_type: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    entity_types: Vec<String>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawGeometry {
    #[serde(default)]
    bounding_box: Option<RawBoundingBox>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBoundingBox {
    left: Option<f64>,
    top: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRelationship {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(default)]
    ids: Vec<String>,
}

impl RawBoundingBox {
    /// A box with any side missing counts as no geometry at all.
    fn normalized(&self) -> Option<NormalizedBox> {
        Some(NormalizedBox::new(
            self.left?,
            self.top?,
            self.width?,
            self.height?,
        ))
    }
}

impl RawBlock {
    fn kind(&self) -> Option<BlockKind> {
        match self.block_type.as_str() {
            "WORD" => Some(BlockKind::Word),
            "LINE" => Some(BlockKind::Line),
            "KEY_VALUE_SET" => {
                if self.entity_types.iter().any(|e| e == "KEY") {
                    Some(BlockKind::KeyValueKey)
                } else if self.entity_types.iter().any(|e| e == "VALUE") {
                    Some(BlockKind::KeyValueValue)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn into_block(self) -> Option<Block> {
        let Some(kind) = self.kind() else {
            debug!(block_type = %self.block_type, id = %self.id, "dropping block");
            return None;
        };
        let geometry = self
            .geometry
            .as_ref()
            .and_then(|g| g.bounding_box.as_ref())
            .and_then(RawBoundingBox::normalized);
        let relations = self
            .relationships
            .into_iter()
            .filter_map(|r| {
                let kind = match r.kind.as_str() {
                    "CHILD" => RelationKind::Child,
                    "VALUE" => RelationKind::ValueLink,
                    _ => return None,
                };
                Some(Relation::new(kind, r.ids))
            })
            .collect();
        Some(Block {
            id: self.id,
            kind,
            text: self.text.unwrap_or_default(),
            geometry,
            confidence: self.confidence.unwrap_or(0.0),
            relations,
        })
    }
}

/// Parse a Textract response (or its bare `Blocks` array) into a graph.
///
/// # Errors
///
/// Returns `PiiError::Json` if the input is not valid JSON of either
/// shape.
pub fn parse_blocks(json: &str) -> Result<BlockGraph> {
    let raw = match serde_json::from_str::<Document>(json)? {
        Document::Response { blocks } | Document::Blocks(blocks) => blocks,
    };
    let total = raw.len();
    let graph: BlockGraph = raw.into_iter().filter_map(RawBlock::into_block).collect();
    debug!(total, kept = graph.len(), "parsed Textract blocks");
    Ok(graph)
}

/// Read and parse a Textract response file.
pub fn read_blocks(path: impl AsRef<std::path::Path>) -> Result<BlockGraph> {
    let json = std::fs::read_to_string(path)?;
    parse_blocks(&json)
}

//! Text block graph produced by the primary (structured) OCR engine.
//!
//! Blocks are kept in engine emission order and indexed by id. Relations
//! point at other blocks by id; a relation whose target is missing is
//! tolerated everywhere and simply contributes nothing.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::geometry::NormalizedBox;
use crate::lines::{LineObservation, LineSource};

/// Node type in the block graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    KeyValueKey,
    KeyValueValue,
    Word,
    Line,
}

/// Edge type between blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Container to contained (key/value/line to its words).
    Child,
    /// Key to the value it labels.
    ValueLink,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub kind: RelationKind,
    pub ids: SmallVec<[String; 4]>,
}

impl Relation {
    pub fn new<I, S>(kind: RelationKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn child<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RelationKind::Child, ids)
    }

    pub fn value_link<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RelationKind::ValueLink, ids)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub text: String,
    pub geometry: Option<NormalizedBox>,
    pub confidence: f64,
    pub relations: Vec<Relation>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            text: String::new(),
            geometry: None,
            confidence: 0.0,
            relations: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_geometry(mut self, geometry: NormalizedBox) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Ids targeted by relations of `kind`, in relation-list order.
    pub fn related_ids(&self, kind: RelationKind) -> impl Iterator<Item = &str> {
        self.relations
            .iter()
            .filter(move |r| r.kind == kind)
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }
}

/// All blocks of one document, in emission order.
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    blocks: Vec<Block>,
    index: FxHashMap<String, usize>,
}

impl BlockGraph {
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(blocks.len());
        for (i, block) in blocks.iter().enumerate() {
            // First occurrence keeps the slot.
            index.entry(block.id.clone()).or_insert(i);
        }
        Self { blocks, index }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.index.get(id).map(|&i| &self.blocks[i])
    }

    pub fn iter_kind(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    /// Text of `block` assembled from its `WORD` children.
    ///
    /// Words are joined with single spaces in relation order; children
    /// that are missing or not words are ignored.
    pub fn resolve_text(&self, block: &Block) -> String {
        let words: Vec<&str> = block
            .related_ids(RelationKind::Child)
            .filter_map(|id| self.get(id))
            .filter(|child| child.kind == BlockKind::Word)
            .map(|child| child.text.as_str())
            .collect();
        words.join(" ").trim().to_string()
    }

    /// The engine's own `LINE` blocks as line observations.
    pub fn primary_lines(&self) -> Vec<LineObservation> {
        self.iter_kind(BlockKind::Line)
            .map(|b| LineObservation {
                text: b.text.clone(),
                geometry: b.geometry,
                confidence: b.confidence,
                source: LineSource::Primary,
            })
            .collect()
    }
}

impl FromIterator<Block> for BlockGraph {
    fn from_iter<T: IntoIterator<Item = Block>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

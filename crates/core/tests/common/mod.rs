//! Block graph builders shared by the integration tests.

#![allow(dead_code)]

use piimask_core::{Block, BlockGraph, BlockKind, NormalizedBox, Relation};

pub fn bbox(left: f64, top: f64, width: f64, height: f64) -> NormalizedBox {
    NormalizedBox::new(left, top, width, height)
}

/// Builds a Textract-shaped graph with sequential block ids.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    blocks: Vec<Block>,
    next_id: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn words(&mut self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|w| {
                let id = self.id("word");
                self.blocks
                    .push(Block::new(id.clone(), BlockKind::Word).with_text(w));
                id
            })
            .collect()
    }

    /// Add a form field whose value block carries `geometry`.
    pub fn pair(mut self, key: &str, value: &str, geometry: NormalizedBox) -> Self {
        let key_words = self.words(key);
        let value_words = self.words(value);
        let value_id = self.id("value");
        let key_id = self.id("key");
        self.blocks.push(
            Block::new(key_id, BlockKind::KeyValueKey)
                .with_confidence(95.0)
                .with_relation(Relation::child(key_words))
                .with_relation(Relation::value_link([value_id.clone()])),
        );
        self.blocks.push(
            Block::new(value_id, BlockKind::KeyValueValue)
                .with_geometry(geometry)
                .with_confidence(90.0)
                .with_relation(Relation::child(value_words)),
        );
        self
    }

    pub fn line(mut self, text: &str, geometry: NormalizedBox) -> Self {
        let id = self.id("line");
        self.blocks.push(
            Block::new(id, BlockKind::Line)
                .with_text(text)
                .with_geometry(geometry)
                .with_confidence(99.0),
        );
        self
    }

    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn build(self) -> BlockGraph {
        BlockGraph::new(self.blocks)
    }
}

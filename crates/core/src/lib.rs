//! piimask - PII detection and masking for OCR'd document images.
//!
//! A structured OCR engine yields a block graph of form keys, values,
//! words and lines; secondary engines yield plain lines for scripts the
//! first one cannot read. [`PiiClassifier`] turns both into typed,
//! located [`PiiField`]s and [`mask::mask_fields`] blacks them out.

pub mod blocks;
pub mod category;
pub mod classifier;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod high_level;
pub mod kv;
pub mod language;
pub mod lines;
pub mod mask;
pub mod tesseract;
pub mod textract;

pub use blocks::{Block, BlockGraph, BlockKind, Relation, RelationKind};
pub use category::PiiCategory;
pub use classifier::PiiClassifier;
pub use config::{DetectorConfig, RuleSet};
pub use error::{PiiError, Result};
pub use field::{DetectionSource, PiiField};
pub use geometry::{NormalizedBox, PixelRect, RectifyError, rectify};
pub use language::{Language, LanguageDetector, ScriptDetector};
pub use lines::{LineObservation, LineSource};
pub use mask::MaskMode;

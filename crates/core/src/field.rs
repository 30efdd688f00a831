//! Classifier output.

use serde::{Deserialize, Serialize};

use crate::category::PiiCategory;
use crate::geometry::NormalizedBox;

/// Which detection pass produced a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    KeyAlias,
    KeyValueRegex,
    PrimaryLine,
    SecondaryLine,
}

/// One detected piece of PII and where it sits on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiField {
    pub category: PiiCategory,
    pub value: String,
    pub geometry: Option<NormalizedBox>,
    pub confidence: f64,
    pub source: DetectionSource,
}

//! Unstructured line observations.

use serde::{Deserialize, Serialize};

use crate::geometry::NormalizedBox;

/// Which engine produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    Primary,
    Secondary,
}

/// One line of recognized text with its own geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineObservation {
    pub text: String,
    pub geometry: Option<NormalizedBox>,
    pub confidence: f64,
    pub source: LineSource,
}

impl LineObservation {
    pub fn secondary(text: impl Into<String>, geometry: Option<NormalizedBox>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            geometry,
            confidence,
            source: LineSource::Secondary,
        }
    }
}

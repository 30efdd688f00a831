//! High-level entry points.
//!
//! These tie ingestion, classification and masking together for callers
//! that hold an encoded image and the OCR output for it.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};
use rayon::prelude::*;
use tracing::debug;

use crate::blocks::BlockGraph;
use crate::classifier::PiiClassifier;
use crate::error::Result;
use crate::field::PiiField;
use crate::language::LanguageDetector;
use crate::lines::LineObservation;
use crate::mask::{MaskMode, MaskReport, mask_fields};

/// Result of redacting one image.
#[derive(Debug, Clone)]
pub struct Redaction {
    /// PNG encoded masked image.
    pub png: Vec<u8>,
    pub fields: Vec<PiiField>,
    pub report: MaskReport,
}

/// OCR output for one document.
#[derive(Debug, Clone, Default)]
pub struct OcrDocument {
    pub blocks: BlockGraph,
    pub secondary_lines: Vec<LineObservation>,
}

/// Decode an image, detect PII in its OCR output, mask it and re-encode
/// as PNG.
///
/// # Errors
///
/// Returns `PiiError::Image` if the bytes cannot be decoded or the result
/// cannot be encoded.
pub fn redact_image<D: LanguageDetector>(
    image_bytes: &[u8],
    document: &OcrDocument,
    classifier: &PiiClassifier<'_, D>,
    mode: MaskMode,
) -> Result<Redaction> {
    let mut image = image::load_from_memory(image_bytes)?.to_rgba8();
    debug!(
        width = image.width(),
        height = image.height(),
        "decoded input image"
    );

    let fields = classifier.detect(&document.blocks, &document.secondary_lines);
    let report = mask_fields(&mut image, &fields, mode);

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(Redaction {
        png,
        fields,
        report,
    })
}

/// Pixel size of an encoded image, read from its header only.
pub fn image_dimensions(image_bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(image_bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Classify many documents in parallel.
///
/// Results come back in input order. Each document gets its own dedup
/// state; only the configuration is shared.
pub fn classify_batch<D: LanguageDetector>(
    classifier: &PiiClassifier<'_, D>,
    documents: &[OcrDocument],
) -> Vec<Vec<PiiField>> {
    documents
        .par_iter()
        .map(|doc| classifier.detect(&doc.blocks, &doc.secondary_lines))
        .collect()
}

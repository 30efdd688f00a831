//! Tests for the decode, detect, mask, encode pipeline.

mod common;

use std::io::Cursor;

use common::{GraphBuilder, bbox};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use piimask_core::high_level::{OcrDocument, classify_batch, image_dimensions, redact_image};
use piimask_core::{LineObservation, MaskMode, PiiCategory, PiiClassifier, PiiError};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn white_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, WHITE);
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    png
}

#[test]
fn test_redact_masks_detected_field() {
    let png = white_png(40, 20);
    let document = OcrDocument {
        blocks: GraphBuilder::new()
            .pair("Name", "John Doe", bbox(0.25, 0.25, 0.5, 0.5))
            .build(),
        secondary_lines: Vec::new(),
    };

    let classifier = PiiClassifier::default();
    let redaction = redact_image(&png, &document, &classifier, MaskMode::Rectangle).unwrap();
    assert_eq!(redaction.fields.len(), 1);
    assert_eq!(redaction.report.masked_count(), 1);

    let output = image::load_from_memory(&redaction.png).unwrap().to_rgba8();
    assert_eq!(output.dimensions(), (40, 20));
    assert_eq!(*output.get_pixel(10, 5), BLACK);
    assert_eq!(*output.get_pixel(29, 14), BLACK);
    assert_eq!(*output.get_pixel(9, 5), WHITE);
    assert_eq!(*output.get_pixel(30, 14), WHITE);
    assert_eq!(*output.get_pixel(10, 15), WHITE);
}

#[test]
fn test_redact_without_pii_returns_same_pixels() {
    let png = white_png(16, 16);
    let document = OcrDocument::default();

    let redaction =
        redact_image(&png, &document, &PiiClassifier::default(), MaskMode::Blur).unwrap();
    assert!(redaction.fields.is_empty());
    let output = image::load_from_memory(&redaction.png).unwrap().to_rgba8();
    assert!(output.pixels().all(|p| *p == WHITE));
}

#[test]
fn test_field_outside_image_is_reported_not_fatal() {
    let png = white_png(10, 10);
    let document = OcrDocument {
        blocks: GraphBuilder::new()
            .line("9876543210", bbox(0.5, 0.5, 0.6, 0.1))
            .build(),
        secondary_lines: vec![LineObservation::secondary("jane@example.com", None, 80.0)],
    };

    let redaction = redact_image(
        &png,
        &document,
        &PiiClassifier::default(),
        MaskMode::Rectangle,
    )
    .unwrap();
    assert_eq!(redaction.fields.len(), 2);
    assert_eq!(redaction.report.masked_count(), 0);
    assert_eq!(redaction.report.skipped.len(), 2);
}

#[test]
fn test_undecodable_image_is_an_error() {
    let result = redact_image(
        b"definitely not an image",
        &OcrDocument::default(),
        &PiiClassifier::default(),
        MaskMode::Rectangle,
    );
    assert!(matches!(result, Err(PiiError::Image(_))));
}

#[test]
fn test_image_dimensions_reads_header() {
    assert_eq!(image_dimensions(&white_png(37, 11)).unwrap(), (37, 11));
}

#[test]
fn test_classify_batch_preserves_order() {
    let documents = vec![
        OcrDocument {
            blocks: GraphBuilder::new()
                .line("9876543210", bbox(0.1, 0.1, 0.2, 0.05))
                .build(),
            secondary_lines: Vec::new(),
        },
        OcrDocument::default(),
        OcrDocument {
            blocks: GraphBuilder::new()
                .pair("Email", "jane@example.com", bbox(0.1, 0.1, 0.2, 0.05))
                .build(),
            secondary_lines: Vec::new(),
        },
    ];

    let results = classify_batch(&PiiClassifier::default(), &documents);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0][0].category, PiiCategory::PhoneNumber);
    assert!(results[1].is_empty());
    assert_eq!(results[2][0].category, PiiCategory::EmailAddress);

    // Dedup state is per document.
    let repeated = vec![documents[0].clone(), documents[0].clone()];
    let results = classify_batch(&PiiClassifier::default(), &repeated);
    assert_eq!(results[0].len(), 1);
    assert_eq!(results[1].len(), 1);
}

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use piimask_core::high_level::{OcrDocument, classify_batch};
use piimask_core::mask::{MaskMode, mask_fields};
use piimask_core::{
    Block, BlockGraph, BlockKind, LineObservation, NormalizedBox, PiiClassifier, Relation,
};

const FORM: &[(&str, &str)] = &[
    ("Full Name", "John Doe"),
    ("DOB", "01/02/1990"),
    ("Gender", "Male"),
    ("Mobile No:", "9876543210"),
    ("Email", "john.doe@example.com"),
    ("Address", "12 Main Street Chennai"),
    ("Remarks", "none"),
];

const LINES: &[&str] = &[
    "GOVERNMENT OF INDIA",
    "John Doe",
    "1234 5678 9012",
    "scanned copy",
    "Male",
];

/// A synthetic card with `copies` repetitions of the form and line set.
fn document(copies: usize) -> OcrDocument {
    let mut blocks = Vec::new();
    let mut next = 0usize;
    let mut id = |prefix: &str| {
        next += 1;
        format!("{prefix}{next}")
    };
    for copy in 0..copies {
        let top = (copy % 20) as f64 * 0.04;
        for (key, value) in FORM {
            let key_word = id("w");
            blocks.push(Block::new(key_word.clone(), BlockKind::Word).with_text(*key));
            let mut value_words = Vec::new();
            for w in value.split_whitespace() {
                let word = id("w");
                blocks.push(Block::new(word.clone(), BlockKind::Word).with_text(w));
                value_words.push(word);
            }
            let value_id = id("v");
            blocks.push(
                Block::new(id("k"), BlockKind::KeyValueKey)
                    .with_relation(Relation::child([key_word]))
                    .with_relation(Relation::value_link([value_id.clone()])),
            );
            blocks.push(
                Block::new(value_id, BlockKind::KeyValueValue)
                    .with_geometry(NormalizedBox::new(0.3, top, 0.3, 0.03))
                    .with_relation(Relation::child(value_words)),
            );
        }
        for line in LINES {
            blocks.push(
                Block::new(id("l"), BlockKind::Line)
                    .with_text(format!("{line} {copy}"))
                    .with_geometry(NormalizedBox::new(0.1, top, 0.5, 0.03)),
            );
        }
    }
    OcrDocument {
        blocks: BlockGraph::new(blocks),
        secondary_lines: vec![
            LineObservation::secondary("राम कुमार", None, 80.0),
            LineObservation::secondary("ஆண்", None, 75.0),
        ],
    }
}

fn bench_detect(c: &mut Criterion) {
    let classifier = PiiClassifier::default();
    let mut group = c.benchmark_group("detect");
    for copies in [1usize, 10, 100] {
        let doc = document(copies);
        group.throughput(Throughput::Elements(doc.blocks.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(copies), &doc, |b, doc| {
            b.iter(|| classifier.detect(black_box(&doc.blocks), black_box(&doc.secondary_lines)))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let classifier = PiiClassifier::default();
    let docs: Vec<OcrDocument> = (0..64).map(|_| document(1)).collect();
    c.bench_function("classify_batch_64", |b| {
        b.iter(|| classify_batch(&classifier, black_box(&docs)))
    });
}

fn bench_mask(c: &mut Criterion) {
    let classifier = PiiClassifier::default();
    let doc = document(1);
    let fields = classifier.detect(&doc.blocks, &doc.secondary_lines);
    let base = RgbaImage::from_pixel(1000, 640, Rgba([255, 255, 255, 255]));

    let mut group = c.benchmark_group("mask");
    for mode in [MaskMode::Rectangle, MaskMode::Blur] {
        group.bench_function(mode.as_str(), |b| {
            b.iter_batched_ref(
                || base.clone(),
                |image| mask_fields(image, black_box(&fields), mode),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detect, bench_batch, bench_mask);
criterion_main!(benches);

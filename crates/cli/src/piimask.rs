//! piimask - Mask PII in a scanned document image
//!
//! Reads the image together with the OCR output produced for it
//! (a Textract AnalyzeDocument response and, optionally, Tesseract TSV for
//! additional scripts) and writes a PNG with every detected PII region
//! blacked out or blurred.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use piimask_core::config::{DetectorConfig, RuleSet};
use piimask_core::high_level::{OcrDocument, image_dimensions, redact_image};
use piimask_core::mask::MaskMode;
use piimask_core::{PiiClassifier, tesseract, textract};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Mask personally identifiable information in a document image.
#[derive(Parser, Debug)]
#[command(name = "piimask")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PNG or JPEG image to redact
    image: PathBuf,

    /// Textract AnalyzeDocument JSON for the image
    #[arg(short = 'b', long)]
    blocks: PathBuf,

    /// Tesseract TSV output for an additional script (repeatable)
    #[arg(short = 's', long = "secondary")]
    secondary: Vec<PathBuf>,

    /// Masking mode: "rectangle" or "blur" (anything else means rectangle)
    #[arg(short = 'm', long = "mask-type", default_value = "rectangle")]
    mask_type: String,

    /// JSON rule file overriding the built-in detection rules
    #[arg(short = 'r', long)]
    rules: Option<PathBuf>,

    /// Path to write the masked PNG to, or "-" for stdout
    #[arg(short = 'o', long, default_value = "masked.png")]
    outfile: String,

    /// Also write the detected fields as JSON to this path
    #[arg(short = 'f', long)]
    fields: Option<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the rule file if given, else the built-in configuration.
fn load_config(rules: Option<&Path>) -> Result<DetectorConfig> {
    match rules {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read rules {}", path.display()))?;
            let rules = RuleSet::from_json(&json)
                .with_context(|| format!("failed to parse rules {}", path.display()))?;
            Ok(DetectorConfig::from_rules(&rules)?)
        }
        None => Ok(DetectorConfig::builtin().clone()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = load_config(args.rules.as_deref())?;
    let classifier = PiiClassifier::new(&config);

    let image_bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read image {}", args.image.display()))?;
    let blocks = textract::read_blocks(&args.blocks)
        .with_context(|| format!("failed to load blocks {}", args.blocks.display()))?;

    let image_size = image_dimensions(&image_bytes).ok();
    let mut secondary_lines = Vec::new();
    for path in &args.secondary {
        let tsv = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read TSV {}", path.display()))?;
        secondary_lines.extend(tesseract::parse_tsv(&tsv, image_size));
    }
    info!(
        blocks = blocks.len(),
        secondary_lines = secondary_lines.len(),
        "loaded OCR output"
    );

    let document = OcrDocument {
        blocks,
        secondary_lines,
    };
    let mode = MaskMode::from_name(&args.mask_type);
    let redaction = redact_image(&image_bytes, &document, &classifier, mode)
        .with_context(|| format!("failed to redact {}", args.image.display()))?;

    if let Some(ref path) = args.fields {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &redaction.fields)?;
    }

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };
    output.write_all(&redaction.png)?;
    output.flush()?;

    info!(
        fields = redaction.fields.len(),
        masked = redaction.report.masked_count(),
        skipped = redaction.report.skipped.len(),
        "wrote masked image"
    );
    Ok(())
}

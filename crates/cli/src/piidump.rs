//! piidump - Dump intermediate PII detection state as JSON
//!
//! Shows what the classifier sees for one document: the resolved
//! key/value pairs, the line observations from every engine, or the final
//! detected fields with pixel rectangles.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use piimask_core::config::{DetectorConfig, RuleSet};
use piimask_core::geometry::{PixelRect, rectify};
use piimask_core::high_level::image_dimensions;
use piimask_core::{LineObservation, PiiClassifier, PiiField, kv, tesseract, textract};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpKind {
    /// Key/value pairs resolved from the form blocks
    Pairs,
    /// Primary and secondary line observations
    Lines,
    /// Detected PII fields
    Fields,
}

/// Dump PII detection state for a document.
#[derive(Parser, Debug)]
#[command(name = "piidump")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Textract AnalyzeDocument JSON
    #[arg(short = 'b', long)]
    blocks: PathBuf,

    /// Tesseract TSV output for an additional script (repeatable)
    #[arg(short = 's', long = "secondary")]
    secondary: Vec<PathBuf>,

    /// Image the OCR ran on; adds pixel rectangles to the field dump
    #[arg(short = 'i', long)]
    image: Option<PathBuf>,

    /// JSON rule file overriding the built-in detection rules
    #[arg(short = 'r', long)]
    rules: Option<PathBuf>,

    /// What to dump
    #[arg(short = 't', long = "type", value_enum, default_value_t = DumpKind::Fields)]
    kind: DumpKind,

    /// Output file, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

#[derive(Serialize)]
struct FieldDump<'a> {
    #[serde(flatten)]
    field: &'a PiiField,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rect: Option<PixelRect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<String>,
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

fn load_config(rules: Option<&Path>) -> Result<DetectorConfig> {
    let Some(path) = rules else {
        return Ok(DetectorConfig::builtin().clone());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules {}", path.display()))?;
    let rules = RuleSet::from_json(&json)
        .with_context(|| format!("failed to parse rules {}", path.display()))?;
    Ok(DetectorConfig::from_rules(&rules)?)
}

fn dump_fields<W: Write>(
    out: &mut W,
    fields: &[PiiField],
    image_size: Option<(u32, u32)>,
) -> Result<()> {
    let dumped: Vec<FieldDump<'_>> = fields
        .iter()
        .map(|field| {
            let (rect, rejected) = match image_size {
                Some((w, h)) => match rectify(field.geometry.as_ref(), w, h) {
                    Ok(rect) => (Some(rect), None),
                    Err(reason) => (None, Some(reason.to_string())),
                },
                None => (None, None),
            };
            FieldDump {
                field,
                label: field.category.label(),
                rect,
                rejected,
            }
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &dumped)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let graph = textract::read_blocks(&args.blocks)
        .with_context(|| format!("failed to load blocks {}", args.blocks.display()))?;

    let image_size = match args.image {
        Some(ref path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read image {}", path.display()))?;
            Some(image_dimensions(&bytes)?)
        }
        None => None,
    };
    debug!(?image_size, "image size");

    let mut secondary: Vec<LineObservation> = Vec::new();
    for path in &args.secondary {
        let tsv = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read TSV {}", path.display()))?;
        secondary.extend(tesseract::parse_tsv(&tsv, image_size));
    }

    let mut out: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    match args.kind {
        DumpKind::Pairs => {
            serde_json::to_writer_pretty(&mut out, &kv::extract(&graph))?;
        }
        DumpKind::Lines => {
            let mut lines = graph.primary_lines();
            lines.extend(secondary);
            serde_json::to_writer_pretty(&mut out, &lines)?;
        }
        DumpKind::Fields => {
            let config = load_config(args.rules.as_deref())?;
            let classifier = PiiClassifier::new(&config);
            let fields = classifier.detect(&graph, &secondary);
            dump_fields(&mut out, &fields, image_size)?;
        }
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

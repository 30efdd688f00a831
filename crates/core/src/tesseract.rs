//! Ingestion of Tesseract TSV output (`tesseract IMAGE - -l hin tsv`).
//!
//! Tesseract reports one row per page, block, paragraph, line and word.
//! Only word rows carry text; they are regrouped into lines here so each
//! line becomes one secondary observation.

use indexmap::IndexMap;
use tracing::debug;

use crate::geometry::NormalizedBox;
use crate::lines::LineObservation;

const LEVEL_PAGE: u32 = 1;
const LEVEL_WORD: u32 = 5;
const COLUMNS: usize = 12;

#[derive(Debug, Clone, Copy)]
struct PixelBox {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PixelBox {
    fn union(self, other: PixelBox) -> PixelBox {
        PixelBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

#[derive(Debug, Default)]
struct LineAccumulator {
    words: Vec<String>,
    bbox: Option<PixelBox>,
    confidence_sum: f64,
    page: u32,
}

struct Row<'a> {
    level: u32,
    page: u32,
    key: (u32, u32, u32, u32),
    bbox: PixelBox,
    conf: f64,
    text: &'a str,
}

fn parse_row(line: &str) -> Option<Row<'_>> {
    let cols: Vec<&str> = line.splitn(COLUMNS, '\t').collect();
    if cols.len() < COLUMNS - 1 {
        return None;
    }
    let num = |i: usize| cols[i].trim().parse::<u32>().ok();
    let float = |i: usize| cols[i].trim().parse::<f64>().ok();

    let level = num(0)?;
    let page = num(1)?;
    let left = float(6)?;
    let top = float(7)?;
    let width = float(8)?;
    let height = float(9)?;
    Some(Row {
        level,
        page,
        key: (page, num(2)?, num(3)?, num(4)?),
        bbox: PixelBox {
            left,
            top,
            right: left + width,
            bottom: top + height,
        },
        conf: float(10)?,
        text: cols.get(11).copied().unwrap_or(""),
    })
}

/// Group TSV word rows into secondary line observations.
///
/// Boxes are normalized by the page row's size; when the TSV has no page
/// row, `image_size` is used instead, and without either the lines carry
/// no geometry. Header and malformed rows are skipped.
pub fn parse_tsv(tsv: &str, image_size: Option<(u32, u32)>) -> Vec<LineObservation> {
    let mut pages: IndexMap<u32, (f64, f64)> = IndexMap::new();
    let mut lines: IndexMap<(u32, u32, u32, u32), LineAccumulator> = IndexMap::new();
    let mut skipped = 0usize;

    for raw in tsv.lines() {
        if raw.is_empty() || raw.starts_with("level") {
            continue;
        }
        let Some(row) = parse_row(raw) else {
            skipped += 1;
            continue;
        };
        match row.level {
            LEVEL_PAGE => {
                pages.insert(row.page, (row.bbox.right - row.bbox.left, row.bbox.bottom - row.bbox.top));
            }
            LEVEL_WORD => {
                let word = row.text.trim();
                if word.is_empty() {
                    continue;
                }
                let acc = lines.entry(row.key).or_default();
                acc.page = row.page;
                acc.words.push(word.to_string());
                acc.confidence_sum += row.conf;
                acc.bbox = Some(match acc.bbox {
                    Some(b) => b.union(row.bbox),
                    None => row.bbox,
                });
            }
            _ => {}
        }
    }

    if skipped > 0 {
        debug!(skipped, "skipped malformed TSV rows");
    }

    let fallback = image_size.map(|(w, h)| (f64::from(w), f64::from(h)));
    lines
        .into_values()
        .map(|acc| {
            let size = pages.get(&acc.page).copied().or(fallback);
            let geometry = match (acc.bbox, size) {
                (Some(b), Some((w, h))) if w > 0.0 && h > 0.0 => Some(NormalizedBox::new(
                    b.left / w,
                    b.top / h,
                    (b.right - b.left) / w,
                    (b.bottom - b.top) / h,
                )),
                _ => None,
            };
            let confidence = acc.confidence_sum / acc.words.len() as f64;
            LineObservation::secondary(acc.words.join(" "), geometry, confidence)
        })
        .collect()
}

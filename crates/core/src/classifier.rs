//! Multi-pass PII classification.
//!
//! Four passes run in a fixed order, from the most to the least reliable
//! signal:
//!
//! 1. form-field keys matched against known aliases,
//! 2. form-field values matched against category patterns,
//! 3. free-standing lines from the primary engine,
//! 4. free-standing lines from secondary engines, with the primary
//!    engine's geometry substituted when an identical line exists.
//!
//! All passes share one set of already-emitted values. A value emitted by
//! an earlier pass is never emitted again, which is what gives the passes
//! their priority. Any text containing a blacklisted term is skipped in
//! every pass.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::blocks::BlockGraph;
use crate::category::PiiCategory;
use crate::config::{DetectorConfig, normalize_key};
use crate::field::{DetectionSource, PiiField};
use crate::geometry::NormalizedBox;
use crate::kv::{self, KeyValueMap};
use crate::language::{Language, LanguageDetector, ScriptDetector};
use crate::lines::LineObservation;

/// Patterns tried on free-standing lines once the digit checks fail.
const LINE_CASCADE: [PiiCategory; 5] = [
    PiiCategory::NationalId,
    PiiCategory::EmailAddress,
    PiiCategory::DateOfBirth,
    PiiCategory::Gender,
    PiiCategory::Name,
];

/// Zero code points of the decimal digit runs counted alongside ASCII.
const DIGIT_ZEROS: [u32; 9] = [
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
];

/// Value of a decimal digit in ASCII or an Indic script.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    let code = c as u32;
    DIGIT_ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .map(|&zero| code - zero)
}

/// Emitted fields plus the values they claimed.
#[derive(Debug, Default)]
struct Accumulator {
    seen: FxHashSet<String>,
    fields: Vec<PiiField>,
}

impl Accumulator {
    fn has_seen(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    fn emit(
        &mut self,
        category: PiiCategory,
        value: &str,
        geometry: Option<NormalizedBox>,
        confidence: f64,
        source: DetectionSource,
    ) {
        debug!(%category, value, ?source, "emitting PII field");
        self.seen.insert(value.to_string());
        self.fields.push(PiiField {
            category,
            value: value.to_string(),
            geometry,
            confidence,
            source,
        });
    }
}

/// The PII decision engine.
///
/// Borrows an immutable [`DetectorConfig`]; one classifier can serve any
/// number of concurrent calls.
#[derive(Debug, Clone)]
pub struct PiiClassifier<'c, D = ScriptDetector> {
    config: &'c DetectorConfig,
    detector: D,
}

impl<'c> PiiClassifier<'c, ScriptDetector> {
    /// Classifier using script-based language detection that defaults to
    /// the configuration's default language.
    pub fn new(config: &'c DetectorConfig) -> Self {
        Self {
            config,
            detector: ScriptDetector::new(config.default_language()),
        }
    }
}

impl Default for PiiClassifier<'static, ScriptDetector> {
    fn default() -> Self {
        Self::new(DetectorConfig::builtin())
    }
}

impl<'c, D: LanguageDetector> PiiClassifier<'c, D> {
    pub fn with_detector(config: &'c DetectorConfig, detector: D) -> Self {
        Self { config, detector }
    }

    pub fn config(&self) -> &DetectorConfig {
        self.config
    }

    /// Extract pairs and lines from `graph` and classify them together
    /// with `secondary_lines`.
    pub fn detect(&self, graph: &BlockGraph, secondary_lines: &[LineObservation]) -> Vec<PiiField> {
        let pairs = kv::extract(graph);
        debug!(pairs = pairs.len(), "extracted key-value pairs");
        let primary_lines = graph.primary_lines();
        self.classify(&pairs, &primary_lines, secondary_lines)
    }

    /// Run all passes and return the fields in emission order.
    pub fn classify(
        &self,
        pairs: &KeyValueMap,
        primary_lines: &[LineObservation],
        secondary_lines: &[LineObservation],
    ) -> Vec<PiiField> {
        let mut acc = Accumulator::default();
        self.map_key_aliases(pairs, &mut acc);
        self.match_pair_patterns(pairs, &mut acc);
        self.scan_primary_lines(primary_lines, &mut acc);
        self.scan_secondary_lines(secondary_lines, primary_lines, &mut acc);
        info!(fields = acc.fields.len(), "detected PII fields");
        acc.fields
    }

    /// Category of a free-standing line, or `None` if it is not PII.
    ///
    /// Bare digit runs are judged on their digits alone: ten digits with
    /// an accepted leading digit are a phone number, twelve are a national
    /// ID. Native Indic numerals count by value. Everything else goes
    /// through the line pattern cascade.
    pub fn line_category(&self, text: &str, lang: Language) -> Option<PiiCategory> {
        let digits: Vec<u32> = text.chars().filter_map(decimal_value).collect();
        match digits.len() {
            10 if char::from_digit(digits[0], 10)
                .is_some_and(|c| self.config.is_phone_leading_digit(c)) =>
            {
                return Some(PiiCategory::PhoneNumber);
            }
            12 => return Some(PiiCategory::NationalId),
            _ => {}
        }
        LINE_CASCADE
            .into_iter()
            .find(|&category| self.config.matches(category, lang, text))
    }

    fn blacklisted(&self, text: &str, lang: Language) -> bool {
        let hit = self.config.is_blacklisted(text, lang);
        if hit {
            debug!(text, %lang, "skipping blacklisted text");
        }
        hit
    }

    fn map_key_aliases(&self, pairs: &KeyValueMap, acc: &mut Accumulator) {
        for (key, value) in pairs {
            let normalized = normalize_key(key);
            let key_lang = self.detector.detect(&normalized);
            let Some(category) = self.config.category_for_key(&normalized, key_lang) else {
                continue;
            };
            if acc.has_seen(&value.text) {
                continue;
            }
            if self.blacklisted(&value.text, self.detector.detect(&value.text)) {
                continue;
            }
            acc.emit(
                category,
                &value.text,
                value.geometry,
                value.confidence,
                DetectionSource::KeyAlias,
            );
        }
    }

    fn match_pair_patterns(&self, pairs: &KeyValueMap, acc: &mut Accumulator) {
        for value in pairs.values() {
            if acc.has_seen(&value.text) {
                continue;
            }
            let lang = self.detector.detect(&value.text);
            if self.blacklisted(&value.text, lang) {
                continue;
            }
            let candidate = value.text.trim();
            let matched = self
                .config
                .regex_priority()
                .iter()
                .copied()
                .find(|&category| self.config.matches(category, lang, candidate));
            if let Some(category) = matched {
                acc.emit(
                    category,
                    &value.text,
                    value.geometry,
                    value.confidence,
                    DetectionSource::KeyValueRegex,
                );
            }
        }
    }

    fn scan_primary_lines(&self, lines: &[LineObservation], acc: &mut Accumulator) {
        for line in lines {
            let text = line.text.trim();
            if let Some(category) = self.classify_line(text, acc) {
                acc.emit(
                    category,
                    text,
                    line.geometry,
                    line.confidence,
                    DetectionSource::PrimaryLine,
                );
            }
        }
    }

    fn scan_secondary_lines(
        &self,
        lines: &[LineObservation],
        primary_lines: &[LineObservation],
        acc: &mut Accumulator,
    ) {
        let mut primary_by_text: FxHashMap<&str, &LineObservation> = FxHashMap::default();
        for primary in primary_lines {
            primary_by_text.entry(primary.text.trim()).or_insert(primary);
        }

        for line in lines {
            let text = line.text.trim();
            let Some(category) = self.classify_line(text, acc) else {
                continue;
            };
            let (geometry, confidence) = match primary_by_text.get(text) {
                Some(primary) if primary.geometry.is_some() => {
                    debug!(text, "using primary engine geometry");
                    (primary.geometry, primary.confidence)
                }
                _ => (line.geometry, line.confidence),
            };
            acc.emit(
                category,
                text,
                geometry,
                confidence,
                DetectionSource::SecondaryLine,
            );
        }
    }

    fn classify_line(&self, text: &str, acc: &Accumulator) -> Option<PiiCategory> {
        if text.is_empty() || acc.has_seen(text) {
            return None;
        }
        if self.config.is_key_alias(&normalize_key(text)) {
            debug!(text, "skipping form label");
            return None;
        }
        let lang = self.detector.detect(text);
        if self.blacklisted(text, lang) {
            return None;
        }
        self.line_category(text, lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_value_reads_indic_digits() {
        assert_eq!(decimal_value('7'), Some(7));
        assert_eq!(decimal_value('९'), Some(9));
        assert_eq!(decimal_value('௦'), Some(0));
        assert_eq!(decimal_value('x'), None);
        assert_eq!(decimal_value('½'), None);
    }
}

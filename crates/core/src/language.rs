//! Best-effort language detection.
//!
//! The classifier only needs to know which per-language rule variant to
//! apply, so detection works on scripts: it counts letters per script and
//! picks the predominant one. Anything it cannot decide maps to the
//! detector's default language.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PiiError;

/// Languages with dedicated rule tables.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ta")]
    Tamil,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Tamil];

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Tamil => "ta",
        }
    }

    /// Tesseract traineddata name.
    pub fn tesseract_code(self) -> &'static str {
        match self {
            Language::English => "eng",
            Language::Hindi => "hin",
            Language::Tamil => "tam",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = PiiError;

    /// Accepts ISO 639-1 and Tesseract codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.code() == lower || l.tesseract_code() == lower)
            .ok_or_else(|| PiiError::UnknownLanguage(s.to_string()))
    }
}

/// Language detection capability.
///
/// Implementations must always return a language; there is no failure
/// path.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Language;
}

impl<D: LanguageDetector + ?Sized> LanguageDetector for &D {
    fn detect(&self, text: &str) -> Language {
        (**self).detect(text)
    }
}

/// Detector that always answers the same language.
#[derive(Debug, Clone, Copy)]
pub struct FixedLanguage(pub Language);

impl LanguageDetector for FixedLanguage {
    fn detect(&self, _text: &str) -> Language {
        self.0
    }
}

/// Script-counting detector.
#[derive(Debug, Clone, Copy)]
pub struct ScriptDetector {
    default: Language,
}

impl ScriptDetector {
    pub fn new(default: Language) -> Self {
        Self { default }
    }

    pub fn default_language(&self) -> Language {
        self.default
    }
}

impl Default for ScriptDetector {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Language {
        // Pure ASCII can only be Latin or nothing.
        if text.is_ascii() {
            return if text.bytes().any(|b| b.is_ascii_alphabetic()) {
                Language::English
            } else {
                self.default
            };
        }

        let mut latin = 0usize;
        let mut devanagari = 0usize;
        let mut tamil = 0usize;
        for c in text.chars() {
            if is_devanagari(c) {
                devanagari += 1;
            } else if is_tamil(c) {
                tamil += 1;
            } else if c.is_alphabetic() && is_latin(c) {
                latin += 1;
            }
        }

        let mut counts = [
            (Language::English, latin),
            (Language::Hindi, devanagari),
            (Language::Tamil, tamil),
        ];
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let [(best, n), (_, runner_up), _] = counts;
        if n == 0 || n == runner_up {
            self.default
        } else {
            best
        }
    }
}

#[inline]
fn is_devanagari(c: char) -> bool {
    let code = c as u32;
    (0x0900..=0x097F).contains(&code) || // Devanagari
    (0xA8E0..=0xA8FF).contains(&code) // Devanagari Extended
}

#[inline]
fn is_tamil(c: char) -> bool {
    let code = c as u32;
    (0x0B80..=0x0BFF).contains(&code) || // Tamil
    (0x11FC0..=0x11FFF).contains(&code) // Tamil Supplement
}

#[inline]
fn is_latin(c: char) -> bool {
    let code = c as u32;
    c.is_ascii_alphabetic() ||
    (0x00C0..=0x024F).contains(&code) || // Latin-1 Supplement, Extended-A/B
    (0x1E00..=0x1EFF).contains(&code) // Latin Extended Additional
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_scripts() {
        let d = ScriptDetector::default();
        assert_eq!(d.detect("John Doe"), Language::English);
        assert_eq!(d.detect("राम कुमार"), Language::Hindi);
        assert_eq!(d.detect("முகவரி"), Language::Tamil);
    }

    #[test]
    fn test_falls_back_to_default() {
        let d = ScriptDetector::new(Language::Tamil);
        assert_eq!(d.detect(""), Language::Tamil);
        assert_eq!(d.detect("12/05/1990"), Language::Tamil);
        assert_eq!(d.detect("—"), Language::Tamil);
    }

    #[test]
    fn test_tie_falls_back_to_default() {
        let d = ScriptDetector::new(Language::Hindi);
        // One Latin and one Tamil letter.
        assert_eq!(d.detect("a ம"), Language::Hindi);
    }

    #[test]
    fn test_mixed_line_uses_majority() {
        let d = ScriptDetector::default();
        assert_eq!(d.detect("Name / नाम"), Language::English);
        assert_eq!(d.detect("पुरुष / MALE"), Language::Hindi);
        assert_eq!(d.detect("भारत सरकार / GOI"), Language::Hindi);
    }

    #[test]
    fn test_parses_codes() {
        assert_eq!("hin".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("TA".parse::<Language>().unwrap(), Language::Tamil);
        assert!("xx".parse::<Language>().is_err());
    }
}

//! Detector configuration.
//!
//! [`RuleSet`] is the plain, serializable form of every table the
//! classifier consults. [`DetectorConfig`] is the compiled, immutable form
//! that classification borrows. The built-in configuration is compiled
//! once per process and shared.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::category::{DEFAULT_REGEX_PRIORITY, PiiCategory};
use crate::error::{PiiError, Result};
use crate::language::Language;

/// A category's regex, either one pattern for all languages or one per
/// language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Shared(String),
    PerLanguage(BTreeMap<Language, String>),
}

/// Serializable detection rules.
///
/// Fields missing from a rule file take their built-in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Language used when detection is inconclusive or a table has no
    /// entry for the detected language.
    pub default_language: Language,

    /// Form-field key spellings per category and language.
    pub key_aliases: BTreeMap<PiiCategory, BTreeMap<Language, Vec<String>>>,

    /// Value patterns per category.
    pub patterns: BTreeMap<PiiCategory, PatternSpec>,

    /// Boilerplate terms that disqualify any text containing them.
    pub blacklist: BTreeMap<Language, Vec<String>>,

    /// First digits accepted for a bare 10-digit phone number.
    pub phone_leading_digits: String,

    /// Order in which categories are tried during regex fallback.
    pub regex_priority: Vec<PiiCategory>,
}

fn aliases(table: &[(Language, &[&str])]) -> BTreeMap<Language, Vec<String>> {
    table
        .iter()
        .map(|(lang, words)| (*lang, words.iter().map(|w| w.to_string()).collect()))
        .collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        use Language::{English as En, Hindi as Hi, Tamil as Ta};

        let mut key_aliases = BTreeMap::new();
        key_aliases.insert(
            PiiCategory::Name,
            aliases(&[
                (
                    En,
                    &[
                        "name",
                        "full name",
                        "fullname",
                        "given name",
                        "surname",
                        "father's name",
                        "father name",
                        "mother's name",
                    ],
                ),
                (Hi, &["नाम", "पूरा नाम", "पिता का नाम"]),
                (Ta, &["பெயர்", "தந்தை பெயர்"]),
            ]),
        );
        key_aliases.insert(
            PiiCategory::Address,
            aliases(&[
                (
                    En,
                    &[
                        "address",
                        "addr",
                        "permanent address",
                        "residential address",
                        "current address",
                    ],
                ),
                (Hi, &["पता", "स्थायी पता"]),
                (Ta, &["முகவரி"]),
            ]),
        );
        key_aliases.insert(
            PiiCategory::PhoneNumber,
            aliases(&[
                (
                    En,
                    &[
                        "phone",
                        "mobile",
                        "telephone",
                        "contact number",
                        "mobile no",
                        "mobile number",
                        "phone number",
                    ],
                ),
                (Hi, &["मोबाइल", "फ़ोन", "मोबाइल नंबर"]),
                (Ta, &["கைபேசி", "தொலைபேசி"]),
            ]),
        );
        key_aliases.insert(
            PiiCategory::EmailAddress,
            aliases(&[
                (En, &["email", "e-mail", "mail", "email id", "email address"]),
                (Hi, &["ईमेल"]),
                (Ta, &["மின்னஞ்சல்"]),
            ]),
        );
        key_aliases.insert(
            PiiCategory::NationalId,
            aliases(&[
                (
                    En,
                    &["aadhaar number", "uid", "aadhaar", "aadhaar no", "aadhar", "vid"],
                ),
                (Hi, &["आधार", "आधार संख्या", "आधार नंबर"]),
                (Ta, &["ஆதார்", "ஆதார் எண்"]),
            ]),
        );
        key_aliases.insert(
            PiiCategory::DateOfBirth,
            aliases(&[
                (
                    En,
                    &["dob", "date of birth", "birth date", "bdate", "d.o.b", "year of birth"],
                ),
                (Hi, &["जन्म तिथि", "जन्म तारीख"]),
                (Ta, &["பிறந்த தேதி"]),
            ]),
        );
        key_aliases.insert(
            PiiCategory::Gender,
            aliases(&[(En, &["gender", "sex"]), (Hi, &["लिंग"]), (Ta, &["பாலினம்"])]),
        );

        let mut patterns = BTreeMap::new();
        patterns.insert(
            PiiCategory::Name,
            PatternSpec::PerLanguage(BTreeMap::from([
                (
                    En,
                    r"^[A-Z][A-Za-z'.-]*(?:\s+[A-Z][A-Za-z'.-]*){1,3}$".to_string(),
                ),
                (Hi, r"^[\p{Devanagari}&&\D]+(?:\s+[\p{Devanagari}&&\D]+){1,3}$".to_string()),
                (Ta, r"^[\p{Tamil}&&\D]+(?:\s+[\p{Tamil}&&\D]+){1,3}$".to_string()),
            ])),
        );
        patterns.insert(
            PiiCategory::Address,
            PatternSpec::Shared(r"^\d{1,5}\s\w+\s\w+".to_string()),
        );
        patterns.insert(
            PiiCategory::PhoneNumber,
            PatternSpec::Shared(
                r"^(?:\+91[\s-]?)?[789]\d{9}$|^\d{3}-\d{3}-\d{4}$|^\d{10}$"
                    .to_string(),
            ),
        );
        patterns.insert(
            PiiCategory::EmailAddress,
            PatternSpec::Shared(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$".to_string()),
        );
        patterns.insert(
            PiiCategory::NationalId,
            PatternSpec::Shared(r"^\d{4}\s?\d{4}\s?\d{4}$".to_string()),
        );
        patterns.insert(
            PiiCategory::DateOfBirth,
            PatternSpec::Shared(r"^\d{2}[-/]\d{2}[-/]\d{2,4}$".to_string()),
        );
        patterns.insert(
            PiiCategory::Gender,
            PatternSpec::PerLanguage(BTreeMap::from([
                (En, r"^(?i:male|female|transgender|m|f)$".to_string()),
                (
                    Hi,
                    r"^(?:पुरुष|महिला|स्त्री|ट्रांसजेंडर)(?:\s*/\s*(?i:male|female|transgender))?$"
                        .to_string(),
                ),
                (
                    Ta,
                    r"^(?:ஆண்|பெண்|திருநங்கை)(?:\s*/\s*(?i:male|female|transgender))?$".to_string(),
                ),
            ])),
        );

        let blacklist = aliases(&[
            (
                En,
                &[
                    "government",
                    "ministry",
                    "certificate",
                    "department",
                    "authority",
                    "republic",
                    "unique identification",
                    "income tax",
                    "election commission",
                    "signature",
                    "permanent account number",
                ],
            ),
            (
                Hi,
                &["सरकार", "मंत्रालय", "प्रमाण पत्र", "विभाग", "प्राधिकरण", "आयकर", "हस्ताक्षर"],
            ),
            (
                Ta,
                &["அரசு", "அமைச்சகம்", "சான்றிதழ்", "துறை", "ஆணையம்", "கையொப்பம்"],
            ),
        ]);

        Self {
            default_language: En,
            key_aliases,
            patterns,
            blacklist,
            phone_leading_digits: "789".to_string(),
            regex_priority: DEFAULT_REGEX_PRIORITY.to_vec(),
        }
    }
}

impl RuleSet {
    /// Parse a JSON rule file.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone)]
enum CompiledPattern {
    Shared(Regex),
    PerLanguage(FxHashMap<Language, Regex>),
}

/// Normalize a form-field key for alias lookup.
///
/// NFKC folds compatibility forms (full-width colons and letters), then
/// the key is lowercased and trailing colons and whitespace are removed.
pub fn normalize_key(key: &str) -> String {
    let folded: String = key.nfkc().collect::<String>().to_lowercase();
    folded
        .trim()
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

/// Compiled, immutable detection tables.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    default_language: Language,
    aliases: FxHashMap<(PiiCategory, Language), Vec<String>>,
    alias_set: FxHashSet<String>,
    patterns: FxHashMap<PiiCategory, CompiledPattern>,
    blacklist: FxHashMap<Language, Vec<String>>,
    phone_leading_digits: Vec<char>,
    regex_priority: Vec<PiiCategory>,
}

static BUILTIN: LazyLock<DetectorConfig> = LazyLock::new(|| {
    DetectorConfig::from_rules(&RuleSet::default()).expect("built-in rule set compiles")
});

fn compile(category: PiiCategory, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| PiiError::InvalidPattern { category, source })
}

impl DetectorConfig {
    /// The process-wide built-in configuration.
    pub fn builtin() -> &'static DetectorConfig {
        &BUILTIN
    }

    /// Compile a rule set.
    ///
    /// # Errors
    ///
    /// Returns `PiiError::InvalidPattern` if any regex fails to compile.
    pub fn from_rules(rules: &RuleSet) -> Result<Self> {
        let mut aliases = FxHashMap::default();
        for (&category, per_lang) in &rules.key_aliases {
            for (&lang, words) in per_lang {
                let normalized: Vec<String> = words.iter().map(|w| normalize_key(w)).collect();
                aliases.insert((category, lang), normalized);
            }
        }

        let alias_set = aliases.values().flatten().cloned().collect();

        let mut patterns = FxHashMap::default();
        for (&category, spec) in &rules.patterns {
            let compiled = match spec {
                PatternSpec::Shared(p) => CompiledPattern::Shared(compile(category, p)?),
                PatternSpec::PerLanguage(per_lang) => {
                    let mut table = FxHashMap::default();
                    for (&lang, p) in per_lang {
                        table.insert(lang, compile(category, p)?);
                    }
                    CompiledPattern::PerLanguage(table)
                }
            };
            patterns.insert(category, compiled);
        }

        let blacklist = rules
            .blacklist
            .iter()
            .map(|(&lang, terms)| {
                let lowered = terms
                    .iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect();
                (lang, lowered)
            })
            .collect();

        let mut regex_priority: Vec<PiiCategory> = Vec::with_capacity(PiiCategory::ALL.len());
        for &category in rules.regex_priority.iter().chain(PiiCategory::ALL.iter()) {
            if !regex_priority.contains(&category) {
                regex_priority.push(category);
            }
        }

        Ok(Self {
            default_language: rules.default_language,
            aliases,
            alias_set,
            patterns,
            blacklist,
            phone_leading_digits: rules
                .phone_leading_digits
                .chars()
                .filter(char::is_ascii_digit)
                .collect(),
            regex_priority,
        })
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    pub fn regex_priority(&self) -> &[PiiCategory] {
        &self.regex_priority
    }

    /// Category whose alias list contains `normalized_key`.
    ///
    /// Aliases of `lang` are searched first, then those of the default
    /// language. Within a language, categories are tried in enumeration
    /// order.
    pub fn category_for_key(&self, normalized_key: &str, lang: Language) -> Option<PiiCategory> {
        let find = |lang: Language| {
            PiiCategory::ALL.into_iter().find(|&category| {
                self.aliases
                    .get(&(category, lang))
                    .is_some_and(|words| words.iter().any(|w| w == normalized_key))
            })
        };
        find(lang).or_else(|| {
            if lang == self.default_language {
                None
            } else {
                find(self.default_language)
            }
        })
    }

    /// Whether `normalized_key` is an alias of any category in any
    /// language.
    pub fn is_key_alias(&self, normalized_key: &str) -> bool {
        self.alias_set.contains(normalized_key)
    }

    /// Pattern for `category` in `lang`, falling back to the default
    /// language for language-keyed categories.
    pub fn pattern(&self, category: PiiCategory, lang: Language) -> Option<&Regex> {
        match self.patterns.get(&category)? {
            CompiledPattern::Shared(re) => Some(re),
            CompiledPattern::PerLanguage(table) => table
                .get(&lang)
                .or_else(|| table.get(&self.default_language)),
        }
    }

    /// Whether `text` matches the pattern of `category` for `lang`.
    pub fn matches(&self, category: PiiCategory, lang: Language, text: &str) -> bool {
        self.pattern(category, lang)
            .is_some_and(|re| re.is_match(text))
    }

    /// Whether `text` contains a boilerplate term of `lang`.
    ///
    /// Uses the default language's list when `lang` has none.
    pub fn is_blacklisted(&self, text: &str, lang: Language) -> bool {
        let terms = match self.blacklist.get(&lang) {
            Some(terms) if !terms.is_empty() => terms,
            _ => match self.blacklist.get(&self.default_language) {
                Some(terms) => terms,
                None => return false,
            },
        };
        let lowered = text.to_lowercase();
        terms.iter().any(|t| lowered.contains(t.as_str()))
    }

    pub fn is_phone_leading_digit(&self, c: char) -> bool {
        self.phone_leading_digits.contains(&c)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig::builtin().clone()
    }
}

//! Named heuristic rule tables.
//!
//! Every text-shape heuristic used by line filtering, heading classification
//! and scoring lives here as an ordered, named list so it can be tested and
//! tuned on its own:
//!
//! - [`HEADER_FOOTER_RULES`] - running page furniture dropped by the line builder
//! - [`SKIP_RULES`] - text that is never a heading
//! - [`INDICATORS`] - weak textual signals, counted by the classifier
//!
//! Rules receive the whitespace-normalised line text. Case-insensitive rules
//! carry the `(?i)` flag themselves.

use once_cell::sync::Lazy;
use regex::Regex;

/// A regular expression with a stable name.
#[derive(Debug)]
pub struct PatternRule {
    name: &'static str,
    regex: Regex,
}

impl PatternRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("rule pattern must compile"),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ordered list of pattern rules; the first match wins.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    fn from_table(table: &[(&'static str, &str)]) -> Self {
        Self {
            rules: table
                .iter()
                .map(|(name, pattern)| PatternRule::new(name, pattern))
                .collect(),
        }
    }

    /// Name of the first rule matching `text`.
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.is_match(text))
            .map(PatternRule::name)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter()
    }
}

/// Page furniture: page numbers, legal banners, links and navigation labels.
pub static HEADER_FOOTER_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_table(&[
        ("page-number", r"^\d+$"),
        ("page-label", r"(?i)^page\s*\d+$"),
        ("copyright-year", r"(?i)copyright\s+\d{4}"),
        ("url", r"(?i)^(?:https?://|www\.)"),
        ("email", r"@\w+\.\w+"),
        ("confidential", r"(?i)^confidential"),
        ("proprietary", r"(?i)^proprietary"),
        ("draft", r"(?i)^draft"),
        ("section-number", r"(?i)^section\s+\d+"),
        ("appendix-letter", r"(?i)^appendix\s+[a-z]"),
        ("table-of-contents", r"(?i)^table\s+of\s+contents"),
    ])
});

/// Text that may sit in the body but never heads a section.
pub static SKIP_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_table(&[
        ("digits", r"^\d+$"),
        ("page-label", r"(?i)^page \d+"),
        ("chapter-number", r"(?i)^chapter \d+"),
        ("figure-caption", r"(?i)^figure \d+"),
        ("table-caption", r"(?i)^table \d+"),
        ("source-note", r"(?i)^source:"),
        ("note", r"(?i)^note:"),
        ("copyright", r"(?i)copyright"),
        // stray fragments such as "and the" or "continued"; matched on the
        // text as written, so short capitalised headings like "Background" pass
        ("lowercase-fragment", r"^[a-z][a-z\s]{0,10}$"),
    ])
});

static NUMBERED_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+[A-Z]").expect("rule pattern must compile"));
static TWO_CAPITALIZED_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+\s+[A-Z][a-z]+$").expect("rule pattern must compile"));
static ROMAN_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[IVX]+\.?\s+").expect("rule pattern must compile"));
static LETTER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]\.\s+").expect("rule pattern must compile"));
static STRUCTURAL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:appendix|section|chapter)\s+").expect("rule pattern must compile")
});

/// `N.` at the start of the text; used by the scorer.
pub static NUMBER_DOT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("rule pattern must compile"));

/// `section`, `chapter` or `appendix` as the first word; used by the scorer.
pub static STRUCTURAL_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:section|chapter|appendix)\b").expect("rule pattern must compile")
});

/// Text plus the derived facts the indicators look at.
#[derive(Debug, Clone, Copy)]
pub struct TextShape<'a> {
    pub text: &'a str,
    pub word_count: usize,
}

impl<'a> TextShape<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            word_count: word_count(text),
        }
    }
}

/// A weak textual heading signal.
pub struct Indicator {
    pub name: &'static str,
    test: fn(&TextShape<'_>) -> bool,
}

impl Indicator {
    pub fn holds(&self, shape: &TextShape<'_>) -> bool {
        (self.test)(shape)
    }
}

pub static INDICATORS: [Indicator; 8] = [
    Indicator {
        name: "uppercase-short",
        test: |s| is_uppercase_text(s.text) && s.word_count <= 6,
    },
    Indicator {
        name: "numbered",
        test: |s| NUMBERED_PREFIX.is_match(s.text),
    },
    Indicator {
        name: "two-capitalized-words",
        test: |s| TWO_CAPITALIZED_WORDS.is_match(s.text),
    },
    Indicator {
        name: "few-words",
        test: |s| s.word_count <= 6,
    },
    Indicator {
        name: "trailing-colon",
        test: |s| s.text.ends_with(':'),
    },
    Indicator {
        name: "roman-numeral",
        test: |s| ROMAN_PREFIX.is_match(s.text),
    },
    Indicator {
        name: "letter-marker",
        test: |s| LETTER_PREFIX.is_match(s.text),
    },
    Indicator {
        name: "structural-prefix",
        test: |s| STRUCTURAL_PREFIX.is_match(s.text),
    },
];

/// Number of indicators that hold for `text`.
pub fn count_indicators(text: &str) -> usize {
    let shape = TextShape::new(text);
    INDICATORS.iter().filter(|i| i.holds(&shape)).count()
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True if the text has at least one cased character and no lowercase ones.
pub fn is_uppercase_text(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Fraction of alphabetic characters in `text` (0 for empty text).
pub fn alpha_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut alpha = 0usize;
    for c in text.chars() {
        total += 1;
        if c.is_alphabetic() {
            alpha += 1;
        }
    }
    alpha as f64 / total.max(1) as f64
}

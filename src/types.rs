use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("valid regex"));

/// One author of a publication. The family name is stored title-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub given: Option<String>,
    pub family: String,
}

impl Author {
    pub fn new(given: Option<&str>, family: &str) -> Self {
        Self {
            given: given.map(|g| g.trim().to_string()).filter(|g| !g.is_empty()),
            family: title_case_family(family),
        }
    }
}

/// Structured publication metadata for one resolved identifier.
///
/// Produced only by a successful provider fetch or a cache hit. Absent
/// fields stay `None`, never placeholder text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub doi: String,
    pub title: String,
    pub authors: Vec<Author>,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub article_number: Option<String>,
}

/// Strip markup tags and decode HTML/XML entities from provider text.
///
/// Crossref titles routinely carry JATS markup and entities.
pub fn clean_text(input: &str) -> String {
    let stripped = TAG_RE.replace_all(input, "");
    let decoded = quick_xml::escape::unescape_with(&stripped, resolve_html_entity)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| stripped.into_owned());
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some(" "),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "lsquo" => Some("\u{2018}"),
        "rsquo" => Some("\u{2019}"),
        "ldquo" => Some("\u{201C}"),
        "rdquo" => Some("\u{201D}"),
        "hellip" => Some("\u{2026}"),
        "deg" => Some("\u{00B0}"),
        _ => None,
    }
}

/// Title-case a family name, keeping hyphenated and apostrophe-joined
/// segments independently capitalized ("al-rashid" -> "Al-Rashid",
/// "o'brien" -> "O'Brien").
pub fn title_case_family(family: &str) -> String {
    family
        .trim()
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_segment_start = true;
    for ch in word.chars() {
        if ch == '-' || ch == '\'' || ch == '\u{2019}' {
            out.push(ch);
            at_segment_start = true;
        } else if at_segment_start {
            out.extend(ch.to_uppercase());
            at_segment_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\d{1,2}[.)]?\s*)?(?:references|bibliography|notes\s+and\s+references|works\s+cited|литература|список\s+литературы|библиографический\s+список)\s*:?\s*$",
    )
    .expect("valid section heading regex")
});

static CHAPTER_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:chapter|section|part|глава|раздел|часть)\s+(?:[0-9]+|[ivxlcdm]+|[a-zа-я])\b[^.]*$")
        .expect("valid chapter heading regex")
});

/// Classify a raw input line as a section heading. Headings are passed
/// through unchanged and never go to identifier resolution.
pub fn is_section_header(line: &str) -> bool {
    SECTION_HEADING_RE.is_match(line) || CHAPTER_HEADING_RE.is_match(line)
}

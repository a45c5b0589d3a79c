use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::format::style::{AuthorJoiner, AuthorNameFormat, DoiFormat, JournalStyle, PageRangeFormat};
use crate::types::Author;

/// Up to two initials from the given-name token list; the second initial
/// is upper-cased regardless of source casing.
fn initials(given: &str) -> Vec<char> {
    given
        .split([' ', '.', '-'])
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.chars().next())
        .take(2)
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .collect()
}

pub fn format_author(author: &Author, format: AuthorNameFormat) -> String {
    let family = author.family.as_str();
    let inits = author.given.as_deref().map(initials).unwrap_or_default();
    if inits.is_empty() {
        return family.to_string();
    }

    let plain: String = inits.iter().collect();
    let dotted: String = inits.iter().map(|c| format!("{c}.")).collect();
    match format {
        AuthorNameFormat::InitialsFirstPlain => format!("{plain} {family}"),
        AuthorNameFormat::InitialsFirstDotted => format!("{dotted} {family}"),
        AuthorNameFormat::FamilyFirstPlain => format!("{family} {plain}"),
        AuthorNameFormat::FamilyFirstDotted => {
            // `Smith A.A` — dots between initials, none at the end
            let trimmed = dotted.trim_end_matches('.');
            format!("{family} {trimmed}")
        }
        AuthorNameFormat::FamilyCommaInitials => format!("{family}, {dotted}"),
    }
}

/// Join an author list. An active And/Ampersand joiner renders the full
/// list with the joiner before the last author and disables the et-al
/// cutoff; otherwise the list is separator-joined and truncated at the
/// cutoff with "et al" appended.
pub fn format_author_list(
    authors: &[Author],
    format: AuthorNameFormat,
    separator: &str,
    et_al_cutoff: usize,
    joiner: AuthorJoiner,
) -> String {
    let rendered: Vec<String> = authors.iter().map(|a| format_author(a, format)).collect();
    if rendered.is_empty() {
        return String::new();
    }

    match joiner {
        AuthorJoiner::And | AuthorJoiner::Ampersand => {
            let word = if joiner == AuthorJoiner::And { "and" } else { "&" };
            match rendered.len() {
                1 => rendered[0].clone(),
                _ => format!(
                    "{} {word} {}",
                    rendered[..rendered.len() - 1].join(separator),
                    rendered[rendered.len() - 1]
                ),
            }
        }
        AuthorJoiner::Separator => {
            if et_al_cutoff > 0 && rendered.len() > et_al_cutoff {
                format!("{} et al", rendered[..et_al_cutoff].join(separator))
            } else {
                rendered.join(separator)
            }
        }
    }
}

/// Render a stored page string under the requested range style. A string
/// without a hyphen cannot produce a range and passes through unchanged.
pub fn format_pages(pages: &str, format: PageRangeFormat) -> String {
    let pages = pages.trim();
    let Some((start, end)) = split_range(pages) else {
        return pages.to_string();
    };

    match format {
        PageRangeFormat::HyphenSpaced => format!("{start} - {end}"),
        PageRangeFormat::Hyphen => format!("{start}-{end}"),
        PageRangeFormat::EnDashSpaced => format!("{start} \u{2013} {end}"),
        PageRangeFormat::EnDash => format!("{start}\u{2013}{end}"),
        PageRangeFormat::Compressed => {
            format!("{start}\u{2013}{}", compress_end_page(start, end))
        }
        PageRangeFormat::FirstOnly => start.to_string(),
    }
}

fn split_range(pages: &str) -> Option<(&str, &str)> {
    let (start, end) = pages.split_once(['-', '\u{2013}', '\u{2014}'])?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return None;
    }
    Some((start, end))
}

/// Strip the longest common leading digits of the end page (`122-128`
/// becomes `122–8`). A fully shared end page keeps its last digit.
fn compress_end_page<'a>(start: &str, end: &'a str) -> &'a str {
    let shared = start
        .chars()
        .zip(end.chars())
        .take_while(|(a, b)| a == b && a.is_ascii_digit())
        .count();
    let cut = shared.min(end.len().saturating_sub(1));
    &end[cut..]
}

/// The display value for the pages slot: the page string when present,
/// otherwise the article number.
pub fn pages_or_article_number(
    pages: Option<&str>,
    article_number: Option<&str>,
    format: PageRangeFormat,
) -> Option<String> {
    match pages {
        Some(p) if !p.trim().is_empty() => Some(format_pages(p, format)),
        _ => article_number.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
    }
}

pub fn format_doi(normalized: &str, format: DoiFormat) -> String {
    match format {
        DoiFormat::Plain => normalized.to_string(),
        DoiFormat::Prefixed => format!("doi:{normalized}"),
        DoiFormat::Url => format!("https://doi.org/{normalized}"),
        DoiFormat::BareUrl => format!("doi.org/{normalized}"),
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "in", "and", "&", "for", "on", "with", "by",
];

static DEFAULT_ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("journal", "J."),
        ("international", "Int."),
        ("national", "Natl."),
        ("american", "Am."),
        ("european", "Eur."),
        ("russian", "Russ."),
        ("proceedings", "Proc."),
        ("transactions", "Trans."),
        ("annals", "Ann."),
        ("advances", "Adv."),
        ("applied", "Appl."),
        ("analytical", "Anal."),
        ("bulletin", "Bull."),
        ("review", "Rev."),
        ("reviews", "Rev."),
        ("letters", "Lett."),
        ("reports", "Rep."),
        ("research", "Res."),
        ("science", "Sci."),
        ("sciences", "Sci."),
        ("scientific", "Sci."),
        ("physics", "Phys."),
        ("physical", "Phys."),
        ("chemistry", "Chem."),
        ("chemical", "Chem."),
        ("biology", "Biol."),
        ("biological", "Biol."),
        ("biochemistry", "Biochem."),
        ("medicine", "Med."),
        ("medical", "Med."),
        ("materials", "Mater."),
        ("engineering", "Eng."),
        ("environmental", "Environ."),
        ("technology", "Technol."),
        ("communications", "Commun."),
        ("computational", "Comput."),
        ("mathematics", "Math."),
        ("mathematical", "Math."),
        ("society", "Soc."),
        ("clinical", "Clin."),
        ("molecular", "Mol."),
        ("organic", "Org."),
        ("inorganic", "Inorg."),
        ("spectroscopy", "Spectrosc."),
        ("nutrition", "Nutr."),
        ("pharmacology", "Pharmacol."),
        ("psychology", "Psychol."),
        ("experimental", "Exp."),
        ("theoretical", "Theor."),
        ("quarterly", "Q."),
    ])
});

/// Trailing series designators that survive abbreviation: a single
/// letter, a roman numeral, "Part X", or a colon-prefixed letter.
static SERIES_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\s+(?:part\s+\w+|[ivxlcdm]{1,4}|[a-z])|\s*:\s*[a-z])$")
        .expect("valid series suffix regex")
});

/// Journal-name abbreviation against a word table.
pub struct JournalAbbreviator {
    table: HashMap<String, String>,
}

impl Default for JournalAbbreviator {
    fn default() -> Self {
        Self {
            table: DEFAULT_ABBREVIATIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl JournalAbbreviator {
    pub fn with_table(table: HashMap<String, String>) -> Self {
        Self { table }
    }

    pub fn abbreviate(&self, journal: &str, style: JournalStyle) -> String {
        let journal = journal.trim();
        if journal.is_empty() {
            return String::new();
        }

        let (base, suffix) = match SERIES_SUFFIX_RE.find(journal) {
            Some(m) => (&journal[..m.start()], journal[m.start()..].trim()),
            None => (journal, ""),
        };

        let abbreviated = match style {
            JournalStyle::Full => base.trim().to_string(),
            JournalStyle::Abbreviated | JournalStyle::AbbreviatedNoDots => {
                let words: Vec<String> = base
                    .split_whitespace()
                    .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().trim_matches(',').trim_matches('.')))
                    .map(|w| {
                        self.table
                            .get(&w.to_lowercase())
                            .cloned()
                            .unwrap_or_else(|| w.to_string())
                    })
                    .collect();
                let joined = words.join(" ");
                if style == JournalStyle::AbbreviatedNoDots {
                    joined.replace('.', "")
                } else {
                    joined
                }
            }
        };

        if suffix.is_empty() {
            abbreviated
        } else if suffix.starts_with(':') {
            format!("{abbreviated}{suffix}")
        } else {
            format!("{abbreviated} {suffix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(given: &str, family: &str) -> Author {
        Author::new(Some(given), family)
    }

    #[test]
    fn five_author_name_formats() {
        let a = author("John Adam", "Smith");
        assert_eq!(
            format_author(&a, AuthorNameFormat::InitialsFirstPlain),
            "JA Smith"
        );
        assert_eq!(
            format_author(&a, AuthorNameFormat::InitialsFirstDotted),
            "J.A. Smith"
        );
        assert_eq!(
            format_author(&a, AuthorNameFormat::FamilyFirstPlain),
            "Smith JA"
        );
        assert_eq!(
            format_author(&a, AuthorNameFormat::FamilyFirstDotted),
            "Smith J.A"
        );
        assert_eq!(
            format_author(&a, AuthorNameFormat::FamilyCommaInitials),
            "Smith, J.A."
        );
    }

    #[test]
    fn second_initial_is_uppercased() {
        let a = author("John adam", "Smith");
        assert_eq!(
            format_author(&a, AuthorNameFormat::FamilyCommaInitials),
            "Smith, J.A."
        );
    }

    #[test]
    fn author_without_given_name_is_family_only() {
        let a = Author::new(None, "Smith");
        assert_eq!(
            format_author(&a, AuthorNameFormat::FamilyCommaInitials),
            "Smith"
        );
    }

    #[test]
    fn et_al_cutoff_truncates_separator_joined_lists() {
        let authors = vec![
            author("A", "One"),
            author("B", "Two"),
            author("C", "Three"),
            author("D", "Four"),
        ];
        let out = format_author_list(
            &authors,
            AuthorNameFormat::FamilyFirstPlain,
            ", ",
            3,
            AuthorJoiner::Separator,
        );
        assert_eq!(out, "One A, Two B, Three C et al");
    }

    #[test]
    fn and_joiner_renders_full_list_without_cutoff() {
        let authors = vec![
            author("A", "One"),
            author("B", "Two"),
            author("C", "Three"),
            author("D", "Four"),
        ];
        let out = format_author_list(
            &authors,
            AuthorNameFormat::InitialsFirstDotted,
            ", ",
            2,
            AuthorJoiner::And,
        );
        assert_eq!(out, "A. One, B. Two, C. Three and D. Four");
    }

    #[test]
    fn six_page_range_styles() {
        assert_eq!(
            format_pages("122-128", PageRangeFormat::HyphenSpaced),
            "122 - 128"
        );
        assert_eq!(format_pages("122-128", PageRangeFormat::Hyphen), "122-128");
        assert_eq!(
            format_pages("122-128", PageRangeFormat::EnDashSpaced),
            "122 \u{2013} 128"
        );
        assert_eq!(
            format_pages("122-128", PageRangeFormat::EnDash),
            "122\u{2013}128"
        );
        assert_eq!(
            format_pages("122-128", PageRangeFormat::Compressed),
            "122\u{2013}8"
        );
        assert_eq!(format_pages("122-128", PageRangeFormat::FirstOnly), "122");
    }

    #[test]
    fn single_page_is_unchanged_under_every_style() {
        for format in [
            PageRangeFormat::HyphenSpaced,
            PageRangeFormat::Hyphen,
            PageRangeFormat::EnDashSpaced,
            PageRangeFormat::EnDash,
            PageRangeFormat::Compressed,
            PageRangeFormat::FirstOnly,
        ] {
            assert_eq!(format_pages("122", format), "122");
        }
    }

    #[test]
    fn compression_keeps_a_digit_for_identical_pages() {
        assert_eq!(
            format_pages("122-122", PageRangeFormat::Compressed),
            "122\u{2013}2"
        );
    }

    #[test]
    fn article_number_is_the_pages_fallback() {
        assert_eq!(
            pages_or_article_number(None, Some("e0141"), PageRangeFormat::Hyphen),
            Some("e0141".to_string())
        );
        assert_eq!(
            pages_or_article_number(Some("10-12"), Some("e0141"), PageRangeFormat::Hyphen),
            Some("10-12".to_string())
        );
        assert_eq!(
            pages_or_article_number(None, None, PageRangeFormat::Hyphen),
            None
        );
    }

    #[test]
    fn four_doi_formats() {
        assert_eq!(format_doi("10.1/x", DoiFormat::Plain), "10.1/x");
        assert_eq!(format_doi("10.1/x", DoiFormat::Prefixed), "doi:10.1/x");
        assert_eq!(
            format_doi("10.1/x", DoiFormat::Url),
            "https://doi.org/10.1/x"
        );
        assert_eq!(format_doi("10.1/x", DoiFormat::BareUrl), "doi.org/10.1/x");
    }

    #[test]
    fn abbreviates_known_words_and_strips_stop_words() {
        let abbrev = JournalAbbreviator::default();
        assert_eq!(
            abbrev.abbreviate("Journal of the American Chemical Society", JournalStyle::Abbreviated),
            "J. Am. Chem. Soc."
        );
        assert_eq!(
            abbrev.abbreviate(
                "Journal of the American Chemical Society",
                JournalStyle::AbbreviatedNoDots
            ),
            "J Am Chem Soc"
        );
        assert_eq!(
            abbrev.abbreviate("Journal of the American Chemical Society", JournalStyle::Full),
            "Journal of the American Chemical Society"
        );
    }

    #[test]
    fn unknown_words_pass_through() {
        let abbrev = JournalAbbreviator::default();
        assert_eq!(
            abbrev.abbreviate("Nature Physics", JournalStyle::Abbreviated),
            "Nature Phys."
        );
    }

    #[test]
    fn series_suffix_is_reappended() {
        let abbrev = JournalAbbreviator::default();
        assert_eq!(
            abbrev.abbreviate("Physical Review B", JournalStyle::Abbreviated),
            "Phys. Rev. B"
        );
        assert_eq!(
            abbrev.abbreviate("Journal of Physics: A", JournalStyle::Abbreviated),
            "J. Phys.: A"
        );
        assert_eq!(
            abbrev.abbreviate("Advances in Chemistry Part II", JournalStyle::Abbreviated),
            "Adv. Chem. Part II"
        );
    }
}

//! Built-in citation-style renderers. Each composes the shared author,
//! page, DOI and journal rules into a fixed layout; the configurable
//! pipeline lives in `custom`.

use crate::format::shared::{self, format_author_list, format_pages, JournalAbbreviator};
use crate::format::style::{AuthorJoiner, AuthorNameFormat, JournalStyle, PageRangeFormat, StyleConfig};
use crate::format::StyledRun;
use crate::types::ResolvedMetadata;

/// `Authors Title // Journal. – Year. – Vol. N, № I. – P. pages. – URL`
///
/// Pagination order of preference: article number, page range, then a
/// literal "no pagination" marker. The DOI URL is always appended.
pub fn render_gost(
    metadata: &ResolvedMetadata,
    config: &StyleConfig,
    for_preview: bool,
) -> Vec<StyledRun> {
    let mut runs = Vec::new();

    let mut head = String::new();
    if !metadata.authors.is_empty() {
        // `Family F.M.` per author, comma-joined, honoring the et-al cutoff
        let mut names: Vec<String> = metadata
            .authors
            .iter()
            .map(|a| {
                shared::format_author(a, AuthorNameFormat::FamilyCommaInitials)
                    .replacen(", ", " ", 1)
            })
            .collect();
        if config.et_al_cutoff > 0 && names.len() > config.et_al_cutoff {
            names.truncate(config.et_al_cutoff);
            names.push("et al".to_string());
        }
        head.push_str(&names.join(", "));
        head.push(' ');
    }
    head.push_str(metadata.title.trim());
    runs.push(StyledRun::plain(head));

    if let Some(journal) = non_empty(metadata.journal.as_deref()) {
        runs.push(StyledRun::separator(" // "));
        runs.push(StyledRun::plain(journal));
    }

    if let Some(year) = metadata.year {
        runs.push(StyledRun::separator(". – "));
        runs.push(StyledRun::plain(year.to_string()));
    }

    let volume = non_empty(metadata.volume.as_deref());
    let issue = non_empty(metadata.issue.as_deref());
    if volume.is_some() || issue.is_some() {
        runs.push(StyledRun::separator(". – "));
        let text = match (volume, issue) {
            (Some(v), Some(i)) => format!("Vol. {v}, \u{2116} {i}"),
            (Some(v), None) => format!("Vol. {v}"),
            (None, Some(i)) => format!("\u{2116} {i}"),
            (None, None) => unreachable!(),
        };
        runs.push(StyledRun::plain(text));
    }

    runs.push(StyledRun::separator(". – "));
    let pagination = match (
        non_empty(metadata.article_number.as_deref()),
        non_empty(metadata.pages.as_deref()),
    ) {
        (Some(art), _) => format!("Art. {art}"),
        (None, Some(pages)) => format!("P. {}", format_pages(&pages, PageRangeFormat::EnDash)),
        (None, None) => "no pagination".to_string(),
    };
    runs.push(StyledRun::plain(pagination));

    runs.push(StyledRun::separator(". – "));
    let url = format!("https://doi.org/{}", metadata.doi);
    if for_preview {
        runs.push(StyledRun::linked(url.clone(), url));
    } else {
        runs.push(StyledRun::plain(url));
    }
    runs
}

/// `Authors Title. Journal Year, Vol, Pages. URL` with an italic journal
/// and a bold year.
pub fn render_acs(
    metadata: &ResolvedMetadata,
    config: &StyleConfig,
    abbreviator: &JournalAbbreviator,
    for_preview: bool,
) -> Vec<StyledRun> {
    let mut runs = Vec::new();

    let mut head = String::new();
    if !metadata.authors.is_empty() {
        head.push_str(&format_author_list(
            &metadata.authors,
            AuthorNameFormat::FamilyCommaInitials,
            "; ",
            config.et_al_cutoff,
            AuthorJoiner::Separator,
        ));
        head.push(' ');
    }
    head.push_str(metadata.title.trim());
    if !head.ends_with('.') {
        head.push('.');
    }
    runs.push(StyledRun::plain(head));

    if let Some(journal) = non_empty(metadata.journal.as_deref()) {
        runs.push(StyledRun::separator(" "));
        runs.push(StyledRun::italic(
            abbreviator.abbreviate(&journal, JournalStyle::Abbreviated),
        ));
    }
    if let Some(year) = metadata.year {
        runs.push(StyledRun::separator(" "));
        runs.push(StyledRun::bold(year.to_string()));
    }
    if let Some(volume) = non_empty(metadata.volume.as_deref()) {
        runs.push(StyledRun::separator(", "));
        runs.push(StyledRun::italic(volume));
    }
    if let Some(pages) = non_empty(metadata.pages.as_deref()) {
        runs.push(StyledRun::separator(", "));
        runs.push(StyledRun::plain(format_pages(&pages, PageRangeFormat::EnDash)));
    } else if let Some(art) = non_empty(metadata.article_number.as_deref()) {
        runs.push(StyledRun::separator(", "));
        runs.push(StyledRun::plain(art));
    }
    runs.push(StyledRun::separator(". "));

    let url = format!("https://doi.org/{}", metadata.doi);
    if for_preview {
        runs.push(StyledRun::linked(url.clone(), url));
    } else {
        runs.push(StyledRun::plain(url));
    }
    runs
}

/// `Authors, Journal, Year, Vol, FirstPage.` with "and" before the last
/// author, an italic journal and a bold volume. No DOI element.
pub fn render_rsc(
    metadata: &ResolvedMetadata,
    _config: &StyleConfig,
    abbreviator: &JournalAbbreviator,
) -> Vec<StyledRun> {
    let mut runs = Vec::new();

    if !metadata.authors.is_empty() {
        runs.push(StyledRun::plain(format_author_list(
            &metadata.authors,
            AuthorNameFormat::InitialsFirstDotted,
            ", ",
            0,
            AuthorJoiner::And,
        )));
    }

    if let Some(journal) = non_empty(metadata.journal.as_deref()) {
        push_comma(&mut runs);
        runs.push(StyledRun::italic(
            abbreviator.abbreviate(&journal, JournalStyle::Abbreviated),
        ));
    }
    if let Some(year) = metadata.year {
        push_comma(&mut runs);
        runs.push(StyledRun::plain(year.to_string()));
    }
    if let Some(volume) = non_empty(metadata.volume.as_deref()) {
        push_comma(&mut runs);
        runs.push(StyledRun::bold(volume));
    }
    if let Some(pages) = non_empty(metadata.pages.as_deref()) {
        push_comma(&mut runs);
        runs.push(StyledRun::plain(format_pages(&pages, PageRangeFormat::FirstOnly)));
    } else if let Some(art) = non_empty(metadata.article_number.as_deref()) {
        push_comma(&mut runs);
        runs.push(StyledRun::plain(art));
    }
    runs.push(StyledRun::separator("."));
    runs
}

/// `Authors. Title. Journal. Year;Vol(Issue):Pages. doi:ID` with
/// compressed page ranges and no hyperlink on the identifier.
pub fn render_cta(
    metadata: &ResolvedMetadata,
    config: &StyleConfig,
    abbreviator: &JournalAbbreviator,
) -> Vec<StyledRun> {
    let mut runs = Vec::new();

    if !metadata.authors.is_empty() {
        runs.push(StyledRun::plain(format_author_list(
            &metadata.authors,
            AuthorNameFormat::FamilyFirstPlain,
            ", ",
            config.et_al_cutoff,
            AuthorJoiner::Separator,
        )));
        runs.push(StyledRun::separator(". "));
    }
    runs.push(StyledRun::plain(metadata.title.trim().to_string()));
    runs.push(StyledRun::separator(". "));

    if let Some(journal) = non_empty(metadata.journal.as_deref()) {
        runs.push(StyledRun::plain(
            abbreviator.abbreviate(&journal, JournalStyle::AbbreviatedNoDots),
        ));
        runs.push(StyledRun::separator(". "));
    }

    // `Year;Vol(Issue):Pages`, each separator emitted only behind content
    let mut tail = String::new();
    if let Some(year) = metadata.year {
        tail.push_str(&year.to_string());
    }
    if let Some(volume) = non_empty(metadata.volume.as_deref()) {
        if !tail.is_empty() {
            tail.push(';');
        }
        tail.push_str(&volume);
        if let Some(issue) = non_empty(metadata.issue.as_deref()) {
            tail.push_str(&format!("({issue})"));
        }
    }
    let pagination = non_empty(metadata.pages.as_deref())
        .map(|p| format_pages(&p, PageRangeFormat::Compressed))
        .or_else(|| non_empty(metadata.article_number.as_deref()));
    if let Some(pagination) = pagination {
        if !tail.is_empty() {
            tail.push(':');
        }
        tail.push_str(&pagination);
    }
    if !tail.is_empty() {
        runs.push(StyledRun::plain(tail));
        runs.push(StyledRun::separator(". "));
    }

    runs.push(StyledRun::plain(format!("doi:{}", metadata.doi)));
    runs
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

fn push_comma(runs: &mut Vec<StyledRun>) {
    if !runs.is_empty() {
        runs.push(StyledRun::separator(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Author;

    fn record() -> ResolvedMetadata {
        ResolvedMetadata {
            doi: "10.1021/acs.jctc.9b01234".into(),
            title: "Playing Atari with Deep Reinforcement Learning".into(),
            authors: vec![
                Author::new(Some("Volodymyr"), "Mnih"),
                Author::new(Some("Koray"), "Kavukcuoglu"),
            ],
            journal: Some("Journal of Chemical Physics".into()),
            year: Some(2020),
            volume: Some("152".into()),
            issue: Some("4".into()),
            pages: Some("122-128".into()),
            article_number: None,
        }
    }

    fn text(runs: &[StyledRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn gost_layout() {
        let runs = render_gost(&record(), &StyleConfig::default(), false);
        assert_eq!(
            text(&runs),
            "Mnih V., Kavukcuoglu K. Playing Atari with Deep Reinforcement Learning \
             // Journal of Chemical Physics. \u{2013} 2020. \u{2013} Vol. 152, \u{2116} 4. \
             \u{2013} P. 122\u{2013}128. \u{2013} https://doi.org/10.1021/acs.jctc.9b01234"
        );
    }

    #[test]
    fn gost_article_number_beats_pages() {
        let mut m = record();
        m.article_number = Some("e0141".into());
        let out = text(&render_gost(&m, &StyleConfig::default(), false));
        assert!(out.contains("Art. e0141"));
        assert!(!out.contains("P. 122"));
    }

    #[test]
    fn gost_marks_missing_pagination() {
        let mut m = record();
        m.pages = None;
        let out = text(&render_gost(&m, &StyleConfig::default(), false));
        assert!(out.contains("no pagination"));
    }

    #[test]
    fn gost_links_the_doi_only_in_preview() {
        let preview = render_gost(&record(), &StyleConfig::default(), true);
        assert!(preview.last().unwrap().link.is_some());
        let document = render_gost(&record(), &StyleConfig::default(), false);
        assert!(document.last().unwrap().link.is_none());
    }

    #[test]
    fn acs_layout_and_styling() {
        let runs = render_acs(
            &record(),
            &StyleConfig::default(),
            &JournalAbbreviator::default(),
            false,
        );
        assert_eq!(
            text(&runs),
            "Mnih, V.; Kavukcuoglu, K. Playing Atari with Deep Reinforcement Learning. \
             J. Chem. Phys. 2020, 152, 122\u{2013}128. \
             https://doi.org/10.1021/acs.jctc.9b01234"
        );
        let journal = runs.iter().find(|r| r.text == "J. Chem. Phys.").unwrap();
        assert!(journal.italic);
        let year = runs.iter().find(|r| r.text == "2020").unwrap();
        assert!(year.bold);
    }

    #[test]
    fn rsc_keeps_first_page_and_omits_doi() {
        let runs = render_rsc(
            &record(),
            &StyleConfig::default(),
            &JournalAbbreviator::default(),
        );
        let out = text(&runs);
        assert_eq!(
            out,
            "V. Mnih and K. Kavukcuoglu, J. Chem. Phys., 2020, 152, 122."
        );
        assert!(!out.contains("doi"));
    }

    #[test]
    fn cta_tail_never_starts_with_a_separator() {
        let mut m = record();
        m.year = None;
        let out = text(&render_cta(&m, &StyleConfig::default(), &JournalAbbreviator::default()));
        assert!(out.contains("152(4):122\u{2013}8"));
        assert!(!out.contains(";152"));

        m.volume = None;
        m.issue = None;
        let out = text(&render_cta(&m, &StyleConfig::default(), &JournalAbbreviator::default()));
        assert!(out.contains(". 122\u{2013}8."));
        assert!(!out.contains(":122"));
    }

    #[test]
    fn cta_layout() {
        let runs = render_cta(
            &record(),
            &StyleConfig::default(),
            &JournalAbbreviator::default(),
        );
        assert_eq!(
            text(&runs),
            "Mnih V, Kavukcuoglu K. Playing Atari with Deep Reinforcement Learning. \
             J Chem Phys. 2020;152(4):122\u{2013}8. doi:10.1021/acs.jctc.9b01234"
        );
    }
}

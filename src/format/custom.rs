//! User-configurable reference layout: an ordered element pipeline
//! where each element carries its own trailing separator and styling.

use crate::format::shared::{
    format_author_list, format_doi, pages_or_article_number, JournalAbbreviator,
};
use crate::format::style::{ElementConfig, ElementKind, StyleConfig};
use crate::format::StyledRun;
use crate::types::ResolvedMetadata;

/// Render a record through the element pipeline. Elements whose value is
/// missing from the record are skipped entirely, and the separator
/// between two emitted elements is always the earlier element's; the
/// final emitted element's separator is dropped.
pub fn render(
    metadata: &ResolvedMetadata,
    elements: &[ElementConfig],
    config: &StyleConfig,
    abbreviator: &JournalAbbreviator,
    for_preview: bool,
) -> Vec<StyledRun> {
    let emitted: Vec<(&ElementConfig, String)> = elements
        .iter()
        .filter_map(|e| element_value(metadata, e.kind, config, abbreviator).map(|v| (e, v)))
        .collect();

    let mut runs = Vec::with_capacity(emitted.len() * 2);
    let last = emitted.len().saturating_sub(1);
    for (i, (element, value)) in emitted.iter().enumerate() {
        let mut text = value.clone();
        if element.style.parenthesize {
            text = format!("({text})");
        }

        let mut run = StyledRun::plain(text);
        run.italic = element.style.italic;
        run.bold = element.style.bold;
        if element.kind == ElementKind::Doi && config.doi_hyperlink && for_preview {
            run.link = Some(format!("https://doi.org/{}", metadata.doi));
        }
        let ends_with_period = run.text.ends_with('.');
        runs.push(run);

        if i < last {
            let mut separator = element.style.separator.clone();
            // avoid ".." where an abbreviated value already ends in a dot
            if ends_with_period && separator.starts_with('.') {
                separator.remove(0);
            }
            if !separator.is_empty() {
                runs.push(StyledRun::separator(separator));
            }
        } else if config.final_punctuation && !ends_with_period {
            runs.push(StyledRun::separator("."));
        }
    }
    runs
}

fn element_value(
    metadata: &ResolvedMetadata,
    kind: ElementKind,
    config: &StyleConfig,
    abbreviator: &JournalAbbreviator,
) -> Option<String> {
    match kind {
        ElementKind::Authors => {
            if metadata.authors.is_empty() {
                return None;
            }
            Some(format_author_list(
                &metadata.authors,
                config.author_format,
                ", ",
                config.et_al_cutoff,
                config.author_joiner,
            ))
        }
        ElementKind::Title => non_empty(&metadata.title),
        ElementKind::Journal => metadata
            .journal
            .as_deref()
            .map(|j| abbreviator.abbreviate(j, config.journal_style))
            .filter(|j| !j.is_empty()),
        ElementKind::Year => metadata.year.map(|y| y.to_string()),
        ElementKind::Volume => metadata.volume.as_deref().and_then(non_empty),
        ElementKind::Issue => metadata.issue.as_deref().and_then(non_empty),
        ElementKind::Pages => pages_or_article_number(
            metadata.pages.as_deref(),
            metadata.article_number.as_deref(),
            config.page_format,
        ),
        ElementKind::Doi => Some(format_doi(&metadata.doi, config.doi_format)),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::style::{AuthorNameFormat, StyleConfig, StyleVariant};
    use crate::types::Author;

    fn record() -> ResolvedMetadata {
        ResolvedMetadata {
            doi: "10.1000/xyz".into(),
            title: "A Study".into(),
            authors: vec![Author::new(Some("John Adam"), "Smith")],
            journal: None,
            year: Some(2020),
            volume: None,
            issue: None,
            pages: None,
            article_number: None,
        }
    }

    fn pipeline() -> Vec<ElementConfig> {
        vec![
            ElementConfig::new(ElementKind::Authors, ", "),
            ElementConfig::new(ElementKind::Title, ". "),
            ElementConfig::new(ElementKind::Journal, ". "),
            ElementConfig::new(ElementKind::Year, ". "),
        ]
    }

    fn text(runs: &[StyledRun]) -> String {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn missing_elements_are_skipped_with_their_separators() {
        let mut config = StyleConfig {
            variant: StyleVariant::Custom(pipeline()),
            author_format: AuthorNameFormat::FamilyCommaInitials,
            ..StyleConfig::default()
        };
        config.final_punctuation = false;
        let runs = render(
            &record(),
            &pipeline(),
            &config,
            &JournalAbbreviator::default(),
            false,
        );
        assert_eq!(text(&runs), "Smith, J.A., A Study. 2020");
    }

    #[test]
    fn final_punctuation_appends_a_single_period() {
        let mut config = StyleConfig::default();
        config.final_punctuation = true;
        config.author_format = AuthorNameFormat::FamilyCommaInitials;
        let runs = render(
            &record(),
            &pipeline(),
            &config,
            &JournalAbbreviator::default(),
            false,
        );
        assert_eq!(text(&runs), "Smith, J.A., A Study. 2020.");

        // a value already ending in a dot absorbs the final period
        let only_authors = vec![ElementConfig::new(ElementKind::Authors, ", ")];
        let runs = render(
            &record(),
            &only_authors,
            &config,
            &JournalAbbreviator::default(),
            false,
        );
        assert_eq!(text(&runs), "Smith, J.A.");
    }

    #[test]
    fn dotted_value_collapses_a_dot_separator() {
        let mut config = StyleConfig::default();
        config.author_format = AuthorNameFormat::FamilyCommaInitials;
        config.final_punctuation = false;
        let elements = vec![
            ElementConfig::new(ElementKind::Authors, ". "),
            ElementConfig::new(ElementKind::Year, ""),
        ];
        let runs = render(
            &record(),
            &elements,
            &config,
            &JournalAbbreviator::default(),
            false,
        );
        assert_eq!(text(&runs), "Smith, J.A. 2020");
    }

    #[test]
    fn doi_run_is_linked_only_in_preview() {
        let mut config = StyleConfig::default();
        config.doi_hyperlink = true;
        let elements = vec![ElementConfig::new(ElementKind::Doi, "")];
        let preview = render(
            &record(),
            &elements,
            &config,
            &JournalAbbreviator::default(),
            true,
        );
        assert_eq!(
            preview[0].link.as_deref(),
            Some("https://doi.org/10.1000/xyz")
        );
        let document = render(
            &record(),
            &elements,
            &config,
            &JournalAbbreviator::default(),
            false,
        );
        assert_eq!(document[0].link, None);
    }

    #[test]
    fn parenthesized_element() {
        let mut config = StyleConfig::default();
        config.final_punctuation = false;
        let mut year = ElementConfig::new(ElementKind::Year, "");
        year.style.parenthesize = true;
        let runs = render(
            &record(),
            &[year],
            &config,
            &JournalAbbreviator::default(),
            false,
        );
        assert_eq!(text(&runs), "(2020)");
    }
}

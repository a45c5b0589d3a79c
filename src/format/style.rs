use serde::{Deserialize, Serialize};

use crate::error::{ReciteError, Result};

/// Which citation element a pipeline slot renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Authors,
    Title,
    Journal,
    Year,
    Volume,
    Issue,
    Pages,
    Doi,
}

/// Presentation flags for one custom-pipeline element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementStyle {
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub parenthesize: bool,
    /// Text emitted after this element when a later element follows.
    #[serde(default)]
    pub separator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub kind: ElementKind,
    #[serde(default)]
    pub style: ElementStyle,
}

impl ElementConfig {
    pub fn new(kind: ElementKind, separator: &str) -> Self {
        Self {
            kind,
            style: ElementStyle {
                separator: separator.to_string(),
                ..ElementStyle::default()
            },
        }
    }
}

/// How one author's name is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorNameFormat {
    /// `AA Smith`
    InitialsFirstPlain,
    /// `A.A. Smith`
    InitialsFirstDotted,
    /// `Smith AA`
    FamilyFirstPlain,
    /// `Smith A.A`
    FamilyFirstDotted,
    /// `Smith, A.A.`
    #[default]
    FamilyCommaInitials,
}

/// How a stored page range is rendered. Hyphen-free page strings pass
/// through unchanged under every style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRangeFormat {
    /// `122 - 128`
    HyphenSpaced,
    /// `122-128`
    #[default]
    Hyphen,
    /// `122 – 128`
    EnDashSpaced,
    /// `122–128`
    EnDash,
    /// `122–8` (longest common leading digits stripped from the end page)
    Compressed,
    /// `122`
    FirstOnly,
}

/// How the DOI element is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoiFormat {
    /// `10.1000/xyz`
    Plain,
    /// `doi:10.1000/xyz`
    #[default]
    Prefixed,
    /// `https://doi.org/10.1000/xyz`
    Url,
    /// `doi.org/10.1000/xyz`
    BareUrl,
}

/// Journal name rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalStyle {
    /// Abbreviations with full stops: `Phys. Rev. Lett.`
    #[default]
    Abbreviated,
    /// Abbreviations with stops stripped: `Phys Rev Lett`
    AbbreviatedNoDots,
    /// The unabbreviated name.
    Full,
}

/// Prefix applied to each reference in list output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingStyle {
    #[default]
    None,
    /// `1.`
    Dot,
    /// `1)`
    Paren,
    /// `[1]`
    Brackets,
    /// `[1].`
    BracketsDot,
    /// `1`
    Plain,
}

impl NumberingStyle {
    pub fn prefix(self, index: usize) -> Option<String> {
        let n = index + 1;
        match self {
            NumberingStyle::None => None,
            NumberingStyle::Dot => Some(format!("{n}. ")),
            NumberingStyle::Paren => Some(format!("{n}) ")),
            NumberingStyle::Brackets => Some(format!("[{n}] ")),
            NumberingStyle::BracketsDot => Some(format!("[{n}]. ")),
            NumberingStyle::Plain => Some(format!("{n} ")),
        }
    }
}

/// How a multi-author list is joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorJoiner {
    /// Separator-joined with the et-al cutoff applied.
    #[default]
    Separator,
    /// Full list, "and" before the last author; cutoff disabled.
    And,
    /// Full list, "&" before the last author; cutoff disabled.
    Ampersand,
}

/// The selected citation style: one of the built-in variants or a fully
/// user-configured element pipeline. A tagged enum keeps the variants
/// mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", content = "elements", rename_all = "snake_case")]
pub enum StyleVariant {
    Custom(Vec<ElementConfig>),
    Gost,
    Acs,
    Rsc,
    Cta,
}

/// Complete formatting configuration supplied by the caller, persisted as
/// a JSON document by the hosting UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub variant: StyleVariant,
    #[serde(default)]
    pub author_format: AuthorNameFormat,
    #[serde(default)]
    pub page_format: PageRangeFormat,
    #[serde(default)]
    pub doi_format: DoiFormat,
    #[serde(default)]
    pub journal_style: JournalStyle,
    #[serde(default)]
    pub numbering: NumberingStyle,
    #[serde(default)]
    pub author_joiner: AuthorJoiner,
    #[serde(default = "default_et_al_cutoff")]
    pub et_al_cutoff: usize,
    #[serde(default)]
    pub final_punctuation: bool,
    /// Render the DOI element as a hyperlink (custom pipeline only).
    #[serde(default)]
    pub doi_hyperlink: bool,
}

fn default_et_al_cutoff() -> usize {
    3
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            variant: StyleVariant::Gost,
            author_format: AuthorNameFormat::default(),
            page_format: PageRangeFormat::default(),
            doi_format: DoiFormat::default(),
            journal_style: JournalStyle::default(),
            numbering: NumberingStyle::default(),
            author_joiner: AuthorJoiner::default(),
            et_al_cutoff: default_et_al_cutoff(),
            final_punctuation: false,
            doi_hyperlink: false,
        }
    }
}

impl StyleConfig {
    pub fn custom(elements: Vec<ElementConfig>) -> Self {
        Self {
            variant: StyleVariant::Custom(elements),
            ..Self::default()
        }
    }

    /// Blocking validation run before any processing starts.
    pub fn validate(&self) -> Result<()> {
        if let StyleVariant::Custom(elements) = &self.variant
            && elements.is_empty()
        {
            return Err(ReciteError::InvalidStyle(
                "custom style selected but the element list is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_without_elements_fails_validation() {
        let config = StyleConfig::custom(Vec::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn builtin_variants_validate() {
        for variant in [
            StyleVariant::Gost,
            StyleVariant::Acs,
            StyleVariant::Rsc,
            StyleVariant::Cta,
        ] {
            let config = StyleConfig {
                variant,
                ..StyleConfig::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = StyleConfig {
            variant: StyleVariant::Custom(vec![
                ElementConfig::new(ElementKind::Authors, ", "),
                ElementConfig::new(ElementKind::Title, ". "),
            ]),
            page_format: PageRangeFormat::Compressed,
            et_al_cutoff: 6,
            ..StyleConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: StyleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn numbering_prefixes() {
        assert_eq!(NumberingStyle::None.prefix(0), None);
        assert_eq!(NumberingStyle::Dot.prefix(0).unwrap(), "1. ");
        assert_eq!(NumberingStyle::Brackets.prefix(4).unwrap(), "[5] ");
    }
}

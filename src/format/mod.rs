//! Citation rendering: a style value object plus built-in and
//! user-configurable renderers producing styled text runs.

pub mod custom;
pub mod shared;
pub mod style;
mod variants;

use serde::{Deserialize, Serialize};

use crate::config::Locale;
use crate::error::Result;
use crate::format::shared::JournalAbbreviator;
use crate::format::style::{StyleConfig, StyleVariant};
use crate::types::ResolvedMetadata;

/// One stretch of output text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub bold: bool,
    /// Separator runs are distinguishable so callers can restyle or
    /// strip punctuation without reparsing.
    #[serde(default)]
    pub is_separator: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: false,
            bold: false,
            is_separator: false,
            link: None,
        }
    }

    pub fn separator(text: impl Into<String>) -> Self {
        Self {
            is_separator: true,
            ..Self::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    pub fn linked(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            ..Self::plain(text)
        }
    }
}

/// A fully rendered reference, or a marker that the source line could
/// not be resolved and should be kept verbatim by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedReference {
    pub runs: Vec<StyledRun>,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResolvedMetadata>,
}

impl FormattedReference {
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Renders one resolved record under the configured style. `for_preview`
/// attaches hyperlinks to DOI runs when the style allows them; plain
/// document output leaves them as text.
pub struct ReferenceFormatter {
    style: StyleConfig,
    abbreviator: JournalAbbreviator,
}

impl ReferenceFormatter {
    pub fn new(style: StyleConfig) -> Result<Self> {
        style.validate()?;
        Ok(Self {
            style,
            abbreviator: JournalAbbreviator::default(),
        })
    }

    pub fn with_abbreviator(style: StyleConfig, abbreviator: JournalAbbreviator) -> Result<Self> {
        style.validate()?;
        Ok(Self { style, abbreviator })
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn format(&self, metadata: &ResolvedMetadata, for_preview: bool) -> FormattedReference {
        let runs = match &self.style.variant {
            StyleVariant::Custom(elements) => custom::render(
                metadata,
                elements,
                &self.style,
                &self.abbreviator,
                for_preview,
            ),
            StyleVariant::Gost => variants::render_gost(metadata, &self.style, for_preview),
            StyleVariant::Acs => {
                variants::render_acs(metadata, &self.style, &self.abbreviator, for_preview)
            }
            StyleVariant::Rsc => {
                variants::render_rsc(metadata, &self.style, &self.abbreviator)
            }
            StyleVariant::Cta => {
                variants::render_cta(metadata, &self.style, &self.abbreviator)
            }
        };
        FormattedReference {
            runs,
            failed: false,
            metadata: Some(metadata.clone()),
        }
    }

    /// Error rendering for a reference whose metadata is absent: a single
    /// locale-appropriate error run, marked failed.
    pub fn format_missing(&self, locale: Locale) -> FormattedReference {
        FormattedReference {
            runs: vec![StyledRun::plain(locale.missing_metadata())],
            failed: true,
            metadata: None,
        }
    }
}

//! The processing orchestrator: one pass over a list of raw reference
//! lines producing formatted citations, a plain identifier list, run
//! counts, and duplicate markers.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::MetadataCache;
use crate::config::EngineConfig;
use crate::dedup::{find_duplicates, DedupOptions, DuplicateMap};
use crate::error::Result;
use crate::format::{FormattedReference, ReferenceFormatter, StyledRun};
use crate::format::style::StyleConfig;
use crate::identifiers::Doi;
use crate::references::{is_section_header, IdentifierExtractor};
use crate::resolver::{BatchResolver, ProgressCallback};
use crate::sources::{CrossrefProvider, MetadataProvider};
use crate::types::ResolvedMetadata;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub total: usize,
    pub resolved: usize,
    pub failed: usize,
    pub headers: usize,
}

/// Everything one processing run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// One entry per input line, in input order.
    pub references: Vec<FormattedReference>,
    /// One line per input reference: the resolved identifier, the header
    /// line verbatim, or a locale-appropriate manual-check message.
    pub identifier_lines: Vec<String>,
    pub counts: RunCounts,
    pub duplicates: DuplicateMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Attach hyperlinks to identifier runs where the style allows them.
    pub for_preview: bool,
    pub dedup: DedupOptions,
}

enum Line {
    Header,
    Candidate(Option<Doi>),
}

pub struct ReferenceProcessor {
    config: EngineConfig,
    extractor: IdentifierExtractor,
    resolver: BatchResolver,
}

impl ReferenceProcessor {
    pub fn new(config: EngineConfig) -> Self {
        let provider: Arc<dyn MetadataProvider> =
            Arc::new(CrossrefProvider::new(config.polite_pool_email.clone()));
        Self::with_provider(provider, config)
    }

    /// Build against an arbitrary provider. The cache honors
    /// `config.cache_dir` when set.
    pub fn with_provider(provider: Arc<dyn MetadataProvider>, config: EngineConfig) -> Self {
        let cache = Arc::new(match &config.cache_dir {
            Some(dir) => MetadataCache::at(dir.clone(), config.cache_ttl()),
            None => MetadataCache::new(config.cache_ttl()),
        });
        Self {
            extractor: IdentifierExtractor::new(Arc::clone(&provider)),
            resolver: BatchResolver::new(provider, cache, &config),
            config,
        }
    }

    /// Run the whole pipeline over `lines`. Style validation is the only
    /// blocking failure; per-reference failures are folded into the
    /// outcome and never abort the run.
    pub async fn process(
        &self,
        lines: &[String],
        style: &StyleConfig,
        options: RunOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<RunOutcome> {
        let formatter = ReferenceFormatter::new(style.clone())?;
        let locale = self.config.locale;

        let mut classified = Vec::with_capacity(lines.len());
        for line in lines {
            let line = line.trim();
            if line.is_empty() || is_section_header(line) {
                classified.push(Line::Header);
            } else {
                classified.push(Line::Candidate(self.extractor.extract(line).await));
            }
        }

        let dois: Vec<Doi> = classified
            .iter()
            .filter_map(|l| match l {
                Line::Candidate(Some(doi)) => Some(doi.clone()),
                _ => None,
            })
            .collect();
        debug!(lines = lines.len(), identifiers = dois.len(), "resolving batch");
        let resolved = self.resolver.resolve_batch(&dois, progress).await;

        let mut counts = RunCounts {
            total: lines.len(),
            ..RunCounts::default()
        };
        let mut references = Vec::with_capacity(lines.len());
        let mut identifier_lines = Vec::with_capacity(lines.len());
        let mut numbered = 0usize;

        for (line, kind) in lines.iter().zip(&classified) {
            match kind {
                Line::Header => {
                    counts.headers += 1;
                    identifier_lines.push(line.trim().to_string());
                    references.push(FormattedReference {
                        runs: vec![StyledRun::plain(line.trim())],
                        failed: false,
                        metadata: None,
                    });
                }
                Line::Candidate(doi) => {
                    let metadata = doi
                        .as_ref()
                        .and_then(|d| resolved.get(&d.normalized));
                    match metadata {
                        Some(metadata) => {
                            counts.resolved += 1;
                            numbered += 1;
                            identifier_lines.push(metadata.doi.clone());
                            references.push(numbered_entry(
                                &formatter,
                                metadata,
                                numbered,
                                style,
                                options.for_preview,
                            ));
                        }
                        None => {
                            counts.failed += 1;
                            numbered += 1;
                            let text = failure_text(line.trim(), locale);
                            identifier_lines.push(text.clone());
                            references.push(FormattedReference {
                                runs: vec![StyledRun::plain(text)],
                                failed: true,
                                metadata: None,
                            });
                        }
                    }
                }
            }
        }

        let duplicates = find_duplicates(&references, options.dedup);
        info!(
            total = counts.total,
            resolved = counts.resolved,
            failed = counts.failed,
            headers = counts.headers,
            duplicates = duplicates.len(),
            "run complete"
        );
        Ok(RunOutcome {
            references,
            identifier_lines,
            counts,
            duplicates,
        })
    }

    /// Re-render previously resolved results under a different style
    /// without touching the network or the cache.
    pub fn reformat(
        &self,
        results: &[FormattedReference],
        style: &StyleConfig,
        options: RunOptions,
    ) -> Result<Vec<FormattedReference>> {
        let formatter = ReferenceFormatter::new(style.clone())?;
        let mut out = Vec::with_capacity(results.len());
        let mut numbered = 0usize;
        for entry in results {
            match (&entry.metadata, entry.failed) {
                (Some(metadata), false) => {
                    numbered += 1;
                    out.push(numbered_entry(
                        &formatter,
                        metadata,
                        numbered,
                        style,
                        options.for_preview,
                    ));
                }
                _ => {
                    if entry.failed {
                        numbered += 1;
                    }
                    out.push(entry.clone());
                }
            }
        }
        Ok(out)
    }

    pub async fn evict_expired_cache_entries(&self) {
        self.resolver.cache().evict_expired().await;
    }

    /// Resolve a plain identifier list, bypassing extraction entirely.
    pub async fn resolve_identifiers(
        &self,
        dois: &[Doi],
        progress: Option<ProgressCallback>,
    ) -> HashMap<String, ResolvedMetadata> {
        self.resolver.resolve_batch(dois, progress).await
    }
}

fn numbered_entry(
    formatter: &ReferenceFormatter,
    metadata: &ResolvedMetadata,
    number: usize,
    style: &StyleConfig,
    for_preview: bool,
) -> FormattedReference {
    let mut entry = formatter.format(metadata, for_preview);
    if let Some(prefix) = style.numbering.prefix(number - 1) {
        entry.runs.insert(0, StyledRun::plain(prefix));
    }
    entry
}

fn failure_text(line: &str, locale: crate::config::Locale) -> String {
    format!("{line} {}", locale.manual_check_suffix())
}

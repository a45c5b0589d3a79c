//! Identifier resolution and citation formatting.
//!
//! Turns raw bibliographic reference lines into normalized citations:
//! DOI extraction with a bibliographic fallback, a TTL metadata cache
//! over Crossref, a two-pass concurrent batch resolver, pluggable
//! citation-style renderers (GOST, ACS, RSC, CTA, or a fully
//! configurable element pipeline), and duplicate detection.
//!
//! [`pipeline::ReferenceProcessor`] composes the whole flow; the
//! individual pieces are usable on their own.

pub mod cache;
pub mod config;
pub mod dedup;
pub mod error;
pub mod format;
pub mod http;
pub mod identifiers;
pub mod pipeline;
pub mod references;
pub mod resolver;
pub mod sources;
pub mod types;

pub use cache::MetadataCache;
pub use config::{EngineConfig, Locale};
pub use dedup::{find_duplicates, DedupOptions, DuplicateMap};
pub use error::{ReciteError, Result};
pub use format::style::{ElementConfig, ElementKind, ElementStyle, StyleConfig, StyleVariant};
pub use format::{FormattedReference, ReferenceFormatter, StyledRun};
pub use identifiers::Doi;
pub use pipeline::{ReferenceProcessor, RunCounts, RunOptions, RunOutcome};
pub use references::{extract_explicit, is_section_header, IdentifierExtractor};
pub use resolver::{BatchResolver, ProgressCallback, ResolveProgress};
pub use sources::{CrossrefProvider, MetadataProvider};
pub use types::{Author, ResolvedMetadata};

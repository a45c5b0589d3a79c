//! Duplicate detection over one run's formatted results, keyed by a
//! canonical hash of the bibliographic fields.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::format::FormattedReference;
use crate::types::ResolvedMetadata;

/// Maps the index of each later duplicate to the index of its first
/// occurrence.
pub type DuplicateMap = HashMap<usize, usize>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DedupOptions {
    /// Whether the normalized identifier participates in the canonical
    /// hash. With it, two records differing only by DOI are distinct;
    /// without it, matching bibliographic fields alone flag a duplicate.
    pub include_identifier: bool,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            include_identifier: true,
        }
    }
}

const FIELD_SEPARATOR: &str = "\u{1f}";

pub fn canonical_hash(metadata: &ResolvedMetadata, options: DedupOptions) -> u64 {
    let mut families: Vec<String> = metadata
        .authors
        .iter()
        .map(|a| a.family.to_lowercase())
        .collect();
    families.sort();

    let title: String = metadata.title.to_lowercase().chars().take(50).collect();

    let mut fields = vec![
        families.join("|"),
        title,
        metadata
            .journal
            .as_deref()
            .unwrap_or_default()
            .to_lowercase(),
        metadata.year.map(|y| y.to_string()).unwrap_or_default(),
        metadata.volume.clone().unwrap_or_default(),
        metadata.pages.clone().unwrap_or_default(),
    ];
    if options.include_identifier {
        fields.push(metadata.doi.clone());
    }

    let mut hasher = DefaultHasher::new();
    fields.join(FIELD_SEPARATOR).hash(&mut hasher);
    hasher.finish()
}

/// Scan results in order; the first occurrence of each hash is the
/// canonical entry, every later occurrence points back at it. Failed
/// entries and entries without metadata never participate.
pub fn find_duplicates(results: &[FormattedReference], options: DedupOptions) -> DuplicateMap {
    let mut seen: HashMap<u64, usize> = HashMap::new();
    let mut duplicates = DuplicateMap::new();
    for (index, result) in results.iter().enumerate() {
        if result.failed {
            continue;
        }
        let Some(metadata) = &result.metadata else {
            continue;
        };
        let hash = canonical_hash(metadata, options);
        match seen.get(&hash) {
            Some(&first) => {
                duplicates.insert(index, first);
            }
            None => {
                seen.insert(hash, index);
            }
        }
    }
    duplicates
}

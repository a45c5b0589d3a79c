use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::identifiers::Doi;
use crate::sources::MetadataProvider;

static URL_DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://(?:dx\.)?doi\.org/(10\.\d{4,9}/[^\s"'<>]+)"#)
        .expect("valid url doi regex")
});

static PREFIXED_DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bdoi:\s*(10\.\d{4,9}/[^\s"'<>]+)"#).expect("valid prefixed doi regex")
});

static BARE_DOI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b10\.\d{4,9}/[-._;()/:a-zA-Z0-9]+").expect("valid bare doi regex")
});

/// Shortest reference text worth sending as a bibliographic query;
/// anything shorter matches too many unrelated works.
const MIN_QUERY_LEN: usize = 30;

/// Discovers a DOI for one raw reference line by running ordered lookup
/// strategies: explicit pattern match, then a fuzzy bibliographic query,
/// then a reserved alternate-provider hook. The first hit wins and later,
/// more expensive strategies are skipped.
pub struct IdentifierExtractor {
    provider: Arc<dyn MetadataProvider>,
}

impl IdentifierExtractor {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    pub async fn extract(&self, line: &str) -> Option<Doi> {
        if let Some(doi) = extract_explicit(line) {
            return Some(doi);
        }
        if let Some(doi) = self.lookup_bibliographic(line).await {
            return Some(doi);
        }
        self.lookup_alternate(line)
    }

    /// Strategy 2: free-text match against the provider. Provider errors
    /// are logged and treated as "no match".
    async fn lookup_bibliographic(&self, line: &str) -> Option<Doi> {
        let query = strip_identifier_text(line);
        if query.chars().count() < MIN_QUERY_LEN {
            return None;
        }
        match self.provider.by_bibliographic_query(&query).await {
            Ok(Some(meta)) => Doi::parse(&meta.doi).ok(),
            Ok(None) => None,
            Err(e) => {
                debug!(query = %truncate(&query, 60), error = %e, "bibliographic lookup failed");
                None
            }
        }
    }

    /// Strategy 3: reserved extension point for an alternate discovery
    /// provider (e.g. DataCite). Not wired up yet.
    fn lookup_alternate(&self, _line: &str) -> Option<Doi> {
        None
    }
}

/// Strategy 1: scan for an embedded identifier. Pattern order is fixed:
/// URL form, `doi:` prefix, bare DOI grammar. A whole line that parses as
/// an (optionally prefixed) DOI is accepted as a fast path.
pub fn extract_explicit(line: &str) -> Option<Doi> {
    if let Ok(doi) = Doi::parse(line) {
        return Some(doi);
    }
    for re in [&*URL_DOI_RE, &*PREFIXED_DOI_RE] {
        if let Some(cap) = re.captures(line)
            && let Ok(doi) = Doi::parse(&cap[1])
        {
            return Some(doi);
        }
    }
    BARE_DOI_RE
        .find(line)
        .and_then(|m| Doi::parse(m.as_str()).ok())
}

/// Remove embedded identifier text so the remaining prose can be used as
/// a bibliographic query.
fn strip_identifier_text(line: &str) -> String {
    let mut rest = URL_DOI_RE.replace_all(line, "").into_owned();
    rest = PREFIXED_DOI_RE.replace_all(&rest, "").into_owned();
    rest = BARE_DOI_RE.replace_all(&rest, "").into_owned();
    rest.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

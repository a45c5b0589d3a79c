use serde::{Deserialize, Serialize};

use crate::error::{ReciteError, Result};

/// A parsed, normalized Digital Object Identifier.
///
/// Two DOIs are equal iff their normalized forms are equal; normalization
/// is idempotent, case-insensitive and prefix-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doi {
    pub raw: String,
    pub normalized: String,
    pub url: String,
}

impl PartialEq for Doi {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Doi {}

impl std::hash::Hash for Doi {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl std::fmt::Display for Doi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = strip_prefixes(input);

        // Validate: must start with "10.", contain "/", and have a non-empty suffix
        if !stripped.starts_with("10.") {
            return Err(ReciteError::InvalidDoi(input.to_string()));
        }
        let slash_pos = stripped
            .find('/')
            .ok_or_else(|| ReciteError::InvalidDoi(input.to_string()))?;
        let registrant = &stripped[3..slash_pos];
        if registrant.is_empty() || !registrant.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(ReciteError::InvalidDoi(input.to_string()));
        }
        let suffix = &stripped[slash_pos + 1..];
        if suffix.is_empty() || suffix.chars().any(char::is_whitespace) {
            return Err(ReciteError::InvalidDoi(input.to_string()));
        }

        let normalized = trim_trailing_punctuation(&stripped.to_lowercase());
        if normalized[normalized.find('/').unwrap_or(0) + 1..].is_empty() {
            return Err(ReciteError::InvalidDoi(input.to_string()));
        }
        let url = format!("https://doi.org/{normalized}");

        Ok(Self {
            raw: input.to_string(),
            normalized,
            url,
        })
    }
}

fn strip_prefixes(input: &str) -> &str {
    let lowered = input.to_lowercase();
    for prefix in [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi.org/",
        "doi:",
    ] {
        if lowered.starts_with(prefix) {
            return input[prefix.len()..].trim_start();
        }
    }
    input
}

/// Trailing sentence punctuation is never part of a DOI captured from prose.
fn trim_trailing_punctuation(doi: &str) -> String {
    doi.trim_end_matches(['.', ',', ';', ':', ')', ']']).to_string()
}

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Output language for user-facing strings produced by the engine
/// (manual-check suffixes, missing-metadata messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn manual_check_suffix(self) -> &'static str {
        match self {
            Locale::En => "— DOI not found, check this reference manually",
            Locale::Ru => "— DOI не найден, проверьте ссылку вручную",
        }
    }

    pub fn missing_metadata(self) -> &'static str {
        match self {
            Locale::En => "metadata could not be retrieved for this reference",
            Locale::Ru => "не удалось получить метаданные для этой ссылки",
        }
    }
}

/// Engine-wide settings supplied by the hosting application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Email for the Crossref polite pool; absent means the anonymous pool.
    pub polite_pool_email: Option<String>,
    /// Override for the on-disk cache location (tests, portable installs).
    pub cache_dir: Option<PathBuf>,
    /// Cache entry lifetime measured from last access.
    pub cache_ttl_secs: u64,
    /// Per-request timeout for provider fetches.
    pub request_timeout_secs: u64,
    /// Worker count for the first resolution pass.
    pub concurrency: usize,
    /// Worker count for the retry pass; gentler to ride out throttling.
    pub retry_concurrency: usize,
    pub locale: Locale,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            polite_pool_email: None,
            cache_dir: None,
            cache_ttl_secs: 7 * 24 * 3600,
            request_timeout_secs: 30,
            concurrency: 3,
            retry_concurrency: 2,
            locale: Locale::En,
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.retry_concurrency, 2);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let mut config = EngineConfig::default();
        config.polite_pool_email = Some("lib@example.org".to_string());
        config.locale = Locale::Ru;
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.polite_pool_email.as_deref(), Some("lib@example.org"));
        assert_eq!(back.locale, Locale::Ru);
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::StreamExt;
use tracing::{debug, warn};

use crate::cache::MetadataCache;
use crate::config::EngineConfig;
use crate::error::ReciteError;
use crate::identifiers::Doi;
use crate::sources::MetadataProvider;
use crate::types::ResolvedMetadata;

/// Snapshot passed to the progress callback after every completed unit.
#[derive(Debug, Clone)]
pub struct ResolveProgress {
    pub completed: usize,
    pub total: usize,
    pub errors: usize,
    pub elapsed: Duration,
    pub estimated_remaining: Option<Duration>,
}

pub type ProgressCallback = Arc<dyn Fn(ResolveProgress) + Send + Sync>;

struct ProgressState {
    completed: usize,
    errors: usize,
}

/// Tracks batch progress across concurrently completing workers. Updates
/// happen under one lock so callback invocations never interleave.
struct ProgressTracker {
    state: Mutex<ProgressState>,
    total: usize,
    started: Instant,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    fn new(total: usize, callback: Option<ProgressCallback>) -> Self {
        Self {
            state: Mutex::new(ProgressState {
                completed: 0,
                errors: 0,
            }),
            total,
            started: Instant::now(),
            callback,
        }
    }

    fn record(&self, first_pass: bool, succeeded: bool) {
        let snapshot = {
            let mut state = self.state.lock().expect("progress lock poisoned");
            if first_pass {
                state.completed += 1;
                if !succeeded {
                    state.errors += 1;
                }
            } else if succeeded {
                // A retry that lands erases the error it is repairing.
                state.errors = state.errors.saturating_sub(1);
            }
            let elapsed = self.started.elapsed();
            let estimated_remaining = (state.completed > 0).then(|| {
                let estimated_total =
                    elapsed.mul_f64(self.total as f64 / state.completed as f64);
                estimated_total.saturating_sub(elapsed)
            });
            ResolveProgress {
                completed: state.completed,
                total: self.total,
                errors: state.errors,
                elapsed,
                estimated_remaining,
            }
        };
        if let Some(callback) = &self.callback {
            callback(snapshot);
        }
    }
}

/// Resolves a set of identifiers to metadata through the cache and the
/// external provider, in two bounded-concurrency passes.
///
/// The first pass runs wide for throughput; identifiers that come back
/// empty are retried once in a narrower pass that rides out transient
/// provider throttling. Anything still absent after the retry pass is a
/// terminal failure for the run.
pub struct BatchResolver {
    provider: Arc<dyn MetadataProvider>,
    cache: Arc<MetadataCache>,
    timeout: Duration,
    concurrency: usize,
    retry_concurrency: usize,
}

impl BatchResolver {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<MetadataCache>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            timeout: config.request_timeout(),
            concurrency: config.concurrency.max(1),
            retry_concurrency: config.retry_concurrency.max(1),
        }
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Resolve every identifier in `dois`, returning a map keyed by
    /// normalized DOI. Results complete in arbitrary order; callers must
    /// look up by key, never by position.
    pub async fn resolve_batch(
        &self,
        dois: &[Doi],
        progress: Option<ProgressCallback>,
    ) -> HashMap<String, ResolvedMetadata> {
        let tracker = ProgressTracker::new(dois.len(), progress);
        let mut results = HashMap::new();

        let failed = self
            .run_pass(dois.to_vec(), self.concurrency, &tracker, true, &mut results)
            .await;
        if !failed.is_empty() {
            debug!(retrying = failed.len(), "starting retry pass");
            let terminal = self
                .run_pass(failed, self.retry_concurrency, &tracker, false, &mut results)
                .await;
            for doi in &terminal {
                warn!(doi = %doi.normalized, "unresolved after retry pass");
            }
        }
        results
    }

    async fn run_pass(
        &self,
        pending: Vec<Doi>,
        concurrency: usize,
        tracker: &ProgressTracker,
        first_pass: bool,
        results: &mut HashMap<String, ResolvedMetadata>,
    ) -> Vec<Doi> {
        let mut failed = Vec::new();
        let mut stream = futures::stream::iter(pending)
            .map(|doi| async move {
                let resolved = self.resolve_one(&doi).await;
                (doi, resolved)
            })
            .buffer_unordered(concurrency);

        while let Some((doi, resolved)) = stream.next().await {
            let succeeded = resolved.is_some();
            if let Some(meta) = resolved {
                results.insert(doi.normalized.clone(), meta);
            } else {
                failed.push(doi);
            }
            tracker.record(first_pass, succeeded);
        }
        failed
    }

    /// One unit of work: cache lookup, then provider fetch on a miss,
    /// then cache write on success. Timeouts and provider errors yield
    /// `None` without disturbing sibling units.
    async fn resolve_one(&self, doi: &Doi) -> Option<ResolvedMetadata> {
        if let Some(hit) = self.cache.get(&doi.normalized).await {
            return Some(hit);
        }
        let fetched = match tokio::time::timeout(self.timeout, self.provider.by_identifier(doi))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ReciteError::Timeout(doi.normalized.clone())),
        };
        match fetched {
            Ok(Some(meta)) => {
                self.cache.set(&doi.normalized, &meta).await;
                Some(meta)
            }
            Ok(None) => {
                debug!(doi = %doi.normalized, "provider has no record");
                None
            }
            Err(e) => {
                warn!(doi = %doi.normalized, error = %e, "provider fetch failed");
                None
            }
        }
    }
}

//! The top-level refresh run: fetch, merge, and persist every configured
//! source, tolerating per-source failures.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::config::{Config, SourceConfig};
use crate::fetcher::Fetcher;
use crate::store;

/// Outcome of refreshing one configured source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    /// New content was merged and the output file was rewritten.
    Updated,
    /// The fetch succeeded but produced no changes; the file was left untouched.
    Unchanged,
    /// The fetch or write failed; the source was skipped for this run.
    Failed,
}

/// Tally of per-source outcomes for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.updated + self.unchanged
    }
}

/// Refresh all configured sources with bounded parallel fan-out.
///
/// Sources are fully independent and write disjoint output paths, so a
/// failure on one never aborts the others.
pub async fn run(config: &Config) -> RunReport {
    let fetcher = Arc::new(Fetcher::new(Duration::from_secs(config.fetch_timeout_secs)));
    info!("Refreshing {} sources", config.sources.len());

    let outcomes: Vec<SourceOutcome> = stream::iter(config.sources.iter())
        .map(|source| {
            let fetcher = fetcher.clone();
            let max_entries = config.max_entries;
            async move { refresh_source(&fetcher, source, max_entries).await }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    let mut report = RunReport::default();
    for outcome in outcomes {
        match outcome {
            SourceOutcome::Updated => report.updated += 1,
            SourceOutcome::Unchanged => report.unchanged += 1,
            SourceOutcome::Failed => report.failed += 1,
        }
    }

    info!(
        "Refresh complete: {} updated, {} unchanged, {} failed",
        report.updated, report.unchanged, report.failed
    );
    report
}

/// Refresh a single source: fetch, merge into the existing output document,
/// and persist only if something changed.
pub async fn refresh_source(
    fetcher: &Fetcher,
    source: &SourceConfig,
    max_entries: usize,
) -> SourceOutcome {
    info!("Fetching source: {} ({})", source.id, source.url);

    let fetched = match fetcher.fetch(&source.url).await {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to fetch source '{}': {}", source.id, e);
            return SourceOutcome::Failed;
        }
    };

    let existing = store::load_existing(&source.output, source);
    let merged = existing.merge(source, fetched, max_entries);

    if !existing.changed(&merged) {
        info!("No changes for source '{}'", source.id);
        return SourceOutcome::Unchanged;
    }

    match store::persist(&source.output, &merged) {
        Ok(()) => {
            info!(
                "Wrote {} entries for source '{}'",
                merged.entries.len(),
                source.id
            );
            SourceOutcome::Updated
        }
        Err(e) => {
            error!("Failed to write output for source '{}': {}", source.id, e);
            SourceOutcome::Failed
        }
    }
}

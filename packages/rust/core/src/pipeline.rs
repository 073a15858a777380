//! End-to-end aggregation run: list → load → enrich → render → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use flora_remote::{EnrichOutcome, Enricher, Fetcher, HttpFetcher};
use flora_shared::{AggregateResult, AppConfig, Result};

use crate::emit::{write_document, write_json_atomic};
use crate::lister::list_metadata_files;
use crate::loader::load_entries;
use crate::render::render_document;

/// Result of one aggregation run.
#[derive(Debug)]
pub struct RunReport {
    /// Successes and failures, as written to the summary.
    pub result: AggregateResult,
    /// Metadata files that could not be loaded, with the reason.
    pub skipped_files: Vec<(String, String)>,
    /// Herbs whose remote metadata merged but was not confirmed as enriched.
    pub unconfirmed: Vec<String>,
    /// Rendered documents, in write order.
    pub documents: Vec<PathBuf>,
    /// Where the summary was written.
    pub summary_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each herb has been enriched.
    fn herb_processed(&self, herb_id: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn herb_processed(&self, _herb_id: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

/// Run the pipeline against the real remote host.
pub async fn run(config: &AppConfig, progress: &dyn ProgressReporter) -> Result<RunReport> {
    let fetcher = HttpFetcher::new(&config.remote)?;
    let enricher = Enricher::new(fetcher, &config.remote);
    run_with(config, &enricher, progress).await
}

/// Run the full pipeline with the given enricher.
///
/// 1. List metadata files (fatal if the directory is missing)
/// 2. Load them, skipping files that do not parse
/// 3. Enrich every entry, one at a time
/// 4. Render and write a document per confirmed entry
/// 5. Write the summary
#[instrument(skip_all, fields(root = %config.paths.root.display()))]
pub async fn run_with<F: Fetcher>(
    config: &AppConfig,
    enricher: &Enricher<F>,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let start = Instant::now();
    let paths = &config.paths;

    progress.phase("Listing flora");
    let files = list_metadata_files(&paths.flora_path(), &paths.metadata_suffix)?;

    progress.phase("Loading flora metadata");
    let loaded = load_entries(&paths.flora_path(), &files);

    progress.phase("Enriching herbs");
    let total = loaded.entries.len();
    let mut result = AggregateResult::new();
    let mut unconfirmed = Vec::new();
    let mut documents = Vec::new();

    for (index, (herb_id, local)) in loaded.entries.iter().enumerate() {
        let outcome = enricher.enrich(herb_id, local).await;
        let merged = outcome.merged_count();
        let repository = match &outcome {
            EnrichOutcome::Attempted { repository, .. } => Some(repository.clone()),
            EnrichOutcome::NoRepository(_) => None,
        };

        match outcome.into_confirmed(config.enrichment.confirm_merged) {
            Some(entry) => {
                let document = render_document(herb_id, &entry)?;
                let path = paths.document_path(herb_id);
                write_document(&path, &document)?;
                documents.push(path);
                result.record_success(herb_id.as_str(), entry);
            }
            None => {
                if merged > 0 {
                    warn!(
                        %herb_id,
                        repository = repository.as_deref().unwrap_or_default(),
                        merged,
                        "remote metadata merged but not confirmed; recording as failed"
                    );
                    unconfirmed.push(herb_id.clone());
                }
                result.record_failure(herb_id.as_str());
            }
        }

        progress.herb_processed(herb_id, index + 1, total);
    }

    progress.phase("Writing summary");
    let summary_path = paths.summary_path();
    write_json_atomic(&summary_path, &result.summary())?;

    let report = RunReport {
        result,
        skipped_files: loaded.skipped,
        unconfirmed,
        documents,
        summary_path,
        elapsed: start.elapsed(),
    };

    info!(
        total_herbs = report.result.count(),
        herbs_to_fix = report.result.failures().len(),
        skipped_files = report.skipped_files.len(),
        path = %report.summary_path.display(),
        "aggregation complete"
    );
    progress.done(&report);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

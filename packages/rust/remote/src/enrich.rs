//! Fetch-and-merge of remote repository metadata into flora entries.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use flora_shared::{CandidateTemplate, Entry, FloraError, FolderTag, RemoteConfig, Result};

use crate::candidates::{Candidate, RepositoryIssue, candidate_urls, parse_repository};
use crate::fetch::Fetcher;

/// What one candidate URL contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// 200 with a parseable mapping; merged into the entry.
    Merged,
    /// 404: the repository does not publish this file.
    NotFound,
    /// Any other HTTP status.
    Status(u16),
    /// 200 but the body is not a metadata mapping.
    Unparseable(String),
    /// No response at all.
    Unreachable(String),
    /// A response arrived but was refused (too large, not UTF-8).
    Rejected(String),
}

/// A candidate and what came of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateAttempt {
    pub candidate: Candidate,
    pub outcome: CandidateOutcome,
}

/// Result of enriching one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichOutcome {
    /// The repository field is unusable; nothing was fetched.
    NoRepository(RepositoryIssue),
    /// Every candidate was tried.
    Attempted {
        repository: String,
        attempts: Vec<CandidateAttempt>,
        /// The local entry with every merged document applied in order.
        merged: Entry,
    },
}

impl EnrichOutcome {
    /// Number of candidates whose document was merged.
    pub fn merged_count(&self) -> usize {
        match self {
            Self::NoRepository(_) => 0,
            Self::Attempted { attempts, .. } => attempts
                .iter()
                .filter(|a| a.outcome == CandidateOutcome::Merged)
                .count(),
        }
    }

    /// The enriched entry, if this outcome counts as a success.
    ///
    /// Without `confirm_merged` enrichment never confirms, even when
    /// documents were merged; every entry is then reported as failed.
    pub fn into_confirmed(self, confirm_merged: bool) -> Option<Entry> {
        if !confirm_merged || self.merged_count() == 0 {
            return None;
        }
        match self {
            Self::Attempted { merged, .. } => Some(merged),
            Self::NoRepository(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Enricher
// ---------------------------------------------------------------------------

/// Tries every candidate location for an entry's repository and merges the
/// documents that parse.
pub struct Enricher<F> {
    fetcher: F,
    base_url: String,
    templates: Vec<CandidateTemplate>,
}

impl<F: Fetcher> Enricher<F> {
    pub fn new(fetcher: F, config: &RemoteConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.clone(),
            templates: config.candidates.clone(),
        }
    }

    /// Candidate URLs for `repo`, in the order they are tried.
    pub fn candidates_for(&self, repo: &str) -> Vec<Candidate> {
        candidate_urls(&self.base_url, repo, &self.templates)
    }

    /// Enrich one local entry. Never fails: problems are part of the outcome.
    ///
    /// All candidates are attempted even after a successful merge; later
    /// documents override keys of earlier ones.
    #[instrument(skip_all, fields(herb_id = %herb_id))]
    pub async fn enrich(&self, herb_id: &str, local: &Entry) -> EnrichOutcome {
        let repository = match parse_repository(local) {
            Ok(repo) => repo.to_string(),
            Err(issue) => {
                warn!(herb_id, %issue, "cannot look up remote metadata");
                return EnrichOutcome::NoRepository(issue);
            }
        };

        let mut merged = local.clone();
        let mut attempts = Vec::with_capacity(self.templates.len());

        for candidate in self.candidates_for(&repository) {
            let outcome = self.try_candidate(&candidate, &mut merged).await;
            attempts.push(CandidateAttempt { candidate, outcome });
        }

        let merged_count = attempts
            .iter()
            .filter(|a| a.outcome == CandidateOutcome::Merged)
            .count();
        if merged_count == 0 {
            warn!(herb_id, %repository, "could not find metadata in specific repository");
        } else {
            debug!(herb_id, %repository, merged = merged_count, "merged remote metadata");
        }

        EnrichOutcome::Attempted {
            repository,
            attempts,
            merged,
        }
    }

    async fn try_candidate(&self, candidate: &Candidate, merged: &mut Entry) -> CandidateOutcome {
        let response = match self.fetcher.fetch(&candidate.url).await {
            Ok(r) => r,
            Err(e @ FloraError::Network(_)) => {
                debug!(url = %candidate.url, error = %e, "candidate unreachable");
                return CandidateOutcome::Unreachable(e.to_string());
            }
            Err(e) => {
                debug!(url = %candidate.url, error = %e, "candidate response rejected");
                return CandidateOutcome::Rejected(e.to_string());
            }
        };

        match (response.status, response.body) {
            (200, Some(body)) => match parse_remote(&body) {
                Ok(mut doc) => {
                    if candidate.folder == FolderTag::Dataset {
                        rewrite_dataset_paths(&mut doc);
                    }
                    merged.extend(doc);
                    debug!(url = %candidate.url, folder = %candidate.folder, "merged candidate");
                    CandidateOutcome::Merged
                }
                Err(e) => {
                    debug!(url = %candidate.url, error = %e, "candidate body not parseable");
                    CandidateOutcome::Unparseable(e.to_string())
                }
            },
            (200, None) => CandidateOutcome::Unparseable("empty body".into()),
            (404, _) => {
                debug!(url = %candidate.url, "candidate response was 404");
                CandidateOutcome::NotFound
            }
            (status, _) => {
                debug!(url = %candidate.url, status, "unexpected candidate status");
                CandidateOutcome::Status(status)
            }
        }
    }
}

/// Parse a remote body into a metadata mapping.
///
/// JSON is tried first: `serde_yaml` rejects some valid JSON, such as
/// surrogate-pair escapes for characters outside the BMP.
fn parse_remote(body: &str) -> Result<Entry> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => serde_yaml::from_str(body).map_err(|e| FloraError::parse(e.to_string()))?,
    };
    match value {
        Value::Object(map) => Ok(map),
        other => Err(FloraError::parse(format!(
            "expected a mapping, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Prefix every `data[].path` with `dataset/`.
///
/// Early repositories kept their metadata inside `dataset/` with paths
/// relative to it. Records without a string `path` are left untouched.
pub fn rewrite_dataset_paths(doc: &mut Entry) {
    let Some(Value::Array(records)) = doc.get_mut("data") else {
        return;
    };
    for record in records {
        if let Some(Value::String(path)) = record.get_mut("path") {
            *path = format!("dataset/{path}");
        }
    }
}

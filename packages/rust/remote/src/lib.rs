//! Remote metadata lookup for herbs.
//!
//! Each flora entry names a source repository (`owner/repo`). This crate
//! builds the ordered list of raw-content URLs where that repository may
//! publish its metadata, fetches them, and merges whatever parses into the
//! local entry.
//!
//! - [`Fetcher`] / [`HttpFetcher`] — the "GET a URL, get status and body" capability
//! - [`candidates`] — URL templates and repository validation
//! - [`Enricher`] — the fetch-and-merge loop

pub mod candidates;
mod enrich;
mod fetch;

pub use candidates::{Candidate, RepositoryIssue, candidate_urls, parse_repository};
pub use enrich::{
    CandidateAttempt, CandidateOutcome, EnrichOutcome, Enricher, rewrite_dataset_paths,
};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};

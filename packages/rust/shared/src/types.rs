//! Core domain types for flora aggregation runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One herb's metadata record: arbitrary string keys to arbitrary values.
///
/// Used for local entries, remote documents, and enriched (merged) entries
/// alike. Keys iterate in sorted order, so serialized output is stable.
pub type Entry = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// Derive the herb identifier from a metadata file name.
///
/// The identifier is the leading run of non-dot characters:
/// `ginkgo.yml` → `ginkgo`, `a.b.yml` → `a`, `noext` → `noext`.
/// A name that starts with a dot has no such run and is used whole.
pub fn herb_id(file_name: &str) -> String {
    match file_name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

// ---------------------------------------------------------------------------
// AggregateResult
// ---------------------------------------------------------------------------

/// Accumulated outcome of one aggregation run.
///
/// Every recorded identifier lives in exactly one of the success mapping or
/// the failure list; recording it again moves it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    successes: BTreeMap<String, Entry>,
    failures: Vec<String>,
}

impl AggregateResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an enriched entry for `id`.
    pub fn record_success(&mut self, id: impl Into<String>, entry: Entry) {
        let id = id.into();
        self.failures.retain(|f| f != &id);
        self.successes.insert(id, entry);
    }

    /// Record `id` as needing attention.
    pub fn record_failure(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.successes.remove(&id);
        if !self.failures.contains(&id) {
            self.failures.push(id);
        }
    }

    pub fn successes(&self) -> &BTreeMap<String, Entry> {
        &self.successes
    }

    /// Failed identifiers, in the order they were recorded.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Number of successful entries. Always equals `successes().len()`.
    pub fn count(&self) -> usize {
        self.successes.len()
    }

    /// Build the consolidated summary document for this run.
    pub fn summary(&self) -> FloraSummary {
        FloraSummary {
            flora: self.successes.clone(),
            herbs_to_fix: self.failures.clone(),
            total_herbs: self.count(),
        }
    }
}

// ---------------------------------------------------------------------------
// FloraSummary
// ---------------------------------------------------------------------------

/// The consolidated summary document (`flora.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloraSummary {
    /// Identifier → enriched entry, for every success.
    pub flora: BTreeMap<String, Entry>,
    /// Identifiers whose enrichment failed.
    pub herbs_to_fix: Vec<String>,
    /// Number of successes.
    pub total_herbs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str) -> Entry {
        let mut e = Entry::new();
        e.insert("name".into(), json!(name));
        e
    }

    #[test]
    fn herb_id_strips_extension() {
        assert_eq!(herb_id("ginkgo.yml"), "ginkgo");
        assert_eq!(herb_id("a.b.yml"), "a");
        assert_eq!(herb_id("noext"), "noext");
    }

    #[test]
    fn herb_id_leading_dot_uses_whole_name() {
        assert_eq!(herb_id(".yml"), ".yml");
    }

    #[test]
    fn identifier_lives_in_exactly_one_place() {
        let mut agg = AggregateResult::new();
        agg.record_failure("ginkgo");
        agg.record_success("ginkgo", entry("Ginkgo"));
        assert!(agg.failures().is_empty());
        assert_eq!(agg.count(), 1);

        agg.record_failure("ginkgo");
        agg.record_failure("ginkgo");
        assert_eq!(agg.failures(), ["ginkgo"]);
        assert_eq!(agg.count(), 0);
    }

    #[test]
    fn summary_count_matches_successes() {
        let mut agg = AggregateResult::new();
        agg.record_success("ginkgo", entry("Ginkgo"));
        agg.record_success("lotus", entry("Lotus"));
        agg.record_failure("mint");

        let summary = agg.summary();
        assert_eq!(summary.total_herbs, summary.flora.len());
        assert_eq!(summary.herbs_to_fix, vec!["mint".to_string()]);
    }

    #[test]
    fn summary_serializes_with_expected_keys() {
        let mut agg = AggregateResult::new();
        agg.record_failure("mint");
        let value = serde_json::to_value(agg.summary()).expect("serialize summary");
        assert_eq!(
            value,
            json!({"flora": {}, "herbs_to_fix": ["mint"], "total_herbs": 0})
        );
    }
}

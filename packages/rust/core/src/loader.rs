//! Load local herb metadata files into entries keyed by herb id.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use flora_shared::{Entry, FloraError, Result, herb_id};

/// What happened to one metadata file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { herb_id: String, entry: Entry },
    Skipped { file: String, reason: String },
}

/// Entries that loaded, plus the files that did not.
#[derive(Debug, Clone, Default)]
pub struct LoadedFlora {
    pub entries: BTreeMap<String, Entry>,
    /// `(file name, reason)` for every skipped file.
    pub skipped: Vec<(String, String)>,
}

/// Load every file in `files` from `dir`.
///
/// A file that cannot be read or parsed is logged and skipped; it never
/// aborts the load.
#[instrument(skip_all, fields(dir = %dir.display(), files = files.len()))]
pub fn load_entries(dir: &Path, files: &[String]) -> LoadedFlora {
    debug!("BEGIN: load flora metadata");

    let mut loaded = LoadedFlora::default();
    for file in files {
        match load_file(dir, file) {
            LoadOutcome::Loaded { herb_id, entry } => {
                debug!(%herb_id, ?entry, "loaded herb");
                if loaded.entries.insert(herb_id.clone(), entry).is_some() {
                    warn!(%herb_id, %file, "duplicate herb id, keeping the later file");
                }
            }
            LoadOutcome::Skipped { file, reason } => {
                warn!(%file, %reason, "herb metadata can not be loaded");
                loaded.skipped.push((file, reason));
            }
        }
    }

    debug!(entries = loaded.entries.len(), "END: load flora metadata");
    loaded
}

/// Load a single metadata file.
pub fn load_file(dir: &Path, file: &str) -> LoadOutcome {
    let path = dir.join(file);
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| FloraError::io(&path, e))
        .and_then(|text| parse_document(&text));

    match parsed {
        Ok(entry) => LoadOutcome::Loaded {
            herb_id: herb_id(file),
            entry,
        },
        Err(e) => LoadOutcome::Skipped {
            file: file.to_string(),
            reason: e.to_string(),
        },
    }
}

/// Parse a metadata document: a mapping, or a sequence whose first item is one.
pub fn parse_document(text: &str) -> Result<Entry> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| FloraError::parse(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(FloraError::parse("first sequence item is not a mapping")),
            None => Err(FloraError::parse("empty sequence")),
        },
        _ => Err(FloraError::parse(
            "expected a mapping or a sequence of mappings",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture_dir() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/flora")
    }

    #[test]
    fn parses_mapping_and_sequence_forms() {
        let seq = parse_document("- name: Ginkgo\n  repository: acme/ginkgo\n").unwrap();
        assert_eq!(seq["name"], json!("Ginkgo"));

        let map = parse_document("name: Lotus\n").unwrap();
        assert_eq!(map["name"], json!("Lotus"));
    }

    #[test]
    fn sequence_uses_first_item() {
        let doc = parse_document("- name: First\n- name: Second\n").unwrap();
        assert_eq!(doc["name"], json!("First"));
    }

    #[test]
    fn rejects_non_mapping_documents() {
        assert!(parse_document("just a string").is_err());
        assert!(parse_document("[]").is_err());
        assert!(parse_document("- 1\n- 2\n").is_err());
        assert!(parse_document("name: [unclosed").is_err());
    }

    #[test]
    fn malformed_file_is_skipped() {
        let files: Vec<String> = ["broken.yml", "ginkgo.yml", "lotus.yml", "mint.yml"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let loaded = load_entries(&fixture_dir(), &files);

        let ids: Vec<&str> = loaded.entries.keys().map(String::as_str).collect();
        assert_eq!(ids, ["ginkgo", "lotus", "mint"]);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].0, "broken.yml");
        assert_eq!(
            loaded.entries["ginkgo"]["repository"],
            json!("DataHerb/flora-ginkgo")
        );
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = load_file(tmp.path(), "ghost.yml");
        assert!(matches!(outcome, LoadOutcome::Skipped { ref file, .. } if file == "ghost.yml"));
    }

    #[test]
    fn identifier_collision_keeps_later_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.b.yml"), "name: Dotted\n").unwrap();
        std::fs::write(tmp.path().join("a.yml"), "name: Plain\n").unwrap();

        let files = vec!["a.b.yml".to_string(), "a.yml".to_string()];
        let loaded = load_entries(tmp.path(), &files);
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries["a"]["name"], json!("Plain"));
    }
}

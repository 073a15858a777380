//! Candidate metadata URLs for a herb's source repository.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use flora_shared::{CandidateTemplate, Entry, FolderTag, REPO_PLACEHOLDER};

/// Field of a flora entry naming its source repository.
pub const REPOSITORY_FIELD: &str = "repository";

/// One concrete URL to try, with the rewrite rule for what it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub folder: FolderTag,
}

/// Why an entry's repository field cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryIssue {
    /// No `repository` field.
    Missing,
    /// Present but not an `owner/repo` string; holds the raw value.
    Malformed(String),
}

impl std::fmt::Display for RepositoryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("no repository field"),
            Self::Malformed(raw) => write!(f, "repository {raw} is not of the form owner/repo"),
        }
    }
}

/// Read and validate the `repository` field of an entry.
pub fn parse_repository(entry: &Entry) -> Result<&str, RepositoryIssue> {
    static REPO_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("valid regex")
    });

    match entry.get(REPOSITORY_FIELD) {
        None | Some(Value::Null) => Err(RepositoryIssue::Missing),
        Some(Value::String(repo)) if REPO_RE.is_match(repo.trim()) => Ok(repo.trim()),
        Some(other) => Err(RepositoryIssue::Malformed(other.to_string())),
    }
}

/// Expand the templates for `repo`, keeping their order.
pub fn candidate_urls(
    base_url: &str,
    repo: &str,
    templates: &[CandidateTemplate],
) -> Vec<Candidate> {
    let base = base_url.trim_end_matches('/');
    templates
        .iter()
        .map(|t| Candidate {
            url: format!("{base}/{}", t.path.replace(REPO_PLACEHOLDER, repo)),
            folder: t.folder,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flora_shared::default_candidates;
    use serde_json::json;

    fn entry(value: serde_json::Value) -> Entry {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn default_candidates_in_fixed_order() {
        let urls: Vec<String> = candidate_urls(
            "https://raw.githubusercontent.com",
            "acme/herbs",
            &default_candidates(),
        )
        .into_iter()
        .map(|c| c.url)
        .collect();

        assert_eq!(
            urls,
            [
                "https://raw.githubusercontent.com/acme/herbs/master/datapackage.json",
                "https://raw.githubusercontent.com/acme/herbs/master/dataset/datapackage.json",
                "https://raw.githubusercontent.com/acme/herbs/master/.dataherb/metadata.yml",
                "https://raw.githubusercontent.com/acme/herbs/master/dataset/metadata.yml",
            ]
        );
    }

    #[test]
    fn folder_tags_follow_templates() {
        let folders: Vec<FolderTag> = candidate_urls("http://h", "a/b", &default_candidates())
            .into_iter()
            .map(|c| c.folder)
            .collect();
        assert_eq!(
            folders,
            [
                FolderTag::Dataset,
                FolderTag::Dataset,
                FolderTag::Dataherb,
                FolderTag::Dataset
            ]
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let c = candidate_urls("http://localhost:9000/", "a/b", &default_candidates());
        assert_eq!(c[0].url, "http://localhost:9000/a/b/master/datapackage.json");
    }

    #[test]
    fn repository_validation() {
        let e = entry(json!({"repository": "DataHerb/flora-ginkgo"}));
        assert_eq!(parse_repository(&e), Ok("DataHerb/flora-ginkgo"));

        let e = entry(json!({"name": "no repo"}));
        assert_eq!(parse_repository(&e), Err(RepositoryIssue::Missing));

        let e = entry(json!({"repository": null}));
        assert_eq!(parse_repository(&e), Err(RepositoryIssue::Missing));

        let e = entry(json!({"repository": "just-a-name"}));
        assert!(matches!(parse_repository(&e), Err(RepositoryIssue::Malformed(_))));

        let e = entry(json!({"repository": ["acme/herbs"]}));
        assert!(matches!(parse_repository(&e), Err(RepositoryIssue::Malformed(_))));

        let e = entry(json!({"repository": "https://github.com/acme/herbs"}));
        assert!(matches!(parse_repository(&e), Err(RepositoryIssue::Malformed(_))));
    }
}

//! Application configuration for the flora aggregator.
//!
//! Config is looked up at `--config <path>`, then `./flora.toml`, then
//! `~/.flora/flora.toml`. Every field has a default, so no file is needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FloraError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "flora.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".flora";

/// Placeholder substituted with the `owner/repo` value in candidate paths.
pub const REPO_PLACEHOLDER: &str = "{repo}";

// ---------------------------------------------------------------------------
// Config structs (matching flora.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Remote repository host settings.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Enrichment behavior.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory all other paths are resolved against.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Directory holding the per-herb metadata files.
    #[serde(default = "default_flora_dir")]
    pub flora_dir: String,

    /// Only files ending with this suffix are loaded.
    #[serde(default = "default_metadata_suffix")]
    pub metadata_suffix: String,

    /// Output directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Per-herb documents directory, relative to `build_dir`.
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,

    /// Extension of rendered per-herb documents.
    #[serde(default = "default_document_extension")]
    pub document_extension: String,

    /// Summary document file name, relative to `build_dir`.
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            flora_dir: default_flora_dir(),
            metadata_suffix: default_metadata_suffix(),
            build_dir: default_build_dir(),
            documents_dir: default_documents_dir(),
            document_extension: default_document_extension(),
            summary_file: default_summary_file(),
        }
    }
}

impl PathsConfig {
    /// Directory the lister enumerates.
    pub fn flora_path(&self) -> PathBuf {
        self.root.join(&self.flora_dir)
    }

    /// Directory per-herb documents are written into.
    pub fn documents_path(&self) -> PathBuf {
        self.root.join(&self.build_dir).join(&self.documents_dir)
    }

    /// Path of the consolidated summary document.
    pub fn summary_path(&self) -> PathBuf {
        self.root.join(&self.build_dir).join(&self.summary_file)
    }

    /// Path of the rendered document for one herb.
    pub fn document_path(&self, herb_id: &str) -> PathBuf {
        self.documents_path()
            .join(format!("{herb_id}.{}", self.document_extension))
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_flora_dir() -> String {
    "flora".into()
}
fn default_metadata_suffix() -> String {
    ".yml".into()
}
fn default_build_dir() -> String {
    "build".into()
}
fn default_documents_dir() -> String {
    "_flora".into()
}
fn default_document_extension() -> String {
    "md".into()
}
fn default_summary_file() -> String {
    "flora.json".into()
}

/// Which backward-compatibility rule applies to a fetched document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderTag {
    /// Legacy layout: data paths are relative to `dataset/`.
    #[serde(rename = "dataset")]
    Dataset,
    /// Current layout: metadata under `.dataherb/`, paths already rooted.
    #[serde(rename = ".dataherb")]
    Dataherb,
}

impl std::fmt::Display for FolderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dataset => f.write_str("dataset"),
            Self::Dataherb => f.write_str(".dataherb"),
        }
    }
}

/// One remote metadata location to try, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTemplate {
    /// Path under the base URL; `{repo}` is replaced with `owner/repo`.
    pub path: String,
    /// Rewrite rule for the fetched document.
    pub folder: FolderTag,
}

impl CandidateTemplate {
    pub fn new(path: impl Into<String>, folder: FolderTag) -> Self {
        Self {
            path: path.into(),
            folder,
        }
    }
}

/// The built-in candidate list. Order is significant.
pub fn default_candidates() -> Vec<CandidateTemplate> {
    vec![
        CandidateTemplate::new("{repo}/master/datapackage.json", FolderTag::Dataset),
        CandidateTemplate::new("{repo}/master/dataset/datapackage.json", FolderTag::Dataset),
        CandidateTemplate::new("{repo}/master/.dataherb/metadata.yml", FolderTag::Dataherb),
        CandidateTemplate::new("{repo}/master/dataset/metadata.yml", FolderTag::Dataset),
    ]
}

/// `[remote]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Raw-content host the candidate paths are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for remote requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Candidate locations, tried in order.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<CandidateTemplate>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            candidates: default_candidates(),
        }
    }
}

fn default_base_url() -> String {
    "https://raw.githubusercontent.com".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("flora/", env!("CARGO_PKG_VERSION")).into()
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Report an entry as enriched once any candidate merged.
    ///
    /// Off by default: enrichment then never confirms success and every
    /// entry lands in `herbs_to_fix`, matching the historical output.
    #[serde(default)]
    pub confirm_merged: bool,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.paths.metadata_suffix.is_empty() {
            return Err(FloraError::config("paths.metadata_suffix must not be empty"));
        }
        if self.paths.document_extension.is_empty() {
            return Err(FloraError::config(
                "paths.document_extension must not be empty",
            ));
        }
        if self.remote.timeout_secs == 0 {
            return Err(FloraError::config("remote.timeout_secs must be positive"));
        }

        let base = url::Url::parse(&self.remote.base_url).map_err(|e| {
            FloraError::config(format!(
                "remote.base_url '{}' is not a valid URL: {e}",
                self.remote.base_url
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(FloraError::config(format!(
                "remote.base_url '{}' must use http or https",
                self.remote.base_url
            )));
        }

        if self.remote.candidates.is_empty() {
            return Err(FloraError::config("remote.candidates must not be empty"));
        }
        for candidate in &self.remote.candidates {
            if !candidate.path.contains(REPO_PLACEHOLDER) {
                return Err(FloraError::config(format!(
                    "candidate path '{}' does not contain {REPO_PLACEHOLDER}",
                    candidate.path
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.flora/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| FloraError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.flora/flora.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the user config from the home directory. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FloraError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| FloraError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.validate()?;

    tracing::debug!(?path, "loaded config");
    Ok(config)
}

/// Resolve the config for a run.
///
/// An explicit path must exist. Otherwise `flora.toml` in `cwd` wins over the
/// home-directory file, which wins over defaults.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let local = cwd.join(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    load_config()
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FloraError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file to `path`.
pub fn init_config_at(path: &Path) -> Result<()> {
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FloraError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| FloraError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use flora_core::pipeline::{ProgressReporter, RunReport};
use flora_shared::{AppConfig, init_config, init_config_at, resolve_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// flora — build the flora dataset pages from herb metadata.
///
/// Without a subcommand, runs the full aggregation once.
#[derive(Parser)]
#[command(
    name = "flora",
    version,
    about = "Aggregate herb metadata from their repositories into flora pages and flora.json.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./flora.toml, then ~/.flora/flora.toml).
    #[arg(long, global = true, env = "FLORA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults (to --config, or ~/.flora/flora.toml).
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Default filter directive for a verbosity level.
fn filter_for(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    ["flora", "flora_core", "flora_remote", "flora_shared"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for(cli.verbose)));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        None => cmd_aggregate(config_path).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let cwd = std::env::current_dir()
        .map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    Ok(resolve_config(config_path, &cwd)?)
}

async fn cmd_aggregate(config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;

    info!(
        flora = %config.paths.flora_path().display(),
        base_url = %config.remote.base_url,
        confirm_merged = config.enrichment.confirm_merged,
        "aggregating flora"
    );

    let reporter = CliProgress::new();
    let report = flora_core::pipeline::run(&config, &reporter).await?;

    println!();
    println!("  Flora aggregated.");
    println!("  Herbs:     {}", report.result.count());
    println!("  To fix:    {}", report.result.failures().len());
    if !report.unconfirmed.is_empty() {
        println!("  Merged but unconfirmed: {}", report.unconfirmed.join(", "));
    }
    if !report.skipped_files.is_empty() {
        println!("  Skipped files: {}", report.skipped_files.len());
    }
    println!("  Summary:   {}", report.summary_path.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn herb_processed(&self, herb_id: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriching [{current}/{total}] {herb_id}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => {
            if p.exists() {
                return Err(eyre!("refusing to overwrite existing config at '{}'", p.display()));
            }
            init_config_at(p)?;
            p.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_runs_aggregation() {
        let cli = Cli::try_parse_from(["flora"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["flora", "config", "show", "--config", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn verbosity_raises_filter_level() {
        assert!(filter_for(0).contains("flora_core=info"));
        assert!(filter_for(2).contains("flora_remote=trace"));
    }
}

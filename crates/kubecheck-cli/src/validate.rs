//! # Validate Subcommand
//!
//! Validates Kubernetes manifests against their JSON schemas.
//!
//! ```bash
//! kubecheck validate deploy/
//! kubecheck validate --kubernetes-version 1.29.0 --summary app.yaml
//! cat app.yaml | kubecheck validate --output json
//! ```
//!
//! Directories are walked recursively for `.yaml`, `.yml` and `.json`
//! files. `-`, or no path at all, reads standard input.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use kubecheck_validation::schema_checker::{default_cache_dir, default_options, SCHEMA_LOCATIONS};
use kubecheck_validation::{
    run_checks, CheckContext, CheckResult, Resource, RunOutcome, SchemaChecker, Status,
};

use crate::config::CliConfig;

/// Name used for resources read from standard input.
pub const STDIN_NAME: &str = "stdin";

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Output format of the validate subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per failing result.
    Text,
    /// A single JSON document with every result.
    Json,
}

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest files or directories. `-` reads standard input.
    pub paths: Vec<PathBuf>,

    /// Kubernetes version to validate against.
    #[arg(long, value_name = "VERSION")]
    pub kubernetes_version: Option<String>,

    /// Schema location (URL or path template). Repeat to try several in order.
    #[arg(long = "schema-location", value_name = "LOCATION")]
    pub schema_locations: Vec<String>,

    /// Directory caching downloaded schemas. Created if absent.
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Allow properties not defined in the schema.
    #[arg(long)]
    pub no_strict: bool,

    /// Skip resources whose schema cannot be found instead of failing them.
    #[arg(long)]
    pub ignore_missing_schemas: bool,

    /// Kinds to skip (`Kind` or `apiVersion/Kind`), comma-separated.
    #[arg(long, value_delimiter = ',', value_name = "KINDS")]
    pub skip: Vec<String>,

    /// Kinds to reject (`Kind` or `apiVersion/Kind`), comma-separated.
    #[arg(long, value_delimiter = ',', value_name = "KINDS")]
    pub reject: Vec<String>,

    /// Do not verify TLS certificates of schema registries.
    #[arg(long)]
    pub insecure_skip_tls_verify: bool,

    /// Timeout for each schema download, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Give up on resources not yet checked after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub max_duration: Option<u64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Print a summary line (text output only; JSON always has one).
    #[arg(long)]
    pub summary: bool,
}

impl ValidateArgs {
    fn has_overrides(&self, config: &CliConfig) -> bool {
        self.kubernetes_version.is_some()
            || !self.schema_locations.is_empty()
            || self.no_strict
            || self.ignore_missing_schemas
            || !self.skip.is_empty()
            || !self.reject.is_empty()
            || self.insecure_skip_tls_verify
            || self.timeout.is_some()
            || config.kubernetes_version.is_some()
            || !config.schema_locations.is_empty()
    }
}

/// Per-status result counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub resources: usize,
    pub files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: usize,
    pub skipped: usize,
    pub empty: usize,
}

impl Summary {
    fn record(&mut self, result: &CheckResult) {
        match result.status {
            Status::Valid => self.valid += 1,
            Status::Invalid => self.invalid += 1,
            Status::Error => self.errors += 1,
            Status::Skipped => self.skipped += 1,
            Status::Empty => self.empty += 1,
        }
    }

    /// True if any result failed.
    pub fn has_failures(&self) -> bool {
        self.invalid > 0 || self.errors > 0
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    resources: Vec<JsonResource<'a>>,
    summary: Summary,
}

#[derive(Serialize)]
struct JsonResource<'a> {
    filename: &'a str,
    index: usize,
    results: &'a [CheckResult],
}

/// Execute the validate subcommand, writing the report to stdout.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    validate_to(args, config, &mut std::io::stdin(), &mut out)
}

/// Execute the validate subcommand against explicit streams.
///
/// Returns the process exit code: 0 when nothing failed, 1 otherwise.
pub fn validate_to(
    args: &ValidateArgs,
    config: &CliConfig,
    stdin: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<u8> {
    let checker = build_checker(args, config)?;
    let (resources, files) = load_resources(&args.paths, stdin)?;
    tracing::info!(resources = resources.len(), files, "loaded manifests");

    let ctx = match args.max_duration {
        Some(secs) => CheckContext::with_timeout(Duration::from_secs(secs)),
        None => CheckContext::background(),
    };
    let outcome = run_checks(&ctx, &[&checker], &resources);
    if outcome.interrupted {
        bail!(
            "gave up after checking {} of {} resources",
            outcome.reports.len(),
            resources.len()
        );
    }

    let summary = summarize(&outcome, files);
    let written = match args.output {
        OutputFormat::Text => write_text(out, &outcome, &summary, args.summary),
        OutputFormat::Json => write_json(out, &outcome, summary),
    };
    written.context("failed to write report")?;

    Ok(u8::from(summary.has_failures()))
}

/// Build the schema checker from flags, environment and built-in defaults.
pub fn build_checker(args: &ValidateArgs, config: &CliConfig) -> Result<SchemaChecker> {
    let cache = args
        .cache
        .clone()
        .or_else(|| config.cache_dir.clone())
        .unwrap_or_else(default_cache_dir);

    if !args.has_overrides(config) {
        return SchemaChecker::with_cache_dir(&cache).context("failed to initialize schema checker");
    }

    std::fs::create_dir_all(&cache)
        .with_context(|| format!("failed to create cache directory: {}", cache.display()))?;

    let mut options = default_options(cache);
    if let Some(version) = args
        .kubernetes_version
        .clone()
        .or_else(|| config.kubernetes_version.clone())
    {
        options.kubernetes_version = version;
    }
    options.strict = !args.no_strict;
    options.ignore_missing_schemas = args.ignore_missing_schemas;
    options.skip_kinds = args.skip.iter().cloned().collect();
    options.reject_kinds = args.reject.iter().cloned().collect();
    options.skip_tls = args.insecure_skip_tls_verify;
    if let Some(secs) = args.timeout {
        options.timeout = Duration::from_secs(secs);
    }

    let locations: Vec<String> = if !args.schema_locations.is_empty() {
        args.schema_locations.clone()
    } else if !config.schema_locations.is_empty() {
        config.schema_locations.clone()
    } else {
        SCHEMA_LOCATIONS.iter().map(ToString::to_string).collect()
    };
    tracing::debug!(?locations, version = %options.kubernetes_version, "schema checker configuration");

    SchemaChecker::with_options(&locations, options).context("failed to initialize schema checker")
}

/// Read every input and split it into resources.
///
/// Returns the resources and the number of files (stdin counts as one).
fn load_resources(paths: &[PathBuf], stdin: &mut dyn Read) -> Result<(Vec<Resource>, usize)> {
    let mut resources = Vec::new();
    let mut files = 0;
    let mut read_stdin = paths.is_empty();

    let mut manifest_files = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            read_stdin = true;
        } else if path.is_dir() {
            manifest_files.extend(find_manifest_files(path)?);
        } else {
            manifest_files.push(path.clone());
        }
    }

    if read_stdin {
        let mut text = String::new();
        stdin
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        resources.extend(Resource::split_stream(STDIN_NAME, &text));
        files += 1;
    }

    for file in &manifest_files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read manifest: {}", file.display()))?;
        resources.extend(Resource::split_stream(&file.display().to_string(), &text));
        files += 1;
    }

    Ok((resources, files))
}

/// Recursively find manifest files under a directory, sorted.
fn find_manifest_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read directory: {}", dir.display()))?
            .path();
        if path.is_dir() {
            found.extend(find_manifest_files(&path)?);
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| MANIFEST_EXTENSIONS.contains(&e))
        {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn summarize(outcome: &RunOutcome<'_>, files: usize) -> Summary {
    let mut summary = Summary {
        resources: outcome.reports.len(),
        files,
        ..Summary::default()
    };
    for report in &outcome.reports {
        for result in &report.results {
            summary.record(result);
        }
    }
    summary
}

fn write_text(
    out: &mut dyn Write,
    outcome: &RunOutcome<'_>,
    summary: &Summary,
    with_summary: bool,
) -> std::io::Result<()> {
    for report in &outcome.reports {
        for result in report.results.iter().filter(|r| r.status.is_failure()) {
            writeln!(
                out,
                "{} - {} {}: {}",
                report.resource, result.check_name, result.status, result.message
            )?;
        }
    }
    if with_summary {
        writeln!(
            out,
            "Summary: {} resources found in {} files - Valid: {}, Invalid: {}, Errors: {}, Skipped: {}",
            summary.resources,
            summary.files,
            summary.valid,
            summary.invalid,
            summary.errors,
            summary.skipped
        )?;
    }
    Ok(())
}

fn write_json(out: &mut dyn Write, outcome: &RunOutcome<'_>, summary: Summary) -> std::io::Result<()> {
    let report = JsonReport {
        resources: outcome
            .reports
            .iter()
            .map(|r| JsonResource {
                filename: r.resource.path(),
                index: r.resource.index(),
                results: &r.results,
            })
            .collect(),
        summary,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

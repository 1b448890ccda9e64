//! CLI binary for transform-gate: report which files a build-time transform would process.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gate_core::{Decision, DirectoryReport, GateConfig, Resolution, TransformFilter};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "transform-gate",
    about = "Decide which source files a build-time transform should process"
)]
struct Cli {
    /// Directory holding `.gate/config.toml` (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print `transform` or `skip` for each path
    Check {
        /// Files to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show how the verdict for a path was reached
    Explain {
        /// File or directory to explain
        path: PathBuf,
    },

    /// Walk the project and classify every source file
    Scan {
        /// Glob patterns to include files (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns to exclude files (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Do not honour .gitignore and .ignore files
        #[arg(long)]
        no_ignore: bool,
    },
}

#[derive(Serialize)]
struct FileDecision {
    path: PathBuf,
    #[serde(flatten)]
    decision: Decision,
}

#[derive(Serialize)]
struct Explanation {
    path: PathBuf,
    resolution: Resolution,
    directory: Option<DirectoryReport>,
}

#[derive(Serialize)]
struct ScanSummary {
    files: Vec<FileDecision>,
    transform: usize,
    skip: usize,
    cache_entries: usize,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let config = GateConfig::load(&project_root)
        .with_context(|| format!("failed to load config from {}", project_root.display()))?;
    let filter = TransformFilter::with_config(&config);

    match cli.command {
        Commands::Check { paths } => cmd_check(&filter, &paths, cli.json),
        Commands::Explain { path } => cmd_explain(&filter, &path, cli.json),
        Commands::Scan {
            include,
            exclude,
            no_ignore,
        } => cmd_scan(&filter, &project_root, &include, &exclude, no_ignore, cli.json),
    }
}

fn cmd_check(filter: &TransformFilter, paths: &[PathBuf], json: bool) -> Result<()> {
    let decisions: Vec<FileDecision> = paths
        .iter()
        .map(|path| FileDecision {
            path: path.clone(),
            decision: filter.decide(path),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&decisions)?);
    } else {
        for d in &decisions {
            println!("{:<9} {}", d.decision.label(), d.path.display());
        }
    }
    Ok(())
}

fn cmd_explain(filter: &TransformFilter, path: &Path, json: bool) -> Result<()> {
    let search = filter.search();
    let resolution = search.resolve(path);
    let directory = resolution
        .deciding_dir()
        .and_then(|dir| search.classifier().inspect(dir).ok());

    let explanation = Explanation {
        path: path.to_path_buf(),
        resolution,
        directory,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
        return Ok(());
    }

    println!("path:     {}", explanation.path.display());
    println!("verdict:  {}", explanation.resolution.verdict());
    match &explanation.resolution {
        Resolution::CacheHit { dir, .. } => println!("via:      cached entry {}", dir.display()),
        Resolution::Governed { dir, reason } => {
            println!("via:      {} ({})", dir.display(), describe_reason(reason));
        }
        Resolution::DependencyBoundary { root, package_dir } => {
            println!("via:      dependency root {}", root.display());
            if let Some(pkg) = package_dir {
                println!("package:  {}", pkg.display());
            }
        }
        Resolution::RootExhausted => println!("via:      no governed directory up to the filesystem root"),
        Resolution::ProbeFailed { path, message } => {
            println!("via:      probe of {} failed: {}", path.display(), message);
        }
    }
    if let Some(report) = &explanation.directory
        && !matches!(explanation.resolution, Resolution::Governed { .. })
    {
        println!(
            "dir says: {} ({})",
            report.verdict,
            describe_reason(&report.reason)
        );
    }
    Ok(())
}

fn describe_reason(reason: &gate_core::Reason) -> String {
    use gate_core::Reason;
    match reason {
        Reason::Prebuilt { heuristic } => format!("pre-built package, {heuristic}"),
        Reason::ConfigFile { file } | Reason::ScriptConfigFile { file } => format!("found {file}"),
        Reason::DescriptorKey { key } => format!("package metadata has \"{key}\""),
        Reason::NoMarkers => "no configuration markers".to_string(),
    }
}

fn build_globset(patterns: &[String], flag: &str) -> Result<Option<globset::GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = globset::GlobSetBuilder::new();
    for p in patterns {
        builder.add(globset::Glob::new(p).with_context(|| format!("invalid {flag} glob: {p}"))?);
    }
    Ok(Some(
        builder
            .build()
            .with_context(|| format!("invalid {flag} glob set"))?,
    ))
}

/// Collect source files under `project_root` the transform could handle.
fn collect_source_files(
    filter: &TransformFilter,
    project_root: &Path,
    include: &[String],
    exclude: &[String],
    no_ignore: bool,
) -> Result<Vec<PathBuf>> {
    use indicatif::{ProgressBar, ProgressStyle};

    let include_set = build_globset(include, "--include")?;
    let exclude_set = build_globset(exclude, "--exclude")?;

    let walker = ignore::WalkBuilder::new(project_root)
        .hidden(true)
        .git_ignore(!no_ignore)
        .ignore(!no_ignore)
        .parents(!no_ignore)
        .build();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message("Scanning files...");

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("failed to read entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) || !filter.handles_extension(path) {
            continue;
        }
        let rel_path = path.strip_prefix(project_root).unwrap_or(path);
        if let Some(ref inc) = include_set
            && !inc.is_match(rel_path)
        {
            continue;
        }
        if let Some(ref exc) = exclude_set
            && exc.is_match(rel_path)
        {
            continue;
        }
        files.push(path.to_path_buf());
        spinner.set_message(format!("{} files collected", files.len()));
        spinner.tick();
    }
    spinner.finish_and_clear();
    Ok(files)
}

fn cmd_scan(
    filter: &TransformFilter,
    project_root: &Path,
    include: &[String],
    exclude: &[String],
    no_ignore: bool,
    json: bool,
) -> Result<()> {
    let files = collect_source_files(filter, project_root, include, exclude, no_ignore)?;
    tracing::info!("classifying {} files", files.len());

    let mut decisions: Vec<FileDecision> = files
        .into_par_iter()
        .map(|path| {
            let decision = filter.decide(&path);
            FileDecision { path, decision }
        })
        .collect();
    decisions.sort_by(|a, b| a.path.cmp(&b.path));

    let transform = decisions
        .iter()
        .filter(|d| d.decision.should_transform())
        .count();
    let summary = ScanSummary {
        skip: decisions.len() - transform,
        transform,
        cache_entries: filter.search().cache().len(),
        files: decisions,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for d in &summary.files {
        let rel = d.path.strip_prefix(project_root).unwrap_or(&d.path);
        println!("{:<9} {}", d.decision.label(), rel.display());
    }
    println!();
    println!(
        "{} to transform, {} to skip ({} cached directories)",
        summary.transform, summary.skip, summary.cache_entries
    );
    Ok(())
}

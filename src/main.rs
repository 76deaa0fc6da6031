mod cli;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use ragprep_core::Config;
use ragprep_files::{Destinations, DryRunRelocator, FileClassifier, FsRelocator, Relocator, sweep};
use ragprep_records::{
    JsonlSplitter, PartitionCoordinator, RecordPipeline, SplitReport, artifact_base,
    artifact_base_within, suggested_shard_count,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber(cli.log_file.as_deref())?;

    let config_path = resolve_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path)?;
    if let Some(bytes) = cli.max_chunk_bytes {
        config.chunking.max_chunk_bytes = bytes;
    }
    if let Command::Partition {
        shards: Some(n), ..
    } = cli.command
    {
        config.partition.shards = Some(n);
    }
    config.validate()?;

    match cli.command {
        Command::Run { dry_run } => run(&config, dry_run).await,
        Command::Split { file, out } => {
            let out = out.unwrap_or_else(|| config.paths.chunks_dir());
            let pipeline = Arc::new(RecordPipeline::from_config(&config)?);
            let base = artifact_base(&file);
            let report = split(pipeline, &config, file, out, base).await?;
            print_split(&report);
            Ok(())
        }
        Command::Partition {
            file, out, only, ..
        } => {
            let out = out.unwrap_or_else(|| config.paths.chunks_dir());
            let pipeline = Arc::new(RecordPipeline::from_config(&config)?);
            partition(pipeline, &config, &file, &out, &artifact_base(&file), only).await
        }
        Command::Classify { root, dry_run } => {
            let root = root.unwrap_or_else(|| config.paths.raw_root.clone());
            classify(&config, &root, dry_run)?;
            Ok(())
        }
        Command::Scrub { file, ext } => scrub(&config, &file, ext.as_deref()),
    }
}

/// Full flow: sweep the raw root, then split every deferred structured file.
async fn run(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let report = classify(config, &config.paths.raw_root, dry_run)?;
    let jobs = artifact_bases(&report.deferred, &config.paths.structured_root())?;
    if dry_run {
        for (base, input) in &jobs {
            println!("would split {} as {base}", input.display());
        }
        return Ok(());
    }

    let pipeline = Arc::new(RecordPipeline::from_config(config)?);
    let out = config.paths.chunks_dir();
    for (base, input) in jobs {
        if config.partition.shards.is_some() {
            partition(Arc::clone(&pipeline), config, input, &out, &base, None).await?;
        } else {
            let report =
                split(Arc::clone(&pipeline), config, input.to_path_buf(), out.clone(), base).await?;
            print_split(&report);
        }
    }

    println!(
        "Processing complete. Data is ready for ingestion from: {}",
        config.paths.processed_root.display()
    );
    Ok(())
}

/// Artifact base per deferred input, keyed by base. Fails before anything is
/// written if two inputs would share a base.
fn artifact_bases<'a>(
    inputs: &'a [PathBuf],
    structured_root: &Path,
) -> anyhow::Result<BTreeMap<String, &'a Path>> {
    let mut bases = BTreeMap::new();
    for input in inputs {
        let base = artifact_base_within(input, structured_root);
        if let Some(previous) = bases.insert(base.clone(), input.as_path()) {
            bail!(
                "{} and {} would both write artifacts named {base}_*",
                previous.display(),
                input.display()
            );
        }
    }
    Ok(bases)
}

fn classify(
    config: &Config,
    root: &Path,
    dry_run: bool,
) -> anyhow::Result<ragprep_files::SweepReport> {
    let destinations = Destinations::from_paths(&config.paths);
    let relocator: &dyn Relocator = if dry_run {
        &DryRunRelocator
    } else {
        destinations
            .ensure()
            .context("failed to create processed directories")?;
        &FsRelocator
    };
    let classifier = FileClassifier::new(root.join(&config.paths.structured_dir));
    let report = sweep(root, &classifier, &destinations, relocator)
        .with_context(|| format!("sweep of {} failed", root.display()))?;

    println!(
        "quarantined {}, passed through {}, deferred {}, unknown {}",
        report.quarantined.len(),
        report.passed_through.len(),
        report.deferred.len(),
        report.unknown.len()
    );
    Ok(report)
}

async fn split(
    pipeline: Arc<RecordPipeline>,
    config: &Config,
    input: PathBuf,
    out: PathBuf,
    base: String,
) -> anyhow::Result<SplitReport> {
    let splitter = JsonlSplitter::new(pipeline, config.chunking.max_chunk_bytes);
    let context = format!("failed to split {}", input.display());
    tokio::task::spawn_blocking(move || splitter.split_file_as(&input, &out, &base))
        .await
        .context("split task failed")?
        .context(context)
}

async fn partition(
    pipeline: Arc<RecordPipeline>,
    config: &Config,
    input: &Path,
    out: &Path,
    base: &str,
    only: Option<usize>,
) -> anyhow::Result<()> {
    let max = config.chunking.max_chunk_bytes;
    let shards = match config.partition.shards {
        Some(n) => n,
        None => {
            let len = std::fs::metadata(input)
                .with_context(|| format!("failed to stat {}", input.display()))?
                .len();
            suggested_shard_count(len, max)
        }
    };
    let coordinator = PartitionCoordinator::new(pipeline, shards, max)?;

    if let Some(id) = only {
        let Some(shard) = coordinator.shard(id) else {
            bail!("shard {id} out of range, input has {shards} shards");
        };
        let (input, out, base) = (input.to_path_buf(), out.to_path_buf(), base.to_owned());
        let report = tokio::task::spawn_blocking(move || {
            coordinator.run_shard_as(shard, &input, &out, &base)
        })
        .await
        .context("shard task failed")??;
        print_split(&report);
        return Ok(());
    }

    let report = coordinator
        .run_as(input, out, base)
        .await
        .with_context(|| format!("failed to partition {}", input.display()))?;
    for shard in &report.shards {
        print_split(&shard.split);
    }
    let chunks = report.chunks();
    println!(
        "{} shards: {} records, {} skipped, {} artifacts",
        report.shards.len(),
        report.records(),
        report.skipped(),
        chunks.chunks
    );
    Ok(())
}

fn scrub(config: &Config, file: &Path, ext: Option<&str>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let ext = ext
        .map(str::to_owned)
        .or_else(|| {
            file.extension()
                .map(|e| e.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    let pipeline = RecordPipeline::from_config(config)?;
    let (scrubbed, redacted) = pipeline.scrub(&text, &ext);
    tracing::debug!(redacted, ext = %ext, "scrubbed extracted text");
    println!("{scrubbed}");
    Ok(())
}

fn print_split(report: &SplitReport) {
    println!(
        "{}: {} records, {} skipped, {} redacted, {} artifacts",
        report.source, report.records, report.skipped, report.redacted, report.chunks.chunks
    );
    for path in &report.artifacts {
        println!("  {}", path.display());
    }
}

fn resolve_config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("RAGPREP_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

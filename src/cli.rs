use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ragprep", version)]
#[command(about = "Prepare raw documents and JSONL records for RAG ingestion")]
pub struct Cli {
    /// Path to the TOML config (defaults to $RAGPREP_CONFIG, then config/default.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the per-artifact byte ceiling
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_chunk_bytes: Option<usize>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sweep the raw root, then split every structured file it defers
    Run {
        /// Report what the sweep would move without moving anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Split one JSONL file into size-bounded artifacts
    Split {
        file: PathBuf,

        /// Output directory (defaults to the configured chunks directory)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Split one JSONL file across independent shard workers
    Partition {
        file: PathBuf,

        /// Number of shards (defaults to the configured count, then one per ceiling of input)
        #[arg(long)]
        shards: Option<usize>,

        /// Output directory (defaults to the configured chunks directory)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Re-run only this shard
        #[arg(long, value_name = "ID")]
        only: Option<usize>,
    },

    /// Classify and relocate files under a raw root
    Classify {
        /// Raw root to sweep (defaults to the configured raw root)
        root: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Tag extracted document text by extension and redact it
    Scrub {
        file: PathBuf,

        /// Source extension of the extracted text (defaults to the file's own)
        #[arg(long, value_name = "EXT")]
        ext: Option<String>,
    },
}

//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Singer target for HDFS Parquet output
#[derive(Parser, Debug)]
#[command(name = "target-hdfs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long)]
    pub config_json: Option<String>,

    /// Read messages from a file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

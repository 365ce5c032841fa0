//! CLI type definitions
//!
//! This module contains the clap structure that defines the CLI interface.

use clap::Parser;
use std::path::PathBuf;

use crate::cli::commands::fetch::FetchArgs;

#[derive(Parser, Debug)]
#[command(name = "cachefront")]
#[command(about = "Fetch query results through a Redis cache-aside layer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// YAML configuration file [default: .cachefront/config.yaml if present]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long)]
    pub json: bool,
}

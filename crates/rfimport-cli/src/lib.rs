//! rfimport CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Imports images from a cloud bucket into a Roboflow dataset by URL.
//!
//! # Overview
//!
//! Each run lists a bucket, skips objects recorded in the upload ledger,
//! signs a temporary read URL for each remaining object and hands that URL to
//! the Roboflow upload API. Acknowledged objects are written to the ledger as
//! they complete, so re-running only picks up new objects.
//!
//! - **Setup**: Write a starter config (`rfimport init`)
//! - **Import**: Upload new objects (`rfimport run`)
//! - **Status Checking**: Compare bucket and ledger (`rfimport status`)
//! - **Ledger Management**: Inspect or forget entries (`rfimport ledger`)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod pipeline;
pub mod progress;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};
pub use ledger::UploadLedger;
pub use pipeline::{PipelineDriver, RunPlan, RunSummary};

use clap::{Parser, Subcommand};
use config::Provider;
use std::path::PathBuf;

/// rfimport - import cloud bucket images into Roboflow
#[derive(Parser, Debug)]
#[command(name = "rfimport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the config file
    #[arg(
        short,
        long,
        env = "RFIMPORT_CONFIG",
        default_value = config::DEFAULT_CONFIG_PATH,
        global = true
    )]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the CLI reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter config file
    Init {
        /// Where to write the config (defaults to --config)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Cloud provider hosting the bucket
        #[arg(long, value_enum, default_value_t = Provider::S3)]
        provider: Provider,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Upload objects not yet recorded in the ledger
    Run {
        /// Maximum number of objects to upload this run
        #[arg(short = 'n', long)]
        sample_size: Option<usize>,

        /// Dataset split (train, valid, test)
        #[arg(short, long)]
        split: Option<String>,

        /// List and filter only; nothing is signed, uploaded or recorded
        #[arg(long)]
        dry_run: bool,
    },

    /// Compare the bucket with the ledger
    Status,

    /// Inspect or edit the upload ledger
    Ledger {
        #[command(subcommand)]
        command: LedgerCommand,
    },
}

/// Ledger subcommands
#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// List recorded object keys
    List,

    /// Remove keys so the next run uploads them again
    Forget {
        /// Object keys to remove
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

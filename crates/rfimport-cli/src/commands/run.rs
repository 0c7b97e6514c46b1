//! `rfimport run` command implementation
//!
//! Imports every object not yet in the ledger, or previews the selection with
//! `--dry-run`.

use crate::api::{DatasetUploader, ReqwestUploadService};
use crate::commands::build_driver;
use crate::config::Config;
use crate::error::Result;
use crate::ledger::UploadLedger;
use crate::pipeline::{RunPlan, RunSummary};
use crate::progress;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

/// Command-line overrides for a run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub sample_size: Option<usize>,
    pub split: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Import new objects from the configured bucket
pub async fn run(config_path: &Path, options: RunOptions) -> Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(sample_size) = options.sample_size {
        config.sample_size = Some(sample_size);
    }
    if let Some(split) = options.split {
        config.set_split(split)?;
    }

    // Loaded before any network call so a corrupt ledger stops the run early
    let mut ledger = UploadLedger::load(&config.uploaded_images_file)?;
    let driver = build_driver(&config).await?;

    println!(
        "{} Listing {} bucket '{}'...",
        "→".cyan(),
        config.provider,
        config.bucket_name
    );

    let plan = driver.plan(&ledger).await?;
    print_plan(&plan);

    if options.dry_run {
        for object_id in &plan.pending {
            println!("  {} {}", "·".dimmed(), object_id);
        }
        println!();
        println!(
            "{} Dry run: {} object(s) would be uploaded to '{}' ({})",
            "✓".green(),
            plan.pending.len(),
            config.roboflow.project_name,
            config.split
        );
        return Ok(());
    }

    if plan.pending.is_empty() {
        println!("{} Nothing to upload", "✓".green());
        return Ok(());
    }

    let service = ReqwestUploadService::new(Duration::from_secs(config.roboflow.timeout_secs))?;
    let uploader = DatasetUploader::new(config.roboflow.clone(), Box::new(service));

    println!(
        "{} Uploading {} object(s) to '{}' ({})",
        "↑".cyan(),
        plan.pending.len(),
        uploader.project(),
        config.split
    );

    let pb = progress::create_upload_progress(plan.pending.len() as u64, !options.verbose);
    let result = driver.execute(plan, &mut ledger, &uploader, &pb).await;
    pb.finish_and_clear();

    let summary = result?;
    print_summary(&summary, &ledger);

    Ok(())
}

fn print_plan(plan: &RunPlan) {
    println!("  Objects listed:   {}", plan.listed);
    if plan.filtered_out > 0 {
        println!("  Filtered out:     {}", plan.filtered_out);
    }
    println!("  Already uploaded: {}", plan.already_uploaded);
    if plan.deferred > 0 {
        println!("  Deferred:         {} (sample_size)", plan.deferred);
    }
}

fn print_summary(summary: &RunSummary, ledger: &UploadLedger) {
    println!();
    println!("{}", "Summary:".cyan().bold());
    println!("  Uploaded:       {}", summary.uploaded.to_string().green());
    println!("  Duplicates:     {}", summary.duplicates);

    if summary.has_failures() {
        println!("  Failed:         {}", summary.failed.to_string().red());
        println!("  Signing errors: {}", summary.signing_errors.to_string().red());
        println!();
        for failure in &summary.failures {
            println!("  {} {}: {}", "✗".red(), failure.object_id, failure.reason);
        }
        println!();
        println!("Failed objects stay out of the ledger and are retried on the next run.");
    } else {
        println!();
        println!("{} All {} object(s) recorded", "✓".green().bold(), summary.recorded());
    }

    println!("Ledger saved: {} ({} entries)", ledger.path().display(), ledger.len());
}

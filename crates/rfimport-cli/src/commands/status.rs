//! `rfimport status` command implementation
//!
//! Compares the bucket listing with the ledger without uploading anything.

use crate::commands::build_driver;
use crate::config::Config;
use crate::error::Result;
use crate::ledger::UploadLedger;
use crate::progress;
use colored::Colorize;
use std::path::Path;

/// Show how much of the bucket is already imported
pub async fn run(config_path: &Path, verbose: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let ledger = UploadLedger::load(&config.uploaded_images_file)?;
    let driver = build_driver(&config).await?;

    let spinner = progress::create_spinner(
        &format!("Listing {} bucket '{}'...", config.provider, config.bucket_name),
        !verbose,
    );
    let plan = driver.plan(&ledger).await;
    spinner.finish_and_clear();
    let plan = plan?;

    println!("{}", "Import Status:".cyan().bold());
    println!();
    println!("  Bucket:           {} ({})", config.bucket_name, config.provider);
    println!("  Project:          {}", config.roboflow.project_name);
    println!("  Ledger:           {}", config.uploaded_images_file.display());
    println!();
    println!("  Objects listed:   {}", plan.listed);
    println!("  Filtered out:     {}", plan.filtered_out);
    println!("  Already uploaded: {}", plan.already_uploaded);
    println!("  Ledger entries:   {}", ledger.len());

    let outstanding = plan.outstanding();
    if outstanding == 0 {
        println!("  Pending:          {}", "0".green());
        println!();
        println!("{} Everything is imported", "✓".green());
    } else {
        println!("  Pending:          {}", outstanding.to_string().yellow());
        if let Some(limit) = config.sample_size {
            println!("  Next run uploads: {} (sample_size {})", plan.pending.len(), limit);
        }
        println!();
        println!("Run 'rfimport run' to upload pending objects.");
    }

    Ok(())
}

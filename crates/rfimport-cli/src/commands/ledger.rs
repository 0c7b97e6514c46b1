//! `rfimport ledger` command implementation

use crate::config::Config;
use crate::error::Result;
use crate::ledger::UploadLedger;
use colored::Colorize;
use rfimport_common::ObjectId;
use std::path::Path;

/// Print every recorded object key
pub async fn list(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let ledger = UploadLedger::load(&config.uploaded_images_file)?;

    if ledger.is_empty() {
        println!("Ledger is empty: {}", ledger.path().display());
        return Ok(());
    }

    for id in ledger.iter() {
        println!("{}", id);
    }

    Ok(())
}

/// Drop keys from the ledger so the next run uploads them again
pub async fn forget(config_path: &Path, ids: &[String]) -> Result<()> {
    let config = Config::load(config_path)?;
    let mut ledger = UploadLedger::load(&config.uploaded_images_file)?;

    let mut removed = 0usize;
    for raw in ids {
        let id = ObjectId::new(raw.as_str())?;
        if ledger.remove(&id) {
            removed += 1;
            println!("{} Forgot {}", "✓".green(), id);
        } else {
            println!("{} Not in ledger: {}", "!".yellow(), id);
        }
    }

    if removed > 0 {
        ledger.save()?;
        tracing::info!(removed, path = %ledger.path().display(), "Removed ledger entries");
    }

    Ok(())
}

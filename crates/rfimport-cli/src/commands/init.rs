//! `rfimport init` command implementation
//!
//! Writes a commented starter config for the chosen provider.

use crate::config::{self, Provider};
use crate::error::{CliError, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Write a config template to `path`
pub async fn run(path: &Path, provider: Provider, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::AlreadyInitialized(path.display().to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, config::template(provider))?;

    tracing::info!(path = %path.display(), %provider, "Wrote config template");

    println!("{} Created {} ({})", "✓".green(), path.display(), provider);
    println!();
    println!("Next steps:");
    println!("  1. Set bucket_name and the {} credentials", provider);
    println!("  2. Set roboflow.api_key and roboflow.project_name");
    println!("     (or ROBOFLOW_API_KEY / ROBOFLOW_PROJECT_NAME)");
    println!("  3. Preview with 'rfimport run --dry-run'");

    Ok(())
}

//! Build automation tasks for rfimport
//!
//! Currently generates the CLI reference from the clap definitions.

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for rfimport", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<rfimport_cli::Cli>();

    let content = format!(
        r#"# rfimport CLI Reference

This file is generated from the CLI source with `cargo xtask generate-cli-docs`.

## Quick Start

```bash
# Write a starter config for your provider
rfimport init --provider s3

# Preview what would be uploaded
rfimport run --dry-run

# Upload at most 50 new images to the validation split
rfimport run --sample-size 50 --split valid

# Compare bucket and ledger
rfimport status
```

## Commands

{}

## Environment Variables

- `RFIMPORT_CONFIG` - Config file path (default: `config.yaml`)
- `ROBOFLOW_API_KEY`, `ROBOFLOW_PROJECT_NAME`, `ROBOFLOW_API_URL` - Override the `roboflow` block
- `AZURE_STORAGE_CONNECTION_STRING`, `AZURE_STORAGE_ACCOUNT`, `AZURE_STORAGE_KEY` - Azure credentials
- `GOOGLE_APPLICATION_CREDENTIALS` - GCS service account JSON
- `AWS_*` - Standard AWS credential chain for S3
- `RFIMPORT_LOG_LEVEL`, `RFIMPORT_LOG_OUTPUT`, `RFIMPORT_LOG_FORMAT`, `RFIMPORT_LOG_DIR`, `RFIMPORT_LOG_FILTER` - Logging

## Upload Ledger

Uploaded object keys are stored as a JSON array in `uploaded_images_file`
(default `uploaded_images.json`). Objects that fail to upload are left out and
retried on the next run. Use `rfimport ledger forget <key>` to force a re-upload.
"#,
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content).with_context(|| format!("writing {}", file_path.display()))?;

    println!("✓ Generated CLI documentation at: {}", file_path.display());

    Ok(())
}

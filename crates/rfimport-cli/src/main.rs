//! rfimport CLI - Main entry point

use clap::Parser;
use rfimport_cli::commands::run::RunOptions;
use rfimport_cli::{Cli, Commands, LedgerCommand};
use rfimport_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    let Some(ref command) = cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    // Verbose mode logs debug to the console; otherwise only warnings surface
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("rfimport")
        .build();

    // Environment variables take precedence
    let log_config = log_config.with_env_overrides().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring invalid RFIMPORT_LOG_* setting: {:#}", e);
        LogConfig::builder()
            .level(level)
            .output(LogOutput::Console)
            .build()
    });

    // The CLI still works without logging; the guard flushes file output on exit
    let _guard = init_logging(&log_config).ok().flatten();

    if let Err(e) = execute_command(&cli, command).await {
        error!(error = %e, fatal = e.is_fatal(), "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, command: &Commands) -> rfimport_cli::Result<()> {
    match command {
        Commands::Init {
            path,
            provider,
            force,
        } => {
            let path = path.as_ref().unwrap_or(&cli.config);
            rfimport_cli::commands::init::run(path, *provider, *force).await
        }

        Commands::Run {
            sample_size,
            split,
            dry_run,
        } => {
            let options = RunOptions {
                sample_size: *sample_size,
                split: split.clone(),
                dry_run: *dry_run,
                verbose: cli.verbose,
            };
            rfimport_cli::commands::run::run(&cli.config, options).await
        }

        Commands::Status => rfimport_cli::commands::status::run(&cli.config, cli.verbose).await,

        Commands::Ledger { command } => match command {
            LedgerCommand::List => rfimport_cli::commands::ledger::list(&cli.config).await,
            LedgerCommand::Forget { ids } => {
                rfimport_cli::commands::ledger::forget(&cli.config, ids).await
            }
        },
    }
}

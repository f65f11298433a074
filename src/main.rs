// file: src/main.rs
// version: 1.0.0
// guid: 7df49efd-d0a8-4b5c-9f82-6c0e55f7ad04

//! Debian install agent - Main entry point

use clap::Parser;
use debian_install_agent::{
    cli::{args::Cli, commands::*},
    logging::{logger, DEFAULT_LOG_FILE},
    Result,
};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; a real install always keeps a file log so the run
    // (including the generated root password) survives the live session
    let log_file: Option<PathBuf> = cli
        .log_file
        .clone()
        .map(PathBuf::from)
        .or_else(|| match &cli.command {
            debian_install_agent::cli::args::Commands::Install { dry_run: false, .. } => {
                Some(PathBuf::from(DEFAULT_LOG_FILE))
            }
            _ => None,
        });
    logger::init_logger(cli.verbose, cli.quiet, log_file.as_deref())?;

    // A half-finished install can leave the target tree mounted
    let cleanup_root = match &cli.command {
        debian_install_agent::cli::args::Commands::Install {
            mount_root,
            dry_run: false,
            ..
        } => Some(mount_root.clone()),
        _ => None,
    };

    // Set up signal handling for graceful shutdown
    let shutdown_signal = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        warn!("Received Ctrl+C, initiating graceful shutdown...");
        cleanup_on_exit(cleanup_root).await;
    };

    // Execute command with signal handling
    let command_future = async {
        match cli.command {
            debian_install_agent::cli::args::Commands::Install {
                config,
                mount_root,
                dry_run,
                reboot,
                status_webhook,
            } => {
                install_command(
                    &config,
                    &mount_root,
                    dry_run,
                    reboot,
                    status_webhook,
                    cli.quiet,
                )
                .await
            }
            debian_install_agent::cli::args::Commands::CheckPrereqs => {
                check_prerequisites_command().await
            }
            debian_install_agent::cli::args::Commands::List { kind, json } => {
                list_command(kind, json).await
            }
        }
    };

    // Run command with signal handling
    tokio::select! {
        result = command_future => result,
        _ = shutdown_signal => {
            warn!("Application interrupted by user");
            std::process::exit(130); // Standard exit code for Ctrl+C
        }
    }
}

/// Cleanup function called on exit
async fn cleanup_on_exit(mount_root: Option<String>) {
    info!("Performing cleanup on exit...");

    if let Some(root) = mount_root {
        let _ = tokio::process::Command::new("umount")
            .args(["-R", &root])
            .output()
            .await;
    }

    info!("Cleanup completed");
}

// file: src/cli/args.rs
// version: 1.0.0
// guid: 05be2989-ee69-46bf-971d-b6e78164c58c

//! Command line argument definitions

use crate::installer::DEFAULT_MOUNT_ROOT;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "debian-install-agent")]
#[command(about = "Guided Debian installation onto a target disk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true, help = "Also write logs to this file")]
    pub log_file: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install Debian onto the disk described by a configuration file
    Install {
        #[arg(short, long, help = "Path to the YAML installation configuration")]
        config: String,

        #[arg(long, default_value = DEFAULT_MOUNT_ROOT, help = "Directory the target filesystem is assembled under")]
        mount_root: String,

        #[arg(long, help = "Validate the configuration and show the plan without touching the disk")]
        dry_run: bool,

        #[arg(long, help = "Reboot the machine after a successful installation")]
        reboot: bool,

        #[arg(long, help = "POST every progress update to this URL as JSON")]
        status_webhook: Option<String>,
    },

    /// Check system prerequisites
    CheckPrereqs,

    /// List installation choices visible from this host
    List {
        #[arg(value_enum, help = "Which inventory to print")]
        kind: ListKind,

        #[arg(short, long)]
        json: bool,
    },
}

/// Host inventories the `list` subcommand can print
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ListKind {
    Disks,
    Locales,
    Keymaps,
    Timezones,
    WifiNetworks,
}

// file: src/cli/commands.rs
// version: 1.0.0
// guid: 148b468b-9e6c-4c4e-88ea-52b22a0a0b3d

//! Command implementations for the CLI

use crate::{
    cli::args::ListKind,
    config::ConfigLoader,
    error::InstallError,
    executor::{CommandRunner, SystemCommandRunner},
    installer::{disk::PartitionPlan, Installer},
    reporter::{ChannelSink, FanoutSink, ProgressSink, ProgressUpdate, StatusReporter, WebhookSink},
    utils::{system::SystemUtils, SystemProbe},
    Result,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Run a full installation from a configuration file
pub async fn install_command(
    config_path: &str,
    mount_root: &str,
    dry_run: bool,
    reboot: bool,
    status_webhook: Option<String>,
    quiet: bool,
) -> Result<()> {
    let loader = ConfigLoader::new();
    let config = loader.load_install_config(config_path)?;

    if dry_run {
        let plan = PartitionPlan::for_disk(&config.disk);
        info!(
            "DRY RUN: Would install Debian {} from {}",
            config.release, config.mirror
        );
        info!(
            "  Disk: {} (EFI {}, root {})",
            plan.disk, plan.efi_partition, plan.root_partition
        );
        info!("  Hostname: {}, user: {}", config.hostname, config.username);
        info!(
            "  Locale: {}, keymap: {}, timezone: {}",
            config.locale, config.keyboard, config.timezone
        );
        if config.wifi_configured() {
            info!("  WiFi network: {}", config.wifi_ssid);
        }
        info!("  Mount root: {}", mount_root);
        return Ok(());
    }

    if !SystemUtils::is_root() {
        return Err(InstallError::validation("Installation must be run as root"));
    }

    let missing = SystemUtils::missing_prerequisites();
    if !missing.is_empty() {
        return Err(InstallError::validation(format!(
            "Missing required tools: {} (run check-prereqs for details)",
            missing.join(", ")
        )));
    }

    if !Path::new(&config.disk).exists() {
        return Err(InstallError::validation(format!(
            "Disk {} does not exist",
            config.disk
        )));
    }

    let mut sinks: Vec<Arc<dyn ProgressSink>> = Vec::new();
    let mut bar_task = None;
    if !quiet {
        let (sink, rx) = ChannelSink::new();
        sinks.push(Arc::new(sink));
        bar_task = Some(tokio::spawn(drive_progress_bar(rx)));
    }
    if let Some(url) = &status_webhook {
        sinks.push(Arc::new(WebhookSink::new(url.clone())?));
    }
    let reporter = match sinks.len() {
        0 | 1 => StatusReporter::new(sinks.pop()),
        _ => StatusReporter::new(Some(Arc::new(FanoutSink::new(sinks)))),
    };

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
    let installer = Installer::new(config, runner, reporter).with_mount_root(mount_root);

    info!("Starting installation session {}", installer.session_id());
    let result = installer.run().await;

    // The channel closes once the installer (and its sink) is gone.
    drop(installer);
    if let Some(task) = bar_task {
        let _ = task.await;
    }
    result?;

    info!("Installation complete");
    if reboot {
        info!("Rebooting into the installed system");
        SystemUtils::reboot().await;
    }

    Ok(())
}

/// Render progress updates as a terminal progress bar
async fn drive_progress_bar(mut rx: mpsc::UnboundedReceiver<ProgressUpdate>) {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    while let Some(update) = rx.recv().await {
        if update.is_failure() {
            pb.abandon_with_message(update.message);
            return;
        }
        pb.set_position(update.percent.max(0) as u64);
        if update.percent >= 100 {
            pb.finish_with_message(update.message);
            return;
        }
        pb.set_message(update.message);
    }

    pb.finish_and_clear();
}

/// Check system prerequisites
pub async fn check_prerequisites_command() -> Result<()> {
    info!("Checking system prerequisites for Debian installation");

    let mut missing: Vec<&str> = Vec::new();
    for (tool, available) in SystemUtils::check_prerequisites() {
        if available {
            info!("✓ {}", tool);
        } else {
            error!("✗ {} (not found in PATH)", tool);
            missing.push(tool);
        }
    }

    if !missing.is_empty() {
        info!("Install missing packages:");
        for tool in &missing {
            match *tool {
                "sgdisk" => info!("  sudo apt install gdisk"),
                "parted" | "partprobe" => info!("  sudo apt install parted"),
                "mkfs.fat" => info!("  sudo apt install dosfstools"),
                "mkfs.ext4" => info!("  sudo apt install e2fsprogs"),
                "debootstrap" => info!("  sudo apt install debootstrap"),
                "grub-install" | "update-grub" => info!("  sudo apt install grub-efi"),
                "nmcli" => info!("  sudo apt install network-manager"),
                "blkid" => info!("  sudo apt install util-linux"),
                _ => {}
            }
        }
    }

    if SystemUtils::is_root() {
        info!("✓ Running as root - disk operations available");
    } else {
        info!("⚠ Not running as root - the install command will refuse to start");
    }

    if Path::new("/sys/firmware/efi").exists() {
        info!("✓ Booted in EFI mode");
    } else {
        info!("⚠ Not booted in EFI mode - bootloader installation expects EFI firmware");
    }

    if missing.is_empty() {
        info!("System is ready to run an installation");
        Ok(())
    } else {
        Err(InstallError::validation(format!(
            "Missing {} required tools",
            missing.len()
        )))
    }
}

/// List installation choices visible from this host
pub async fn list_command(kind: ListKind, json_output: bool) -> Result<()> {
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());
    let probe = SystemProbe::new(runner);

    match kind {
        ListKind::Disks => {
            let disks = probe.disks().await;
            if json_output {
                println!("{}", serde_json::to_string_pretty(&disks)?);
            } else {
                if disks.is_empty() {
                    info!("No candidate disks found");
                    return Ok(());
                }

                println!("Candidate Disks:");
                println!("{:<16} {:<10} {}", "Device", "Size", "Model");
                println!("{:-<48}", "");
                for disk in &disks {
                    println!("{:<16} {:<10} {}", disk.name, disk.size, disk.model);
                }

                info!("Found {} disks", disks.len());
            }
        }
        ListKind::Locales => {
            let locales = probe.locales();
            if json_output {
                println!("{}", serde_json::to_string_pretty(&locales)?);
            } else {
                for locale in &locales {
                    println!("{:<16} {}", locale.code, locale.display);
                }
            }
        }
        ListKind::Keymaps => {
            let keymaps = probe.keymaps().await;
            print_names(&keymaps, json_output)?;
        }
        ListKind::Timezones => {
            let timezones = probe.timezones();
            print_names(&timezones, json_output)?;
        }
        ListKind::WifiNetworks => {
            let networks = probe.wifi_networks().await;
            if networks.is_empty() && !json_output {
                info!("No WiFi networks visible");
                return Ok(());
            }
            print_names(&networks, json_output)?;
        }
    }

    Ok(())
}

fn print_names(items: &[String], json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}

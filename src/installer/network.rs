// file: src/installer/network.rs
// version: 1.0.0
// guid: bb9a3941-addc-4656-b097-ab6b20eab803

//! Network profile carry-over into the target.
//!
//! The installer does not write wireless secrets itself; it copies the
//! host's saved NetworkManager connection profiles so a live-system network
//! setup survives into the installed system. The whole stage is best-effort
//! and can never fail an installation.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::InstallConfig;
use crate::error::Result;

const CONNECTIONS_DIR: &str = "/etc/NetworkManager/system-connections";

/// Copies saved connection profiles when Wi-Fi credentials were supplied
pub struct NetworkConfigurator {
    enabled: bool,
    wifi_ssid: String,
    connections_dir: PathBuf,
}

impl NetworkConfigurator {
    pub fn new(config: &InstallConfig) -> Self {
        Self {
            enabled: config.wifi_configured(),
            wifi_ssid: config.wifi_ssid.clone(),
            connections_dir: PathBuf::from(CONNECTIONS_DIR),
        }
    }

    /// Override the profile source directory
    pub fn with_connections_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.connections_dir = dir.into();
        self
    }

    /// Carry the host's connection profiles into the target. A no-op unless
    /// both Wi-Fi fields were configured; any failure is logged and ignored.
    pub async fn configure(&self, mount_root: &Path) -> Result<()> {
        if !self.enabled {
            debug!("No Wi-Fi credentials configured, skipping network carry-over");
            return Ok(());
        }

        if !self.connections_dir.exists() {
            debug!(
                "No saved NetworkManager profiles at {}",
                self.connections_dir.display()
            );
            return Ok(());
        }

        info!("Carrying over network profiles for {}", self.wifi_ssid);

        let profile_root = mount_root.join("etc/NetworkManager");
        let destination = profile_root.join("system-connections");
        if let Err(e) = tokio::fs::create_dir_all(&profile_root).await {
            warn!("Could not create network profile directory: {}", e);
            return Ok(());
        }

        let from = self.connections_dir.clone();
        let copied = tokio::task::spawn_blocking(move || {
            let mut options = fs_extra::dir::CopyOptions::new();
            options.overwrite = true;
            options.copy_inside = true;
            fs_extra::dir::copy(&from, &destination, &options)
        })
        .await;

        match copied {
            Ok(Ok(bytes)) => info!("Copied saved network profiles ({} bytes)", bytes),
            Ok(Err(e)) => warn!("Could not copy network profiles: {}", e),
            Err(e) => warn!("Network profile copy task failed: {}", e),
        }

        Ok(())
    }
}

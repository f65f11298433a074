// file: src/installer/system.rs
// version: 1.0.0
// guid: ae49194b-7b18-4221-959f-a0168b004ed7

//! Locale, timezone, keymap, and hostname configuration inside the target.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::info;

use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::executor::{CommandRequest, CommandRunner};

/// Writes the target's identity files and regenerates its locales
pub struct SystemConfigurator {
    runner: Arc<dyn CommandRunner>,
    locale: String,
    keyboard: String,
    timezone: String,
    hostname: String,
}

impl SystemConfigurator {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &InstallConfig) -> Self {
        Self {
            runner,
            locale: config.locale.clone(),
            keyboard: config.keyboard.clone(),
            timezone: config.timezone.clone(),
            hostname: config.hostname.clone(),
        }
    }

    /// Apply locale, timezone, console keymap, hostname, and hosts entries.
    /// Every step is fatal; a half-configured system is not bootable enough
    /// to be worth continuing with.
    pub async fn configure(&self, mount_root: &Path) -> Result<()> {
        info!(
            "Configuring system: locale={} keymap={} timezone={} hostname={}",
            self.locale, self.keyboard, self.timezone, self.hostname
        );

        self.write_file(
            mount_root.join("etc/locale.gen"),
            format!("{} UTF-8\n", self.locale),
        )
        .await?;
        self.runner
            .run(&CommandRequest::chroot(mount_root, ["locale-gen"]))
            .await?;

        self.write_file(
            mount_root.join("etc/timezone"),
            format!("{}\n", self.timezone),
        )
        .await?;
        let zoneinfo = format!("/usr/share/zoneinfo/{}", self.timezone);
        self.runner
            .run(&CommandRequest::chroot(
                mount_root,
                ["ln", "-sf", zoneinfo.as_str(), "/etc/localtime"],
            ))
            .await?;

        self.write_file(
            mount_root.join("etc/vconsole.conf"),
            format!("KEYMAP={}\n", self.keyboard),
        )
        .await?;

        self.write_file(
            mount_root.join("etc/hostname"),
            format!("{}\n", self.hostname),
        )
        .await?;

        let hosts = format!(
            "127.0.0.1\tlocalhost\n127.0.1.1\t{}\n::1\t\tlocalhost ip6-localhost ip6-loopback\n",
            self.hostname
        );
        self.write_file(mount_root.join("etc/hosts"), hosts).await?;

        Ok(())
    }

    async fn write_file(&self, path: PathBuf, contents: String) -> Result<()> {
        fs::write(&path, contents)
            .await
            .map_err(|e| InstallError::file_write(path, e))
    }
}

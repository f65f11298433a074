// file: src/installer/bootloader.rs
// version: 1.0.0
// guid: 8fe2450e-9977-4a45-b39d-294b4eac8f61

//! GRUB installation inside the target system.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::{Architecture, InstallConfig};
use crate::error::Result;
use crate::executor::{CommandRequest, CommandRunner};

/// Installs the EFI bootloader into the mounted target
pub struct BootloaderInstaller {
    runner: Arc<dyn CommandRunner>,
    architecture: Architecture,
    disk: String,
}

impl BootloaderInstaller {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &InstallConfig) -> Self {
        Self {
            runner,
            architecture: config.architecture,
            disk: config.disk.clone(),
        }
    }

    /// Install GRUB for the configured architecture. Every step is fatal:
    /// a target without a bootloader is not an installed system.
    pub async fn install(&self, mount_root: &Path) -> Result<()> {
        info!(
            "Installing GRUB ({}) on {}",
            self.architecture.grub_target(),
            self.disk
        );

        self.runner
            .run(&CommandRequest::chroot(mount_root, ["apt-get", "update"]))
            .await?;

        let mut install = vec![
            "apt-get".to_string(),
            "install".to_string(),
            "-y".to_string(),
        ];
        install.extend(
            self.architecture
                .grub_packages()
                .iter()
                .map(|package| package.to_string()),
        );
        self.runner
            .run(&CommandRequest::chroot(mount_root, install))
            .await?;

        let target = format!("--target={}", self.architecture.grub_target());
        self.runner
            .run(&CommandRequest::chroot(
                mount_root,
                [
                    "grub-install",
                    target.as_str(),
                    "--efi-directory=/boot/efi",
                    "--bootloader-id=GRUB",
                    self.disk.as_str(),
                ],
            ))
            .await?;

        self.runner
            .run(&CommandRequest::chroot(mount_root, ["update-grub"]))
            .await?;

        info!("Bootloader installed");
        Ok(())
    }
}

// file: src/installer/bootstrap.rs
// version: 1.0.0
// guid: 8f3693a7-1c71-4e0d-8b58-1be56c4d698f

//! Base system bootstrap via debootstrap.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{Architecture, InstallConfig};
use crate::error::Result;
use crate::executor::{CommandRequest, CommandRunner};

/// debootstrap downloads and unpacks an entire base system; it gets a far
/// longer leash than any other command in the pipeline.
pub const BOOTSTRAP_TIMEOUT_SECS: u64 = 1800;

/// Runs debootstrap against the mounted target
pub struct BaseSystemInstaller {
    runner: Arc<dyn CommandRunner>,
    release: String,
    mirror: String,
    architecture: Architecture,
}

impl BaseSystemInstaller {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &InstallConfig) -> Self {
        Self {
            runner,
            release: config.release.clone(),
            mirror: config.mirror.clone(),
            architecture: config.architecture,
        }
    }

    /// Bootstrap the configured release into the mount root
    pub async fn install(&self, mount_root: &Path) -> Result<()> {
        info!(
            "Bootstrapping Debian {} ({}) from {}",
            self.release,
            self.architecture.as_str(),
            self.mirror
        );

        let arch_flag = format!("--arch={}", self.architecture.as_str());
        let mount = mount_root.display().to_string();
        self.runner
            .run(
                &CommandRequest::new([
                    "debootstrap",
                    arch_flag.as_str(),
                    self.release.as_str(),
                    mount.as_str(),
                    self.mirror.as_str(),
                ])
                .with_timeout(Duration::from_secs(BOOTSTRAP_TIMEOUT_SECS)),
            )
            .await?;

        info!("Base system installed into {}", mount_root.display());
        Ok(())
    }
}

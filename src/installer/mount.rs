// file: src/installer/mount.rs
// version: 1.0.0
// guid: 971aca89-cb41-49db-9aee-4b80de81777d

//! Mount management for the installation target tree.

use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{InstallError, Result};
use crate::executor::{CommandRequest, CommandRunner};
use crate::installer::disk::PartitionPlan;

/// Mounts the freshly formatted partitions under the mount root
pub struct SystemMounter {
    runner: Arc<dyn CommandRunner>,
}

impl SystemMounter {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Mount root first, then the EFI partition inside it. The EFI mount
    /// point only exists once the root filesystem is mounted, so the order
    /// is load-bearing.
    pub async fn mount_partitions(&self, plan: &PartitionPlan, mount_root: &Path) -> Result<()> {
        fs::create_dir_all(mount_root)
            .await
            .map_err(|e| InstallError::file_write(mount_root, e))?;
        self.runner
            .run(&CommandRequest::new([
                "mount",
                plan.root_partition.as_str(),
                &mount_root.display().to_string(),
            ]))
            .await?;

        let efi_dir = mount_root.join("boot/efi");
        fs::create_dir_all(&efi_dir)
            .await
            .map_err(|e| InstallError::file_write(&efi_dir, e))?;
        self.runner
            .run(&CommandRequest::new([
                "mount",
                plan.efi_partition.as_str(),
                &efi_dir.display().to_string(),
            ]))
            .await?;

        debug!("Mounted {} at {}", plan.root_partition, mount_root.display());
        Ok(())
    }

    /// Recursively unmount the whole target tree. Best-effort: a busy or
    /// already-empty tree is logged and left alone.
    pub async fn unmount_all(&self, mount_root: &Path) {
        let request = CommandRequest::new(["umount", "-R", &mount_root.display().to_string()])
            .tolerate_failure();
        match self.runner.run(&request).await {
            Ok(result) if !result.success() => {
                warn!(
                    "Recursive unmount of {} incomplete: {}",
                    mount_root.display(),
                    result.stderr.trim()
                );
            }
            Err(e) => warn!("Recursive unmount of {} failed: {}", mount_root.display(), e),
            Ok(_) => debug!("Unmounted {}", mount_root.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mounts_root_before_efi() {
        let dir = TempDir::new().unwrap();
        let mount_root = dir.path().join("mnt");
        let runner = Arc::new(ScriptedRunner::new());
        let mounter = SystemMounter::new(runner.clone());
        let plan = PartitionPlan::for_disk("/dev/sda");

        mounter
            .mount_partitions(&plan, &mount_root)
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(
            commands,
            vec![
                format!("mount /dev/sda2 {}", mount_root.display()),
                format!("mount /dev/sda1 {}/boot/efi", mount_root.display()),
            ]
        );
        assert!(mount_root.join("boot/efi").is_dir());
    }

    #[tokio::test]
    async fn test_root_mount_failure_stops_before_efi() {
        let dir = TempDir::new().unwrap();
        let mount_root = dir.path().join("mnt");
        let runner = Arc::new(ScriptedRunner::new().fail_on("mount /dev/sda2", "wrong fs type"));
        let mounter = SystemMounter::new(runner.clone());
        let plan = PartitionPlan::for_disk("/dev/sda");

        assert!(mounter.mount_partitions(&plan, &mount_root).await.is_err());
        assert_eq!(runner.commands().len(), 1);
    }

    #[tokio::test]
    async fn test_unmount_failure_is_swallowed() {
        let runner = Arc::new(ScriptedRunner::new().fail_on("umount", "target is busy"));
        let mounter = SystemMounter::new(runner.clone());

        mounter.unmount_all(Path::new("/mnt")).await;
        assert_eq!(runner.commands(), vec!["umount -R /mnt".to_string()]);
    }
}

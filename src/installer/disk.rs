// file: src/installer/disk.rs
// version: 1.0.0
// guid: 03f4efce-3377-483d-bf77-8ae85a12825c

//! Disk partitioning and formatting for the installation target.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::executor::{CommandRequest, CommandRunner};
use crate::reporter::StatusReporter;

/// Partition layout derived from the target disk.
///
/// The mapping is fixed: partition 1 is the 512 MiB EFI system partition,
/// partition 2 is the root filesystem over the remaining space, and the
/// partition device names are always the disk path with `1`/`2` appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    pub disk: String,
    pub efi_partition: String,
    pub root_partition: String,
}

impl PartitionPlan {
    pub fn for_disk(disk: &str) -> Self {
        Self {
            disk: disk.to_string(),
            efi_partition: format!("{disk}1"),
            root_partition: format!("{disk}2"),
        }
    }
}

/// Repartitions and formats the target disk
pub struct DiskPreparer {
    runner: Arc<dyn CommandRunner>,
}

impl DiskPreparer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Wipe the disk and build the EFI + root layout.
    ///
    /// Everything before formatting is destructive to the partition table
    /// only; the mkfs calls are the point of no return for old data. The
    /// mid-stage formatting milestone is reported from here because the
    /// partition nodes must exist before it makes sense.
    pub async fn prepare_disk(
        &self,
        disk: &str,
        reporter: &StatusReporter,
    ) -> Result<PartitionPlan> {
        let plan = PartitionPlan::for_disk(disk);
        info!("Preparing disk {} for installation", disk);

        self.unmount_existing(&plan).await;

        self.runner
            .run(&CommandRequest::new(["sgdisk", "--zap-all", disk]))
            .await?;

        self.runner
            .run(&CommandRequest::new([
                "parted", disk, "mklabel", "gpt", "--script",
            ]))
            .await?;
        self.runner
            .run(&CommandRequest::new([
                "parted", disk, "mkpart", "primary", "fat32", "1MiB", "513MiB", "--script",
            ]))
            .await?;
        self.runner
            .run(&CommandRequest::new([
                "parted", disk, "set", "1", "esp", "on", "--script",
            ]))
            .await?;
        self.runner
            .run(&CommandRequest::new([
                "parted", disk, "mkpart", "primary", "ext4", "513MiB", "100%", "--script",
            ]))
            .await?;

        if let Err(e) = self
            .runner
            .run(&CommandRequest::new(["partprobe", disk]))
            .await
        {
            warn!("partprobe failed on {}: {}", disk, e);
        }
        // Give udev a moment to create the new partition nodes.
        tokio::time::sleep(Duration::from_secs(1)).await;

        reporter.update("Formatting partitions...", 20);
        self.runner
            .run(&CommandRequest::new([
                "mkfs.fat",
                "-F32",
                plan.efi_partition.as_str(),
            ]))
            .await?;
        self.runner
            .run(&CommandRequest::new([
                "mkfs.ext4",
                "-F",
                plan.root_partition.as_str(),
            ]))
            .await?;

        info!(
            "Disk prepared: EFI partition {} / root partition {}",
            plan.efi_partition, plan.root_partition
        );
        Ok(plan)
    }

    /// Unmount anything still mounted from a previous attempt. A clean disk
    /// makes every command here fail, which is the normal case.
    async fn unmount_existing(&self, plan: &PartitionPlan) {
        for device in [
            plan.efi_partition.as_str(),
            plan.root_partition.as_str(),
            plan.disk.as_str(),
        ] {
            let request = CommandRequest::new(["umount", "-f", device]).tolerate_failure();
            if let Err(e) = self.runner.run(&request).await {
                debug!("Unmount of {} skipped: {}", device, e);
            }
        }
    }
}

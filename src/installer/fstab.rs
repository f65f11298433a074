// file: src/installer/fstab.rs
// version: 1.0.0
// guid: f8ae97e0-7285-482b-8eae-4c06dbc9fff7

//! Filesystem table generation for the installed system.
//!
//! Partitions are identified by UUID where `blkid` can report one; when the
//! probe comes back empty the raw device path is written instead so the
//! target still boots.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{InstallError, Result};
use crate::executor::{CommandRequest, CommandRunner};
use crate::installer::disk::PartitionPlan;

/// blkid probes answer quickly or not at all
const BLKID_TIMEOUT_SECS: u64 = 10;

const FSTAB_HEADER: &str = "\
# /etc/fstab: static file system information.
#
# Use 'blkid' to print the universally unique identifier for a
# device; this may be used with UUID= as a more robust way to name devices
# that works even if disks are added and removed. See fstab(5).
#
# <file system>             <mount point>   <type>  <options>       <dump>  <pass>
";

const TMPFS_BLOCK: &str = "\
\n# tmpfs for temporary files
tmpfs                     /tmp            tmpfs   defaults,noatime,mode=1777  0  0
";

/// Writes `/etc/fstab` into the mounted target
pub struct FstabGenerator {
    runner: Arc<dyn CommandRunner>,
}

impl FstabGenerator {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub async fn generate(&self, mount_root: &Path, plan: &PartitionPlan) -> Result<()> {
        let root_uuid = self.probe(&plan.root_partition, "UUID").await;
        let root_fstype = self
            .probe(&plan.root_partition, "TYPE")
            .await
            .unwrap_or_else(|| "ext4".to_string());
        let efi_uuid = self.probe(&plan.efi_partition, "UUID").await;
        let efi_fstype = self.probe(&plan.efi_partition, "TYPE").await;

        let content = render_fstab(
            plan,
            root_uuid.as_deref(),
            &root_fstype,
            efi_uuid.as_deref(),
            efi_fstype.as_deref(),
        );

        let path = mount_root.join("etc/fstab");
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| InstallError::file_write(&path, e))?;
        info!("Generated fstab: {}", path.display());
        Ok(())
    }

    /// Ask blkid for a single tag value. Any failure, including timeout,
    /// reads as "unknown".
    async fn probe(&self, device: &str, tag: &str) -> Option<String> {
        let request = CommandRequest::new(["blkid", "-s", tag, "-o", "value", device])
            .with_timeout(Duration::from_secs(BLKID_TIMEOUT_SECS))
            .tolerate_failure();
        match self.runner.run(&request).await {
            Ok(result) if result.success() => {
                let value = result.stdout.trim().to_string();
                if value.is_empty() {
                    None
                } else {
                    Some(value)
                }
            }
            Ok(_) => None,
            Err(e) => {
                debug!("blkid probe failed for {}: {}", device, e);
                None
            }
        }
    }
}

fn render_fstab(
    plan: &PartitionPlan,
    root_uuid: Option<&str>,
    root_fstype: &str,
    efi_uuid: Option<&str>,
    efi_fstype: Option<&str>,
) -> String {
    let mut content = String::from(FSTAB_HEADER);

    match root_uuid {
        Some(uuid) => {
            content.push_str(&format!(
                "UUID={}     /               {}    defaults        0       1\n",
                uuid, root_fstype
            ));
        }
        None => {
            content.push_str(&format!(
                "{}        /               {}    defaults        0       1\n",
                plan.root_partition, root_fstype
            ));
        }
    }

    // The EFI line only makes sense for the FAT filesystem we created; if
    // the probe reports anything else the partition is left out entirely.
    if matches!(efi_fstype, Some("vfat") | Some("fat32")) {
        match efi_uuid {
            Some(uuid) => {
                content.push_str(&format!(
                    "UUID={}     /boot/efi       vfat    defaults        0       2\n",
                    uuid
                ));
            }
            None => {
                content.push_str(&format!(
                    "{}        /boot/efi       vfat    defaults        0       2\n",
                    plan.efi_partition
                ));
            }
        }
    }

    content.push_str(TMPFS_BLOCK);
    content
}

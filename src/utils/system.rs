// file: src/utils/system.rs
// version: 1.0.0
// guid: 58d46fbb-fd38-465f-8193-05edb22a9b67

//! Host system checks and actions.

use tracing::{info, warn};

/// External tools the installation pipeline shells out to
pub const REQUIRED_TOOLS: &[&str] = &[
    "sgdisk",
    "parted",
    "partprobe",
    "mkfs.fat",
    "mkfs.ext4",
    "mount",
    "umount",
    "debootstrap",
    "chroot",
    "grub-install",
    "update-grub",
    "blkid",
    "nmcli",
];

/// System utility functions
pub struct SystemUtils;

impl SystemUtils {
    /// Check if running with root privileges
    pub fn is_root() -> bool {
        #[cfg(unix)]
        {
            unsafe { libc::geteuid() == 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }

    /// Presence of every external tool the pipeline needs, in roster order
    pub fn check_prerequisites() -> Vec<(&'static str, bool)> {
        REQUIRED_TOOLS
            .iter()
            .map(|tool| (*tool, Self::command_exists(tool)))
            .collect()
    }

    /// Names of required tools missing from PATH
    pub fn missing_prerequisites() -> Vec<&'static str> {
        Self::check_prerequisites()
            .into_iter()
            .filter(|(_, available)| !available)
            .map(|(tool, _)| tool)
            .collect()
    }

    /// Reboot the machine. Best-effort: a failure is logged, not returned,
    /// since by this point the installation itself already succeeded.
    pub async fn reboot() {
        info!("Rebooting system");
        if let Err(e) = tokio::process::Command::new("reboot").status().await {
            warn!("Failed to reboot: {}", e);
        }
    }
}

// file: src/config/mod.rs
// version: 1.0.0
// guid: b87ca8e4-1b18-4589-a61e-67e9e62c0e6f

//! Configuration module for the Debian install agent
//!
//! Handles loading and validation of installation configurations.

pub mod loader;

pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{InstallError, Result};
use crate::utils::validation;

/// Supported system architectures for installation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "amd64")]
    Amd64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl Architecture {
    /// Architecture detected from the running host
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => Architecture::Arm64,
            _ => Architecture::Amd64,
        }
    }

    /// Get the architecture as a string (debootstrap `--arch` value)
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// GRUB platform target for this architecture
    pub fn grub_target(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "x86_64-efi",
            Architecture::Arm64 => "arm64-efi",
        }
    }

    /// GRUB packages to install inside the target
    pub fn grub_packages(&self) -> &'static [&'static str] {
        match self {
            Architecture::Amd64 => &["grub-efi-amd64", "grub-efi-amd64-signed"],
            Architecture::Arm64 => &["grub-efi-arm64", "grub-efi-arm64-signed"],
        }
    }
}

impl std::str::FromStr for Architecture {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "amd64" | "x86_64" => Ok(Architecture::Amd64),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            _ => Err(InstallError::validation(format!(
                "Unknown architecture: {s}"
            ))),
        }
    }
}

/// Inputs for one installation run.
///
/// Construction goes through [`ConfigLoader`] (or serde plus an explicit
/// [`InstallConfig::validate`] call); the pipeline itself assumes these
/// fields are already vetted.
#[derive(Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Locale identifier written to the target, e.g. `en_US.UTF-8`
    pub locale: String,
    /// Console keymap, e.g. `us`
    pub keyboard: String,
    /// IANA timezone, e.g. `Europe/Berlin`
    pub timezone: String,
    /// Whole-disk block device to install onto, e.g. `/dev/sda`
    pub disk: String,
    /// Admin account to create on the target
    pub username: String,
    /// Password for the admin account
    pub password: String,
    /// Target hostname
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Wi-Fi network whose saved profile should carry over (optional)
    #[serde(default)]
    pub wifi_ssid: String,
    /// Password for that network (optional)
    #[serde(default)]
    pub wifi_password: String,
    /// Debian release to bootstrap
    #[serde(default = "default_release")]
    pub release: String,
    /// Package mirror for debootstrap
    #[serde(default = "default_mirror")]
    pub mirror: String,
    /// Target architecture
    #[serde(default = "Architecture::host")]
    pub architecture: Architecture,
}

fn default_hostname() -> String {
    "debian-system".to_string()
}

fn default_release() -> String {
    "stable".to_string()
}

fn default_mirror() -> String {
    "http://deb.debian.org/debian".to_string()
}

impl InstallConfig {
    /// Validate every field, collapsing bad input into the first error
    pub fn validate(&self) -> Result<()> {
        if self.locale.trim().is_empty() {
            return Err(InstallError::validation("Language/locale must be selected"));
        }
        if self.keyboard.trim().is_empty() {
            return Err(InstallError::validation("Keyboard layout must be selected"));
        }
        if self.timezone.trim().is_empty() {
            return Err(InstallError::validation("Timezone must be selected"));
        }

        validation::validate_disk_path(&self.disk)?;
        validation::validate_username(&self.username)?;
        validation::validate_password(&self.password)?;
        validation::validate_hostname(&self.hostname)?;
        validation::validate_wifi_password(&self.wifi_ssid, &self.wifi_password)?;

        if self.release.trim().is_empty() {
            return Err(InstallError::validation("Release cannot be empty"));
        }
        let mirror = Url::parse(&self.mirror)
            .map_err(|e| InstallError::validation(format!("Invalid mirror URL: {e}")))?;
        if !matches!(mirror.scheme(), "http" | "https") {
            return Err(InstallError::validation(
                "Mirror URL must use http or https",
            ));
        }

        Ok(())
    }

    /// True when both Wi-Fi fields are present
    pub fn wifi_configured(&self) -> bool {
        !self.wifi_ssid.is_empty() && !self.wifi_password.is_empty()
    }
}

impl std::fmt::Debug for InstallConfig {
    // Credentials stay out of debug output; logs may render this struct.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallConfig")
            .field("locale", &self.locale)
            .field("keyboard", &self.keyboard)
            .field("timezone", &self.timezone)
            .field("disk", &self.disk)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("hostname", &self.hostname)
            .field("wifi_ssid", &self.wifi_ssid)
            .field("wifi_password", &"<redacted>")
            .field("release", &self.release)
            .field("mirror", &self.mirror)
            .field("architecture", &self.architecture)
            .finish()
    }
}

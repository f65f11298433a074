// file: src/utils/probe.rs
// version: 1.0.0
// guid: 03a162d0-17d8-4e41-8e5b-96db441b19da

//! Host environment enumeration backing the `list` subcommand.
//!
//! Every probe degrades gracefully: a missing tool or unreadable file yields
//! a fallback set or an empty list, never an error, because enumeration runs
//! on live systems in unknown states.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::executor::{CommandRequest, CommandRunner};

/// Quick inspection commands answer fast or not at all
const PROBE_TIMEOUT_SECS: u64 = 10;

/// Wi-Fi scans take noticeably longer than other probes
const WIFI_SCAN_TIMEOUT_SECS: u64 = 15;

/// Locale codes the guided flow offers, with display names
const KNOWN_LOCALES: &[(&str, &str)] = &[
    ("en_US.UTF-8", "English (United States)"),
    ("en_GB.UTF-8", "English (United Kingdom)"),
    ("en_CA.UTF-8", "English (Canada)"),
    ("en_AU.UTF-8", "English (Australia)"),
    ("es_ES.UTF-8", "Spanish (Spain)"),
    ("es_MX.UTF-8", "Spanish (Mexico)"),
    ("fr_FR.UTF-8", "French (France)"),
    ("fr_CA.UTF-8", "French (Canada)"),
    ("de_DE.UTF-8", "German (Germany)"),
    ("it_IT.UTF-8", "Italian (Italy)"),
    ("pt_BR.UTF-8", "Portuguese (Brazil)"),
    ("pt_PT.UTF-8", "Portuguese (Portugal)"),
    ("ru_RU.UTF-8", "Russian (Russia)"),
    ("zh_CN.UTF-8", "Chinese (Simplified)"),
    ("zh_TW.UTF-8", "Chinese (Traditional)"),
    ("ja_JP.UTF-8", "Japanese (Japan)"),
    ("ko_KR.UTF-8", "Korean (South Korea)"),
    ("ar_SA.UTF-8", "Arabic (Saudi Arabia)"),
    ("hi_IN.UTF-8", "Hindi (India)"),
    ("nl_NL.UTF-8", "Dutch (Netherlands)"),
    ("sv_SE.UTF-8", "Swedish (Sweden)"),
    ("da_DK.UTF-8", "Danish (Denmark)"),
    ("no_NO.UTF-8", "Norwegian (Norway)"),
    ("fi_FI.UTF-8", "Finnish (Finland)"),
    ("pl_PL.UTF-8", "Polish (Poland)"),
    ("tr_TR.UTF-8", "Turkish (Turkey)"),
    ("C.UTF-8", "C/POSIX (Default)"),
    ("POSIX", "POSIX (Minimal)"),
];

const FALLBACK_KEYMAPS: &[&str] = &["us", "uk", "de", "fr", "es", "it"];

const FALLBACK_TIMEZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Berlin",
    "Asia/Tokyo",
];

/// A disk eligible as an installation target
#[derive(Debug, Clone, Serialize)]
pub struct DiskInfo {
    pub name: String,
    pub size: String,
    pub model: String,
    /// Ready-made label for pickers: `/dev/sda (32G) - Some Model`
    pub display: String,
}

/// An installable locale with its friendly name
#[derive(Debug, Clone, Serialize)]
pub struct LocaleInfo {
    pub code: String,
    pub display: String,
}

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    blockdevices: Vec<LsblkDevice>,
}

#[derive(Debug, Deserialize)]
struct LsblkDevice {
    name: String,
    size: Option<String>,
    #[serde(rename = "type")]
    device_type: Option<String>,
    model: Option<String>,
}

/// Enumerates what the host offers for each installer choice
pub struct SystemProbe {
    runner: Arc<dyn CommandRunner>,
    zoneinfo_dir: PathBuf,
    locale_sources: Vec<PathBuf>,
}

impl SystemProbe {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            zoneinfo_dir: PathBuf::from("/usr/share/zoneinfo"),
            locale_sources: vec![
                PathBuf::from("/usr/share/i18n/SUPPORTED"),
                PathBuf::from("/etc/locale.gen"),
            ],
        }
    }

    /// Read timezones from a different tree
    pub fn with_zoneinfo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.zoneinfo_dir = dir.into();
        self
    }

    /// Read locale definitions from different files
    pub fn with_locale_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.locale_sources = sources;
        self
    }

    /// Whole disks reported by lsblk
    pub async fn disks(&self) -> Vec<DiskInfo> {
        let request = CommandRequest::new(["lsblk", "-o", "NAME,SIZE,TYPE,MODEL", "-d", "-J"])
            .with_timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .tolerate_failure();
        let result = match self.runner.run(&request).await {
            Ok(result) if result.success() => result,
            Ok(result) => {
                warn!("lsblk failed: {}", result.stderr.trim());
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not list disks: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<LsblkOutput>(&result.stdout) {
            Ok(parsed) => parsed
                .blockdevices
                .into_iter()
                .filter(|device| device.device_type.as_deref() == Some("disk"))
                .map(|device| {
                    let name = format!("/dev/{}", device.name);
                    let size = device.size.unwrap_or_else(|| "Unknown".to_string());
                    let model = device.model.unwrap_or_else(|| "Unknown".to_string());
                    let display = format!("{} ({}) - {}", name, size, model);
                    DiskInfo {
                        name,
                        size,
                        model,
                        display,
                    }
                })
                .collect(),
            Err(e) => {
                warn!("Could not parse lsblk output: {}", e);
                Vec::new()
            }
        }
    }

    /// Console keymaps from localectl, or a small static set without it
    pub async fn keymaps(&self) -> Vec<String> {
        let request = CommandRequest::new(["localectl", "list-keymaps"])
            .with_timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .tolerate_failure();
        match self.runner.run(&request).await {
            Ok(result) if result.success() => {
                let mut keymaps: Vec<String> = result
                    .stdout
                    .trim()
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect();
                keymaps.sort();
                keymaps.dedup();
                if keymaps.is_empty() {
                    Self::fallback_keymaps()
                } else {
                    keymaps
                }
            }
            _ => {
                debug!("localectl unavailable, using fallback keymaps");
                Self::fallback_keymaps()
            }
        }
    }

    fn fallback_keymaps() -> Vec<String> {
        FALLBACK_KEYMAPS.iter().map(|k| k.to_string()).collect()
    }

    /// Timezone names under the zoneinfo tree.
    ///
    /// Leap-second variants (`posix/`, `right/`), the `Etc/` inversions and
    /// lowercase helper files are not real choices and get skipped.
    pub fn timezones(&self) -> Vec<String> {
        if !self.zoneinfo_dir.is_dir() {
            return FALLBACK_TIMEZONES.iter().map(|z| z.to_string()).collect();
        }

        let mut zones = Vec::new();
        for entry in WalkDir::new(&self.zoneinfo_dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Ok(relative) = path.strip_prefix(&self.zoneinfo_dir) else {
                continue;
            };
            let parent = relative
                .parent()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();
            if ["posix", "right", "Etc"]
                .iter()
                .any(|skip| parent.contains(skip))
            {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.chars().next().map_or(false, |c| c.is_ascii_uppercase()) {
                continue;
            }
            if let Some(zone) = relative.to_str() {
                zones.push(zone.to_string());
            }
        }
        zones.sort();
        zones
    }

    /// Locales this host can generate, limited to the known table
    pub fn locales(&self) -> Vec<LocaleInfo> {
        let mut available: BTreeSet<&'static str> = BTreeSet::new();
        for source in &self.locale_sources {
            let Ok(content) = std::fs::read_to_string(source) else {
                continue;
            };
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some(code) = line.split_whitespace().next() else {
                    continue;
                };
                if let Some((known, _)) = KNOWN_LOCALES.iter().find(|(c, _)| *c == code) {
                    available.insert(known);
                }
            }
        }

        if available.is_empty() {
            for fallback in ["en_US.UTF-8", "C.UTF-8", "POSIX"] {
                available.insert(fallback);
            }
        }

        available
            .into_iter()
            .map(|code| LocaleInfo {
                code: code.to_string(),
                display: Self::locale_display_name(code),
            })
            .collect()
    }

    /// Friendly display name for a locale code; unknown codes pass through
    pub fn locale_display_name(code: &str) -> String {
        KNOWN_LOCALES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, display)| display.to_string())
            .unwrap_or_else(|| code.to_string())
    }

    /// SSIDs visible right now, empty when scanning is impossible
    pub async fn wifi_networks(&self) -> Vec<String> {
        let request = CommandRequest::new(["nmcli", "-t", "-f", "SSID", "dev", "wifi", "list"])
            .with_timeout(Duration::from_secs(WIFI_SCAN_TIMEOUT_SECS))
            .tolerate_failure();
        match self.runner.run(&request).await {
            Ok(result) if result.success() => {
                let mut ssids: Vec<String> = result
                    .stdout
                    .trim()
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect();
                ssids.sort();
                ssids.dedup();
                ssids
            }
            _ => {
                debug!("nmcli scan unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;
    use tempfile::TempDir;

    const LSBLK_JSON: &str = r#"{
        "blockdevices": [
            {"name": "sda", "size": "32G", "type": "disk", "model": "QEMU HARDDISK"},
            {"name": "sda1", "size": "512M", "type": "part", "model": null},
            {"name": "sr0", "size": "1024M", "type": "rom", "model": "DVD-ROM"},
            {"name": "vdb", "size": "8G", "type": "disk", "model": null}
        ]
    }"#;

    #[tokio::test]
    async fn test_disks_keeps_whole_disks_only() {
        let runner = Arc::new(ScriptedRunner::new().stdout_for("lsblk", LSBLK_JSON));
        let probe = SystemProbe::new(runner);

        let disks = probe.disks().await;
        assert_eq!(disks.len(), 2);
        assert_eq!(disks[0].name, "/dev/sda");
        assert_eq!(disks[0].display, "/dev/sda (32G) - QEMU HARDDISK");
        assert_eq!(disks[1].name, "/dev/vdb");
        assert_eq!(disks[1].model, "Unknown");
    }

    #[tokio::test]
    async fn test_disks_empty_when_lsblk_fails() {
        let runner = Arc::new(ScriptedRunner::new().fail_on("lsblk", "not found"));
        let probe = SystemProbe::new(runner);
        assert!(probe.disks().await.is_empty());
    }

    #[tokio::test]
    async fn test_disks_empty_on_malformed_json() {
        let runner = Arc::new(ScriptedRunner::new().stdout_for("lsblk", "not json at all"));
        let probe = SystemProbe::new(runner);
        assert!(probe.disks().await.is_empty());
    }

    #[tokio::test]
    async fn test_keymaps_sorted_and_deduplicated() {
        let runner =
            Arc::new(ScriptedRunner::new().stdout_for("localectl", "us\nde\nus\nfr\n"));
        let probe = SystemProbe::new(runner);
        assert_eq!(probe.keymaps().await, vec!["de", "fr", "us"]);
    }

    #[tokio::test]
    async fn test_keymaps_fall_back_without_localectl() {
        let runner = Arc::new(ScriptedRunner::new().fail_on("localectl", "no systemd"));
        let probe = SystemProbe::new(runner);
        assert_eq!(
            probe.keymaps().await,
            vec!["us", "uk", "de", "fr", "es", "it"]
        );
    }

    #[test]
    fn test_timezones_skip_variant_trees_and_lowercase() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        for sub in ["America", "posix/America", "right", "Etc"] {
            std::fs::create_dir_all(base.join(sub)).unwrap();
        }
        std::fs::write(base.join("UTC"), "").unwrap();
        std::fs::write(base.join("America/New_York"), "").unwrap();
        std::fs::write(base.join("posix/America/New_York"), "").unwrap();
        std::fs::write(base.join("right/UTC"), "").unwrap();
        std::fs::write(base.join("Etc/GMT"), "").unwrap();
        std::fs::write(base.join("zone.tab"), "").unwrap();

        let runner = Arc::new(ScriptedRunner::new());
        let probe = SystemProbe::new(runner).with_zoneinfo_dir(base);
        assert_eq!(probe.timezones(), vec!["America/New_York", "UTC"]);
    }

    #[test]
    fn test_timezones_fall_back_without_zoneinfo() {
        let runner = Arc::new(ScriptedRunner::new());
        let probe = SystemProbe::new(runner).with_zoneinfo_dir("/definitely/not/here");
        assert_eq!(probe.timezones()[0], "UTC");
        assert_eq!(probe.timezones().len(), 6);
    }

    #[test]
    fn test_locales_read_from_supported_file() {
        let dir = TempDir::new().unwrap();
        let supported = dir.path().join("SUPPORTED");
        std::fs::write(
            &supported,
            "# comment line\nen_US.UTF-8 UTF-8\nde_DE.UTF-8 UTF-8\nxx_XX.UTF-8 UTF-8\n\n",
        )
        .unwrap();

        let runner = Arc::new(ScriptedRunner::new());
        let probe = SystemProbe::new(runner).with_locale_sources(vec![supported]);
        let locales = probe.locales();

        let codes: Vec<&str> = locales.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["de_DE.UTF-8", "en_US.UTF-8"]);
        assert_eq!(locales[0].display, "German (Germany)");
    }

    #[test]
    fn test_locales_fall_back_without_sources() {
        let runner = Arc::new(ScriptedRunner::new());
        let probe =
            SystemProbe::new(runner).with_locale_sources(vec![PathBuf::from("/nope/nowhere")]);
        let codes: Vec<String> = probe.locales().into_iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["C.UTF-8", "POSIX", "en_US.UTF-8"]);
    }

    #[test]
    fn test_locale_display_name_passthrough_for_unknown() {
        assert_eq!(
            SystemProbe::locale_display_name("tlh_TLH.UTF-8"),
            "tlh_TLH.UTF-8"
        );
    }

    #[tokio::test]
    async fn test_wifi_networks_deduplicated() {
        let runner =
            Arc::new(ScriptedRunner::new().stdout_for("nmcli", "HomeNet\nCafe\n\nHomeNet\n"));
        let probe = SystemProbe::new(runner);
        assert_eq!(probe.wifi_networks().await, vec!["Cafe", "HomeNet"]);
    }

    #[tokio::test]
    async fn test_wifi_networks_empty_without_nmcli() {
        let runner = Arc::new(ScriptedRunner::new().timeout_on("nmcli"));
        let probe = SystemProbe::new(runner);
        assert!(probe.wifi_networks().await.is_empty());
    }
}

// file: src/utils/validation.rs
// version: 1.0.0
// guid: 91ad6c5d-af38-4064-9846-996c48811b02

//! Input validation for installer configuration values.
//!
//! These checks run at configuration construction time so the pipeline never
//! starts with inputs it would only reject halfway through a destructive run.

use crate::error::{InstallError, Result};

/// Account names that collide with stock system users
const RESERVED_USERNAMES: &[&str] = &[
    "root", "daemon", "bin", "sys", "sync", "games", "man", "lp", "mail", "news", "uucp",
    "proxy", "www-data", "backup", "list", "irc", "gnats", "nobody",
];

/// Validate a username against Linux account naming rules
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(InstallError::validation("Username cannot be empty"));
    }
    if username.len() < 2 {
        return Err(InstallError::validation(
            "Username must be at least 2 characters",
        ));
    }
    if username.len() > 32 {
        return Err(InstallError::validation(
            "Username must be less than 32 characters",
        ));
    }
    if !username
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
    {
        return Err(InstallError::validation("Username must start with a letter"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(InstallError::validation(
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(InstallError::validation("Username conflicts with system user"));
    }
    Ok(())
}

/// Validate password length bounds
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(InstallError::validation("Password cannot be empty"));
    }
    if password.len() < 6 {
        return Err(InstallError::validation(
            "Password must be at least 6 characters",
        ));
    }
    if password.len() > 128 {
        return Err(InstallError::validation("Password is too long"));
    }
    Ok(())
}

/// Validate a hostname against RFC naming rules
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty() {
        return Err(InstallError::validation("Hostname cannot be empty"));
    }
    if hostname.len() > 63 {
        return Err(InstallError::validation(
            "Hostname cannot exceed 63 characters",
        ));
    }
    let valid_shape = hostname.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !hostname.starts_with('-')
        && !hostname.ends_with('-');
    if !valid_shape {
        return Err(InstallError::validation(
            "Hostname can only contain letters, numbers, and hyphens (not at start/end)",
        ));
    }
    if matches!(hostname.to_lowercase().as_str(), "localhost" | "local") {
        return Err(InstallError::validation(
            "Hostname cannot be 'localhost' or 'local'",
        ));
    }
    Ok(())
}

/// Validate Wi-Fi credentials. Skipped entirely when no SSID is selected.
pub fn validate_wifi_password(ssid: &str, password: &str) -> Result<()> {
    if ssid.is_empty() {
        return Ok(());
    }
    if password.is_empty() {
        return Err(InstallError::validation(
            "WiFi password is required for selected network",
        ));
    }
    if password.len() < 8 {
        return Err(InstallError::validation(
            "WiFi password must be at least 8 characters",
        ));
    }
    if password.len() > 63 {
        return Err(InstallError::validation(
            "WiFi password cannot exceed 63 characters",
        ));
    }
    Ok(())
}

/// Validate the shape of an installation target disk path
pub fn validate_disk_path(disk: &str) -> Result<()> {
    if disk.is_empty() {
        return Err(InstallError::validation("No disk selected"));
    }
    if !disk.starts_with("/dev/") {
        return Err(InstallError::validation("Invalid disk path"));
    }
    Ok(())
}

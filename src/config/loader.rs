// file: src/config/loader.rs
// version: 1.0.0
// guid: ef889d33-5526-428e-aca5-a1aa515fe58b

//! Configuration file loading and environment variable substitution

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::InstallConfig;
use crate::error::InstallError;
use crate::Result;

/// Configuration loader with environment variable substitution.
///
/// `${VAR}` references in the YAML are replaced before deserialization, so
/// credentials can live in the environment instead of on disk:
///
/// ```yaml
/// username: alice
/// password: ${INSTALL_PASSWORD}
/// ```
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader seeded from the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load an installation configuration from a YAML file
    pub fn load_install_config<P: AsRef<Path>>(&self, path: P) -> Result<InstallConfig> {
        let content = fs::read_to_string(&path).map_err(|e| {
            InstallError::config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let expanded = self.expand_env_vars(&content)?;
        let config: InstallConfig = serde_yaml::from_str(&expanded)?;

        config.validate()?;

        Ok(config)
    }

    /// Expand environment variables in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| InstallError::config(format!("Invalid regex pattern: {e}")))?;

        let mut result = content.to_string();
        let mut missing_vars = Vec::new();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];

            if let Some(value) = self.env_vars.get(var_name) {
                result = result.replace(placeholder, value);
            } else {
                missing_vars.push(var_name.to_string());
            }
        }

        if !missing_vars.is_empty() {
            return Err(InstallError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result)
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_var_expansion() {
        let mut loader = ConfigLoader::new();
        loader.set_env_var("TEST_VAR".to_string(), "test_value".to_string());

        let content = "key: ${TEST_VAR}";
        let result = loader.expand_env_vars(content).unwrap();
        assert_eq!(result, "key: test_value");
    }

    #[test]
    fn test_missing_env_var() {
        let loader = ConfigLoader::new();
        let content = "key: ${DEFINITELY_MISSING_VAR_XYZ}";

        let result = loader.expand_env_vars(content);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing environment variables"));
    }

    #[test]
    fn test_load_install_config() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
locale: en_US.UTF-8
keyboard: us
timezone: Europe/Berlin
disk: /dev/sda
username: alice
password: ${{INSTALL_PASSWORD}}
hostname: alice-desktop
"#
        )
        .unwrap();

        let mut loader = ConfigLoader::new();
        loader.set_env_var("INSTALL_PASSWORD".to_string(), "hunter2".to_string());
        let config = loader.load_install_config(file.path())?;

        assert_eq!(config.username, "alice");
        assert_eq!(config.password, "hunter2");
        assert_eq!(config.hostname, "alice-desktop");
        assert_eq!(config.release, "stable");

        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected_at_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
locale: en_US.UTF-8
keyboard: us
timezone: UTC
disk: not-a-device
username: alice
password: hunter2
"#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        assert!(loader.load_install_config(file.path()).is_err());
    }
}

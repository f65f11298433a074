// file: tests/integration_test.rs
// version: 1.0.0
// guid: 04c6ed33-27d5-4d53-b65b-daa31c391928

//! Integration tests for the Debian install agent

use async_trait::async_trait;
use debian_install_agent::{
    config::{loader::ConfigLoader, Architecture, InstallConfig},
    executor::{CommandRequest, CommandResult, CommandRunner},
    installer::{InstallPhase, Installer},
    reporter::{RecordingSink, StatusReporter},
    InstallError, Result,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Scripted runner so the whole pipeline can run without touching the host.
/// Every command succeeds with empty output unless a failure needle matches.
struct StubRunner {
    calls: Mutex<Vec<String>>,
    fail_needle: Option<(String, String)>,
}

impl StubRunner {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_needle: None,
        })
    }

    fn failing(needle: &str, stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_needle: Some((needle.to_string(), stderr.to_string())),
        })
    }

    fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for StubRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandResult> {
        let command = request.display_command();
        self.calls.lock().unwrap().push(command.clone());

        if let Some((needle, stderr)) = &self.fail_needle {
            if command.contains(needle.as_str()) && request.must_succeed {
                return Err(InstallError::command_failed(&request.argv, stderr.clone()));
            }
        }

        Ok(CommandResult {
            command,
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            elapsed: Duration::from_millis(1),
        })
    }
}

fn test_config() -> InstallConfig {
    InstallConfig {
        locale: "en_US.UTF-8".to_string(),
        keyboard: "us".to_string(),
        timezone: "Europe/Berlin".to_string(),
        disk: "/dev/sda".to_string(),
        username: "alice".to_string(),
        password: "hunter2".to_string(),
        hostname: "alice-desktop".to_string(),
        wifi_ssid: String::new(),
        wifi_password: String::new(),
        release: "stable".to_string(),
        mirror: "http://deb.debian.org/debian".to_string(),
        architecture: Architecture::Amd64,
    }
}

/// Target directory with the etc/ skeleton the pipeline writes into
fn target_tree() -> TempDir {
    let target = TempDir::new().unwrap();
    std::fs::create_dir_all(target.path().join("etc")).unwrap();
    target
}

#[tokio::test(start_paused = true)]
async fn test_full_pipeline_reports_every_milestone() {
    let runner = StubRunner::new();
    let sink = Arc::new(RecordingSink::new());
    let reporter = StatusReporter::new(Some(sink.clone()));
    let target = target_tree();

    let installer =
        Installer::new(test_config(), runner.clone(), reporter).with_mount_root(target.path());
    installer.run().await.unwrap();

    assert_eq!(
        sink.percents(),
        vec![10, 20, 25, 30, 60, 65, 75, 80, 85, 90, 95, 100]
    );
    let updates = sink.snapshot();
    assert_eq!(updates[0].message, "Preparing disk...");
    assert_eq!(
        updates.last().unwrap().message,
        "Installation completed successfully!"
    );

    let state = installer.state().await;
    assert_eq!(state.phase, InstallPhase::Succeeded);
    assert_eq!(state.progress, 100);
    assert!(state.completed_at.is_some());

    let commands = runner.commands();
    assert!(commands[0].starts_with("umount -f"));
    assert!(commands.iter().any(|c| c.starts_with("debootstrap")));
    assert!(commands.last().unwrap().starts_with("umount -R"));
}

#[tokio::test(start_paused = true)]
async fn test_fstab_falls_back_to_device_paths() {
    let runner = StubRunner::new();
    let target = target_tree();

    let installer =
        Installer::new(test_config(), runner, StatusReporter::silent()).with_mount_root(target.path());
    installer.run().await.unwrap();

    // blkid reported nothing, so the raw partition path is used and the
    // unverifiable EFI partition is left out.
    let fstab = std::fs::read_to_string(target.path().join("etc/fstab")).unwrap();
    assert!(fstab.contains("/dev/sda2        /               ext4"));
    assert!(!fstab.contains("/boot/efi"));
    assert!(fstab.contains("tmpfs"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_bootstrap_unwinds_and_reports_sentinel() {
    let runner = StubRunner::failing("debootstrap", "mirror unreachable");
    let sink = Arc::new(RecordingSink::new());
    let reporter = StatusReporter::new(Some(sink.clone()));
    let target = target_tree();

    let installer =
        Installer::new(test_config(), runner.clone(), reporter).with_mount_root(target.path());
    let err = installer.run().await.unwrap_err();
    assert!(matches!(err, InstallError::CommandFailed { .. }));

    assert_eq!(sink.percents(), vec![10, 20, 25, 30, -1]);
    let last = sink.snapshot().pop().unwrap();
    assert!(last.is_failure());
    assert!(last.message.starts_with("Installation failed:"));

    // The mounted tree is released even though the run failed.
    assert!(runner.commands().last().unwrap().starts_with("umount -R"));

    let state = installer.state().await;
    assert_eq!(state.phase, InstallPhase::Failed);
    assert!(state.error_message.is_some());
}

#[tokio::test]
async fn test_config_loading_with_env_substitution() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let config_content = r#"
locale: en_US.UTF-8
keyboard: us
timezone: UTC
disk: /dev/sda
username: admin
password: "${TEST_INSTALL_PASSWORD}"
hostname: test-server
"#;

    let config_path = temp_dir.path().join("config.yaml");
    tokio::fs::write(&config_path, config_content).await?;

    let mut loader = ConfigLoader::new();
    loader.set_env_var(
        "TEST_INSTALL_PASSWORD".to_string(),
        "supersecret123".to_string(),
    );
    let config = loader.load_install_config(&config_path)?;

    assert_eq!(config.username, "admin");
    assert_eq!(config.password, "supersecret123");
    assert_eq!(config.release, "stable");

    Ok(())
}

#[tokio::test]
async fn test_missing_environment_variable() {
    let temp_dir = TempDir::new().unwrap();
    let config_content = r#"
locale: en_US.UTF-8
keyboard: us
timezone: UTC
disk: /dev/sda
username: admin
password: "${MISSING_VARIABLE}"
hostname: test-server
"#;

    let config_path = temp_dir.path().join("config.yaml");
    tokio::fs::write(&config_path, config_content).await.unwrap();

    let loader = ConfigLoader::new();
    let result = loader.load_install_config(&config_path);

    assert!(result.is_err());
    let error = result.unwrap_err();
    assert!(error.to_string().contains("Missing environment variables"));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_run_stops_before_first_stage() {
    let runner = StubRunner::new();
    let target = target_tree();

    let installer = Installer::new(test_config(), runner.clone(), StatusReporter::silent())
        .with_mount_root(target.path());
    installer.cancel_token().cancel();

    let err = installer.run().await.unwrap_err();
    assert!(matches!(err, InstallError::Cancelled));

    // Only the best-effort unmount ran.
    let commands = runner.commands();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].starts_with("umount -R"));
}

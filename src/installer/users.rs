// file: src/installer/users.rs
// version: 1.0.0
// guid: a7b7261f-f0e5-4ed1-b65b-1dc840ddd7ee

//! User account provisioning inside the target.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::InstallConfig;
use crate::error::Result;
use crate::executor::{CommandRequest, CommandRunner};

const ROOT_PASSWORD_LEN: usize = 16;

/// Creates the admin account and locks down root with a generated password
pub struct UserProvisioner {
    runner: Arc<dyn CommandRunner>,
    username: String,
    password: String,
}

impl UserProvisioner {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &InstallConfig) -> Self {
        Self {
            runner,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Create the admin user with sudo membership, then set a random root
    /// password. The generated root password is written once to the log;
    /// that log line is its only record.
    pub async fn provision(&self, mount_root: &Path) -> Result<()> {
        info!("Creating user account {}", self.username);

        self.runner
            .run(&CommandRequest::chroot(
                mount_root,
                ["useradd", "-m", "-s", "/bin/bash", self.username.as_str()],
            ))
            .await?;

        self.set_password(mount_root, &self.username, &self.password)
            .await?;

        self.runner
            .run(&CommandRequest::chroot(
                mount_root,
                ["usermod", "-aG", "sudo", self.username.as_str()],
            ))
            .await?;

        let root_password = generate_password(ROOT_PASSWORD_LEN);
        self.set_password(mount_root, "root", &root_password).await?;
        info!("Root password set to: {}", root_password);

        Ok(())
    }

    /// chpasswd reads `user:password` pairs from stdin, which keeps the
    /// secret out of every argv and out of the command log.
    async fn set_password(&self, mount_root: &Path, user: &str, password: &str) -> Result<()> {
        let request = CommandRequest::chroot(mount_root, ["chpasswd"])
            .with_stdin(format!("{user}:{password}\n"));
        self.runner.run(&request).await?;
        Ok(())
    }
}

fn generate_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

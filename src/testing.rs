// file: src/testing.rs
// version: 1.0.0
// guid: 9f61cac1-3b4b-48a1-ac9c-a3c2f44cf898

//! Test doubles and fixtures shared by the unit tests.

use crate::config::{Architecture, InstallConfig};
use crate::error::{InstallError, Result};
use crate::executor::{CommandRequest, CommandResult, CommandRunner};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A fully valid configuration for `/dev/sda` installs
pub(crate) fn valid_config() -> InstallConfig {
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

enum Outcome {
    Fail(String),
    Timeout,
    Stdout(String),
}

struct Rule {
    needle: String,
    outcome: Outcome,
}

/// [`CommandRunner`] double that records every request and replays scripted
/// outcomes. Rules match on a substring of the joined argv; the first match
/// wins and unmatched commands succeed with empty output.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    calls: Mutex<Vec<CommandRequest>>,
    rules: Mutex<Vec<Rule>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `needle` exit non-zero with the given stderr
    pub fn fail_on(self, needle: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.rules.lock().unwrap().push(Rule {
            needle: needle.into(),
            outcome: Outcome::Fail(stderr.into()),
        });
        self
    }

    /// Commands containing `needle` time out
    pub fn timeout_on(self, needle: impl Into<String>) -> Self {
        self.rules.lock().unwrap().push(Rule {
            needle: needle.into(),
            outcome: Outcome::Timeout,
        });
        self
    }

    /// Commands containing `needle` succeed with the given stdout
    pub fn stdout_for(self, needle: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.rules.lock().unwrap().push(Rule {
            needle: needle.into(),
            outcome: Outcome::Stdout(stdout.into()),
        });
        self
    }

    /// Joined argv of every command run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.display_command())
            .collect()
    }

    /// Full recorded requests, in order
    pub fn requests(&self) -> Vec<CommandRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandResult> {
        self.calls.lock().unwrap().push(request.clone());

        let command = request.display_command();
        let rules = self.rules.lock().unwrap();
        let matched = rules.iter().find(|rule| command.contains(&rule.needle));

        match matched.map(|rule| &rule.outcome) {
            Some(Outcome::Fail(stderr)) => {
                if request.must_succeed {
                    Err(InstallError::command_failed(&request.argv, stderr.clone()))
                } else {
                    Ok(CommandResult {
                        command,
                        exit_code: Some(1),
                        stdout: String::new(),
                        stderr: stderr.clone(),
                        elapsed: Duration::from_millis(1),
                    })
                }
            }
            Some(Outcome::Timeout) => Err(InstallError::command_timeout(
                &request.argv,
                request.timeout.as_secs(),
            )),
            Some(Outcome::Stdout(stdout)) => Ok(CommandResult {
                command,
                exit_code: Some(0),
                stdout: stdout.clone(),
                stderr: String::new(),
                elapsed: Duration::from_millis(1),
            }),
            None => Ok(CommandResult {
                command,
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
                elapsed: Duration::from_millis(1),
            }),
        }
    }
}

// file: src/reporter/mod.rs
// version: 1.0.0
// guid: 56b4a545-1f86-4bea-96ba-79b82bb9796a

//! Progress reporting for installation runs.
//!
//! The pipeline emits coarse `(message, percent)` milestones. Embedders
//! receive them through a [`ProgressSink`]; the reporter also writes every
//! update to the log, which makes the log the record of a run even when no
//! sink is attached. Sinks must never be able to fail an installation, so
//! the trait is infallible and the webhook sink is fire-and-forget.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{InstallError, Result};

/// Percent value reported when an installation fails
pub const FAILURE_PERCENT: i32 = -1;

/// One milestone of an installation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub message: String,
    pub percent: i32,
}

impl ProgressUpdate {
    pub fn new(message: impl Into<String>, percent: i32) -> Self {
        Self {
            message: message.into(),
            percent,
        }
    }

    /// True when this update carries the failure sentinel
    pub fn is_failure(&self) -> bool {
        self.percent == FAILURE_PERCENT
    }
}

/// Receiver of progress updates.
///
/// Implementations are called from the pipeline task; anything that needs a
/// particular thread (a UI event loop) should hand the update off, e.g. via
/// [`ChannelSink`].
pub trait ProgressSink: Send + Sync {
    fn progress(&self, update: &ProgressUpdate);
}

/// Logs every milestone and forwards it to an optional sink
pub struct StatusReporter {
    sink: Option<Arc<dyn ProgressSink>>,
}

impl StatusReporter {
    pub fn new(sink: Option<Arc<dyn ProgressSink>>) -> Self {
        Self { sink }
    }

    /// Reporter with no sink attached; updates still land in the log
    pub fn silent() -> Self {
        Self { sink: None }
    }

    /// Emit one milestone
    pub fn update(&self, message: &str, percent: i32) {
        info!("Progress {}%: {}", percent, message);
        if let Some(sink) = &self.sink {
            sink.progress(&ProgressUpdate::new(message, percent));
        }
    }

    /// Emit the terminal failure milestone
    pub fn fail(&self, message: &str) {
        self.update(message, FAILURE_PERCENT);
    }
}

/// Sink that forwards updates into a tokio channel.
///
/// The receiving half can live on any thread or task; a dropped receiver is
/// tolerated since reporting must not interfere with the run.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn progress(&self, update: &ProgressUpdate) {
        let _ = self.tx.send(update.clone());
    }
}

/// Sink that stores updates in memory for later inspection
#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every update received so far, in arrival order
    pub fn snapshot(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().expect("sink lock poisoned").clone()
    }

    /// Just the percent values, in arrival order
    pub fn percents(&self) -> Vec<i32> {
        self.snapshot().into_iter().map(|u| u.percent).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn progress(&self, update: &ProgressUpdate) {
        self.updates
            .lock()
            .expect("sink lock poisoned")
            .push(update.clone());
    }
}

/// Sink that POSTs each update as JSON to a webhook.
///
/// Delivery is fire-and-forget: failures are logged and dropped so a dead
/// endpoint can never stall or fail an install.
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("debian-install-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InstallError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ProgressSink for WebhookSink {
    fn progress(&self, update: &ProgressUpdate) {
        let client = self.client.clone();
        let url = self.url.clone();
        let body = update.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&body).send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!("Status webhook returned {}", response.status());
                }
                Err(e) => warn!("Failed to deliver status webhook: {}", e),
                _ => {}
            }
        });
    }
}

/// Sink that forwards each update to several sinks in order
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ProgressSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn ProgressSink>>) -> Self {
        Self { sinks }
    }
}

impl ProgressSink for FanoutSink {
    fn progress(&self, update: &ProgressUpdate) {
        for sink in &self.sinks {
            sink.progress(update);
        }
    }
}

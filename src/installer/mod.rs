// file: src/installer/mod.rs
// version: 1.0.0
// guid: b415e427-9a1a-493f-a990-78c357eca400

//! Installation pipeline orchestration.
//!
//! [`Installer::run`] drives the fixed stage sequence: partition, mount,
//! debootstrap, configure, users, network, bootloader, fstab, cleanup. Each
//! stage is entered exactly once, never retried, and the first fatal error
//! unwinds the run through a best-effort unmount.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::executor::CommandRunner;
use crate::reporter::{StatusReporter, FAILURE_PERCENT};

pub mod bootloader;
pub mod bootstrap;
pub mod disk;
pub mod fstab;
pub mod mount;
pub mod network;
pub mod system;
pub mod users;

use bootloader::BootloaderInstaller;
use bootstrap::BaseSystemInstaller;
use disk::DiskPreparer;
use fstab::FstabGenerator;
use mount::SystemMounter;
use network::NetworkConfigurator;
use system::SystemConfigurator;
use users::UserProvisioner;

/// Working mount root used unless the caller overrides it
pub const DEFAULT_MOUNT_ROOT: &str = "/mnt";

/// Stage of an installation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Idle,
    Preparing,
    Mounting,
    BaseInstall,
    Configuring,
    UserCreation,
    NetworkConfig,
    BootloaderInstall,
    FstabGen,
    CleaningUp,
    Succeeded,
    Failed,
}

impl InstallPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallPhase::Idle => "idle",
            InstallPhase::Preparing => "preparing",
            InstallPhase::Mounting => "mounting",
            InstallPhase::BaseInstall => "base-install",
            InstallPhase::Configuring => "configuring",
            InstallPhase::UserCreation => "user-creation",
            InstallPhase::NetworkConfig => "network-config",
            InstallPhase::BootloaderInstall => "bootloader-install",
            InstallPhase::FstabGen => "fstab-gen",
            InstallPhase::CleaningUp => "cleaning-up",
            InstallPhase::Succeeded => "succeeded",
            InstallPhase::Failed => "failed",
        }
    }
}

/// Snapshot of a run's progress for embedders
#[derive(Debug, Clone)]
pub struct InstallState {
    /// Stage the run is currently in
    pub phase: InstallPhase,

    /// Last reported milestone percent, or the failure sentinel
    pub progress: i32,

    /// Timestamp when the run started
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Timestamp when the run succeeded or failed
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Error message if the run failed
    pub error_message: Option<String>,
}

/// Cooperative cancellation flag, checked between stages.
///
/// Tripping the token never interrupts a running external command; the run
/// stops at the next stage boundary and unwinds like any other failure.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Drives one installation run end to end.
///
/// The installer owns its mount root for the duration of a run; two runs
/// must never share one.
pub struct Installer {
    /// Installation configuration
    config: InstallConfig,

    /// Current installation session ID
    session_id: Uuid,

    /// Executes every external command of the pipeline
    runner: Arc<dyn CommandRunner>,

    /// Milestone reporter
    reporter: StatusReporter,

    /// Target tree root the partitions get mounted under
    mount_root: PathBuf,

    /// Current installation state
    state: Arc<RwLock<InstallState>>,

    /// Between-stage cancellation flag
    cancel: CancelToken,
}

impl Installer {
    pub fn new(
        config: InstallConfig,
        runner: Arc<dyn CommandRunner>,
        reporter: StatusReporter,
    ) -> Self {
        let session_id = Uuid::new_v4();
        info!("Creating installer session {}", session_id);

        Self {
            config,
            session_id,
            runner,
            reporter,
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            state: Arc::new(RwLock::new(InstallState {
                phase: InstallPhase::Idle,
                progress: 0,
                started_at: chrono::Utc::now(),
                completed_at: None,
                error_message: None,
            })),
            cancel: CancelToken::new(),
        }
    }

    /// Install under a different mount root
    pub fn with_mount_root(mut self, mount_root: impl Into<PathBuf>) -> Self {
        self.mount_root = mount_root.into();
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Handle for requesting cancellation from another task
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current state snapshot
    pub async fn state(&self) -> InstallState {
        self.state.read().await.clone()
    }

    /// Run the pipeline to completion.
    ///
    /// On failure the terminal update carries the failure sentinel, the
    /// target tree is unmounted best-effort, and no further updates follow.
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting installation session {} on {}",
            self.session_id, self.config.disk
        );
        {
            let mut state = self.state.write().await;
            state.started_at = chrono::Utc::now();
        }

        let result = self.run_stages().await;

        let mut state = self.state.write().await;
        state.completed_at = Some(chrono::Utc::now());
        match &result {
            Ok(()) => {
                state.phase = InstallPhase::Succeeded;
                state.progress = 100;
                drop(state);
                self.reporter.update("Installation completed successfully!", 100);
                info!("Installation session {} finished", self.session_id);
            }
            Err(e) => {
                state.phase = InstallPhase::Failed;
                state.progress = FAILURE_PERCENT;
                state.error_message = Some(e.to_string());
                drop(state);
                error!("Installation failed: {}", e);
                self.reporter.fail(&format!("Installation failed: {}", e));
                // Unwind silently; the sentinel must stay the last update.
                SystemMounter::new(self.runner.clone())
                    .unmount_all(&self.mount_root)
                    .await;
            }
        }
        result
    }

    async fn run_stages(&self) -> Result<()> {
        let mount_root = self.mount_root.as_path();
        let mounter = SystemMounter::new(self.runner.clone());

        self.enter(InstallPhase::Preparing, "Preparing disk...", 10)
            .await?;
        let plan = DiskPreparer::new(self.runner.clone())
            .prepare_disk(&self.config.disk, &self.reporter)
            .await?;

        self.enter(InstallPhase::Mounting, "Mounting partitions...", 25)
            .await?;
        mounter.mount_partitions(&plan, mount_root).await?;

        self.enter(InstallPhase::BaseInstall, "Installing base system...", 30)
            .await?;
        BaseSystemInstaller::new(self.runner.clone(), &self.config)
            .install(mount_root)
            .await?;
        self.milestone("Base system installed", 60).await;

        self.enter(InstallPhase::Configuring, "Configuring system...", 65)
            .await?;
        SystemConfigurator::new(self.runner.clone(), &self.config)
            .configure(mount_root)
            .await?;

        self.enter(InstallPhase::UserCreation, "Creating user account...", 75)
            .await?;
        UserProvisioner::new(self.runner.clone(), &self.config)
            .provision(mount_root)
            .await?;

        self.enter(InstallPhase::NetworkConfig, "Configuring network...", 80)
            .await?;
        NetworkConfigurator::new(&self.config)
            .configure(mount_root)
            .await?;

        self.enter(
            InstallPhase::BootloaderInstall,
            "Installing bootloader...",
            85,
        )
        .await?;
        BootloaderInstaller::new(self.runner.clone(), &self.config)
            .install(mount_root)
            .await?;

        self.enter(InstallPhase::FstabGen, "Generating filesystem table...", 90)
            .await?;
        FstabGenerator::new(self.runner.clone())
            .generate(mount_root, &plan)
            .await?;

        self.enter(InstallPhase::CleaningUp, "Cleaning up...", 95)
            .await?;
        mounter.unmount_all(mount_root).await;

        Ok(())
    }

    /// Enter a stage: check for cancellation, record it, report its milestone
    async fn enter(&self, phase: InstallPhase, message: &str, percent: i32) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }
        {
            let mut state = self.state.write().await;
            state.phase = phase;
            state.progress = percent;
        }
        info!("Entering stage {}", phase.as_str());
        self.reporter.update(message, percent);
        Ok(())
    }

    /// Mid-stage milestone that does not change phase
    async fn milestone(&self, message: &str, percent: i32) {
        {
            let mut state = self.state.write().await;
            state.progress = percent;
        }
        self.reporter.update(message, percent);
    }
}

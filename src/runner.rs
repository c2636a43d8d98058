//! llama.cpp process invocation

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

// ============================================================================
// Trait Definitions
// ============================================================================

/// Program and arguments for one external process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// `<binary> -m <model> <passthrough...>`
    pub fn for_model(binary: PathBuf, model_path: &Path, passthrough: &[String]) -> Self {
        let mut args = vec!["-m".to_string(), model_path.to_string_lossy().into_owned()];
        args.extend(passthrough.iter().cloned());
        Self {
            program: binary,
            args,
        }
    }

    /// Command line as a single display string
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a launched process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exited on its own; `None` if killed by a signal
    Exited(Option<i32>),
    /// The user pressed Ctrl-C while it was running
    Interrupted,
}

impl RunOutcome {
    /// Exit code the wrapper should report
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Exited(Some(code)) => code,
            Self::Exited(None) => 1,
            Self::Interrupted => 0,
        }
    }
}

/// Trait for running external programs to completion
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a program with inherited stdio and wait for it to finish
    async fn run(&self, spec: &LaunchSpec) -> Result<RunOutcome>;
}

// ============================================================================
// Production Implementation
// ============================================================================

/// Production runner using tokio::process
#[derive(Debug, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, spec: &LaunchSpec) -> Result<RunOutcome> {
        tracing::info!(command = %spec.display(), "Running command");

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {:?}", spec.program))?;

        tracing::debug!(pid = ?child.id(), "Process spawned");

        // The child shares our process group, so Ctrl-C reaches it directly;
        // we only stop waiting and report the interruption.
        tokio::select! {
            status = child.wait() => {
                let status = status.context("Failed to wait for process")?;
                tracing::debug!(status = %status, "Process exited");
                Ok(RunOutcome::Exited(status.code()))
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted by user");
                let _ = child.wait().await;
                Ok(RunOutcome::Interrupted)
            }
        }
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records launch specs instead of running them
    pub struct MockProcessRunner {
        outcome: RunOutcome,
        launched: Mutex<Vec<LaunchSpec>>,
    }

    impl MockProcessRunner {
        pub fn exiting_with(code: i32) -> Self {
            Self {
                outcome: RunOutcome::Exited(Some(code)),
                launched: Mutex::new(Vec::new()),
            }
        }

        pub fn launched(&self) -> Vec<LaunchSpec> {
            self.launched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn run(&self, spec: &LaunchSpec) -> Result<RunOutcome> {
            self.launched.lock().unwrap().push(spec.clone());
            Ok(self.outcome)
        }
    }
}

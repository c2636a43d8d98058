//! Command implementations shared by the `cllama` and `cllama-cli` binaries
//!
//! Commands return the process exit code on success; any error is reported
//! by the binary and turned into exit code 1.

pub mod launch;
pub mod pull;
pub mod resolve;
pub mod update;

use crate::config::CllamaConfig;
use crate::error::ResolveError;
use crate::models::{RemoteRepository, Resolver};
use crate::runner::ProcessRunner;
use std::sync::Arc;

pub use launch::{LaunchArgs, launch};
pub use pull::{PullArgs, pull};
pub use resolve::{ResolveArgs, resolve};
pub use update::update;

/// Everything a command needs, wired once in `main`
pub struct App {
    pub config: CllamaConfig,
    pub resolver: Resolver,
    pub runner: Arc<dyn ProcessRunner>,
}

impl App {
    pub fn new(
        config: CllamaConfig,
        remote: Arc<dyn RemoteRepository>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let resolver = Resolver::new(remote, config.models_root());
        Self {
            config,
            resolver,
            runner,
        }
    }
}

/// Log the diagnostic detail carried by a resolution failure
pub(crate) fn report_resolve_error(err: &ResolveError) {
    if let ResolveError::NoMatchingRemoteFiles { available, .. } = err {
        if available.is_empty() {
            tracing::info!("Repository has no .gguf files");
        } else {
            tracing::info!("Available .gguf files:");
            for file in available {
                tracing::info!("  - {}", file);
            }
        }
    }
}

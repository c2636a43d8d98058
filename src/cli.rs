//! Command-line arguments and startup shared by both binaries

use crate::commands::{App, LaunchArgs};
use crate::config::CllamaConfig;
use crate::models::HfRepository;
use crate::runner::SystemProcessRunner;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Options accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to configuration file
    // No short flag: `-c` is llama.cpp's context size
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the models directory
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log format (json or pretty)
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,
}

/// Arguments of `cllama run`, `cllama cli` and `cllama-cli`
#[derive(Args, Debug, Clone)]
pub struct LaunchCommand {
    /// Backend to use (vulkan, hip, rocwmma)
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Quantization pattern (e.g., Q4_K_M)
    #[arg(short, long)]
    pub quant: Option<String>,

    /// Repository ID (e.g., user/repo or user/repo:quant)
    pub model: String,

    /// Additional arguments passed to llama.cpp
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub llama_args: Vec<String>,
}

impl From<LaunchCommand> for LaunchArgs {
    fn from(cmd: LaunchCommand) -> Self {
        Self {
            backend: cmd.backend,
            quant: cmd.quant,
            model: cmd.model,
            llama_args: cmd.llama_args,
        }
    }
}

/// Setup logging
pub fn init_logging(level: &str, format: &str) {
    match format {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(level)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(level)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
}

/// Load and validate configuration, then wire up the production app
pub fn bootstrap(global: &GlobalArgs) -> Result<App> {
    let mut config = CllamaConfig::load(global.config.clone())?;

    // CLI overrides
    if let Some(models_dir) = &global.models_dir {
        config.models_dir = models_dir.clone();
    }

    config.validate()?;

    tracing::debug!(
        base_path = ?config.base_path,
        models_root = ?config.models_root(),
        default_backend = %config.default_backend,
        "Configuration loaded"
    );

    let remote = HfRepository::new(config.hf_token.clone(), None).map_err(anyhow::Error::msg)?;

    Ok(App::new(
        config,
        Arc::new(remote),
        Arc::new(SystemProcessRunner::new()),
    ))
}

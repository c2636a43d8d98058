//! llama.cpp backend lookup
//!
//! Each backend (vulkan, hip, rocwmma, ...) is a separate llama.cpp build
//! with its own bin directory holding `llama-server` and `llama-cli`.

use crate::config::CllamaConfig;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("Unsupported backend: {name}. Supported backends: {supported}")]
    Unsupported { name: String, supported: String },

    #[error("Backend '{name}' binary not found at {path:?}")]
    BinaryMissing { name: String, path: PathBuf },
}

/// Which llama.cpp binary to launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Server,
    Cli,
}

impl BinaryKind {
    pub fn binary_name(self, config: &CllamaConfig) -> &str {
        match self {
            Self::Server => &config.server_binary,
            Self::Cli => &config.cli_binary,
        }
    }
}

/// Bin directory of a backend
pub fn backend_dir(config: &CllamaConfig, name: &str) -> Result<PathBuf, BackendError> {
    config
        .backend_dir(name)
        .ok_or_else(|| BackendError::Unsupported {
            name: name.to_string(),
            supported: config.backend_names().join(", "),
        })
}

/// Full path of a backend's binary
pub fn binary_path(
    config: &CllamaConfig,
    name: &str,
    kind: BinaryKind,
) -> Result<PathBuf, BackendError> {
    Ok(backend_dir(config, name)?.join(kind.binary_name(config)))
}

/// Whether a backend is configured and its server binary exists
pub fn validate_backend(config: &CllamaConfig, name: &str) -> bool {
    binary_path(config, name, BinaryKind::Server)
        .map(|path| path.is_file())
        .unwrap_or(false)
}

/// Resolve a binary, checking that it exists on disk
pub fn require_binary(
    config: &CllamaConfig,
    name: &str,
    kind: BinaryKind,
) -> Result<PathBuf, BackendError> {
    let path = binary_path(config, name, kind)?;
    if !path.is_file() {
        return Err(BackendError::BinaryMissing {
            name: name.to_string(),
            path,
        });
    }
    Ok(path)
}

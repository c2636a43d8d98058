//! Configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration
///
/// Relative paths are resolved against `base_path`, which defaults to the
/// current working directory. The layout follows the strix-halo-testing
/// `update-llama.cpp.sh` script, which builds each llama.cpp backend into
/// `llama.cpp-<backend>/build/bin`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CllamaConfig {
    pub base_path: PathBuf,
    pub models_dir: PathBuf,
    pub update_script: PathBuf,
    /// Backend name to llama.cpp bin directory
    pub backends: BTreeMap<String, PathBuf>,
    pub default_backend: String,
    pub server_binary: String,
    pub cli_binary: String,
    /// llama-swap proxy config patched by `pull`
    pub llama_swap_config: PathBuf,

    /// HuggingFace token for gated repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hf_token: Option<String>,
}

impl Default for CllamaConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            models_dir: PathBuf::from("models"),
            update_script: PathBuf::from("update-llama.cpp.sh"),
            backends: default_backends(),
            default_backend: "vulkan".to_string(),
            server_binary: "llama-server".to_string(),
            cli_binary: "llama-cli".to_string(),
            llama_swap_config: default_llama_swap_config(),
            hf_token: None,
        }
    }
}

impl CllamaConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(base_path) = std::env::var("CLLAMA_BASE_PATH") {
            config.base_path = PathBuf::from(base_path);
        }
        if let Ok(models_dir) = std::env::var("CLLAMA_MODELS_DIR") {
            config.models_dir = PathBuf::from(models_dir);
        }
        if let Ok(backend) = std::env::var("CLLAMA_DEFAULT_BACKEND") {
            config.default_backend = backend;
        }
        if let Ok(swap_config) = std::env::var("LLAMA_SWAP_CONFIG") {
            config.llama_swap_config = PathBuf::from(swap_config);
        }
        if let Ok(token) = std::env::var("HF_TOKEN")
            && !token.is_empty()
        {
            config.hf_token = Some(token);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.backends.is_empty() {
            anyhow::bail!("At least one backend must be configured");
        }
        if self.backends.keys().any(|name| name.is_empty()) {
            anyhow::bail!("Backend names cannot be empty");
        }
        if !self.backends.contains_key(&self.default_backend) {
            anyhow::bail!(
                "Default backend '{}' is not configured (configured: {})",
                self.default_backend,
                self.backend_names().join(", ")
            );
        }
        if self.server_binary.is_empty() || self.cli_binary.is_empty() {
            anyhow::bail!("llama.cpp binary names cannot be empty");
        }
        Ok(())
    }

    /// Resolve a path against `base_path`; absolute paths pass through
    pub fn resolve_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base_path.join(relative)
    }

    /// Absolute models directory
    pub fn models_root(&self) -> PathBuf {
        self.resolve_path(&self.models_dir)
    }

    pub fn update_script_path(&self) -> PathBuf {
        self.resolve_path(&self.update_script)
    }

    /// Absolute bin directory of a configured backend
    pub fn backend_dir(&self, name: &str) -> Option<PathBuf> {
        self.backends.get(name).map(|dir| self.resolve_path(dir))
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }
}

fn default_base_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_backends() -> BTreeMap<String, PathBuf> {
    ["vulkan", "hip", "rocwmma"]
        .into_iter()
        .map(|name| {
            (
                name.to_string(),
                PathBuf::from(format!("llama.cpp-{}/build/bin", name)),
            )
        })
        .collect()
}

fn default_llama_swap_config() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents/MyLinuxConfigs/StrixHalo/llama-swap-config.yaml")
}

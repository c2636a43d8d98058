//! `run` and `cli`: resolve a model and launch llama-server or llama-cli

use super::{App, report_resolve_error};
use crate::backend::{BinaryKind, require_binary, validate_backend};
use crate::models::shard::is_shard;
use crate::models::{ModelReference, select_entry};
use crate::runner::LaunchSpec;
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Backend name; the configured default when `None`
    pub backend: Option<String>,
    pub quant: Option<String>,
    pub model: String,
    /// Passed through to llama.cpp after `-m <model>`
    pub llama_args: Vec<String>,
}

/// Resolve the model (downloading if needed) and run a llama.cpp binary on it
///
/// Returns the child's exit code.
pub async fn launch(app: &App, kind: BinaryKind, args: &LaunchArgs) -> Result<i32> {
    let backend = args
        .backend
        .as_deref()
        .unwrap_or(&app.config.default_backend);

    if !validate_backend(&app.config, backend) {
        anyhow::bail!(
            "Backend '{}' not found or binary does not exist (available backends: {})",
            backend,
            app.config.backend_names().join(", ")
        );
    }

    let reference = ModelReference::parse(&args.model, args.quant.as_deref());
    tracing::info!(model = %reference, backend = %backend, "Using model");

    let located = app
        .resolver
        .resolve(&reference, true)
        .await
        .inspect_err(report_resolve_error)
        .with_context(|| format!("Failed to resolve model {}", reference))?;

    let entry = select_entry(&located.files)
        .with_context(|| format!("No .gguf files found for {}", reference))?;

    if located.files.len() > 1 {
        let shards = located
            .file_names()
            .iter()
            .filter(|name| is_shard(name))
            .count();
        tracing::info!(
            dir = ?located.directory,
            count = located.files.len(),
            shards,
            entry = ?entry.file_name(),
            "Multiple model files matched"
        );
        for name in located.file_names() {
            tracing::info!("  - {}", name);
        }
    } else {
        tracing::info!(file = ?entry.file_name(), "Using model file");
    }

    let binary = require_binary(&app.config, backend, kind)?;
    let spec = LaunchSpec::for_model(binary, entry, &args.llama_args);

    let outcome = app.runner.run(&spec).await?;
    Ok(outcome.exit_code())
}

//! `pull`: download a model and register it with llama-swap

use super::{App, report_resolve_error};
use crate::models::ModelReference;
use crate::swap::{self, SwapError};
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullArgs {
    pub model: String,
    pub quant: Option<String>,
    /// Skip patching the llama-swap config
    pub no_swap: bool,
}

/// Download the model's files, verify them on disk, then add a llama-swap
/// entry. A missing llama-swap config is an error; other config update
/// failures only warn.
pub async fn pull(app: &App, args: &PullArgs) -> Result<i32> {
    let reference = ModelReference::parse(&args.model, args.quant.as_deref());
    tracing::info!(model = %reference, "Pulling model");

    let located = app
        .resolver
        .fetch(&reference)
        .await
        .inspect_err(report_resolve_error)
        .with_context(|| format!("Failed to download model {}", reference))?;

    tracing::info!(
        dir = ?located.directory,
        files = ?located.file_names(),
        "Model downloaded successfully"
    );

    if args.no_swap {
        return Ok(0);
    }

    match swap::update_config(
        &app.config.llama_swap_config,
        &reference,
        &located,
        app.resolver.models_root(),
    ) {
        Ok(update) if update.outcome.changed => {
            tracing::info!(
                key = %update.entry.key,
                "Added to llama-swap config. Restart llama-swap for the changes to take effect"
            );
        }
        Ok(_) => {}
        Err(e @ SwapError::ConfigNotFound(_)) => return Err(e.into()),
        Err(e) => tracing::warn!(error = %e, "Failed to update llama-swap config"),
    }

    Ok(0)
}

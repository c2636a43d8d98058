//! `resolve`: show where a model reference resolves to on disk

use super::{App, report_resolve_error};
use crate::models::{ModelReference, key_for, select_entry};
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveArgs {
    pub model: String,
    pub quant: Option<String>,
    /// Never download; fail if the model is not on disk
    pub offline: bool,
}

/// Resolution summary printed by the `resolve` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveReport {
    pub reference: ModelReference,
    pub key: String,
    pub directory: PathBuf,
    pub files: Vec<PathBuf>,
    pub entry: PathBuf,
}

impl ResolveReport {
    pub fn render(&self) -> String {
        let mut out = format!(
            "reference: {}\nkey:       {}\ndirectory: {}\nentry:     {}\nfiles:\n",
            self.reference,
            self.key,
            self.directory.display(),
            self.entry.display()
        );
        for file in &self.files {
            out.push_str(&format!("  - {}\n", file.display()));
        }
        out
    }
}

pub async fn resolve(app: &App, args: &ResolveArgs) -> Result<ResolveReport> {
    let reference = ModelReference::parse(&args.model, args.quant.as_deref());

    let located = app
        .resolver
        .resolve(&reference, !args.offline)
        .await
        .inspect_err(report_resolve_error)
        .with_context(|| format!("Failed to resolve model {}", reference))?;

    let entry = select_entry(&located.files)
        .cloned()
        .with_context(|| format!("No .gguf files found for {}", reference))?;

    Ok(ResolveReport {
        key: key_for(&reference),
        reference,
        directory: located.directory,
        files: located.files,
        entry,
    })
}

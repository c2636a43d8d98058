//! llama-swap proxy config patching
//!
//! After a pull, a model entry is added to the llama-swap YAML config so the
//! proxy can serve it. The config is edited as text, not re-serialized, to
//! keep the user's comments and formatting. Two anchors are used:
//!
//! ```text
//! models:
//!   "existing-model":
//!     ...
//!                                  <- model entry inserted here
//! groups:                          <- anchor "\ngroups:"
//!   "main-group":
//!     members:
//!       - "existing-model"
//!       - "new-model"              <- member line inserted here
//!       "embedding-group":         <- anchor '      "embedding-group":'
//! ```

use crate::models::{LocatedFiles, ModelReference, key_for, select_entry};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Anchor before which new model entries are inserted
pub const GROUPS_ANCHOR: &str = "\ngroups:";

/// Anchor before which new group member lines are inserted
pub const EMBEDDING_GROUP_ANCHOR: &str = "      \"embedding-group\":";

#[derive(Debug, Error)]
pub enum SwapError {
    #[error(
        "llama-swap config not found at {0:?}. Set the LLAMA_SWAP_CONFIG env var to the correct path."
    )]
    ConfigNotFound(PathBuf),

    #[error("No local .gguf files found for {0}")]
    NoLocalFiles(String),

    #[error("Failed to {action} llama-swap config {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A generated llama-swap model entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapEntry {
    pub key: String,
    /// Model path as written in the config, e.g. `${model-root}/Model/m.gguf`
    pub model_path: String,
}

impl SwapEntry {
    /// Build the entry for a located model
    ///
    /// The entry file is the first shard of a split model, otherwise the
    /// first file by name. Its path is written relative to `models_root`
    /// under the `${model-root}` macro, or absolute if outside it.
    pub fn for_model(
        reference: &ModelReference,
        located: &LocatedFiles,
        models_root: &Path,
    ) -> Result<Self, SwapError> {
        let entry = select_entry(&located.files)
            .ok_or_else(|| SwapError::NoLocalFiles(reference.to_string()))?;

        let relative = entry.strip_prefix(models_root).unwrap_or(entry);

        Ok(Self {
            key: key_for(reference),
            model_path: format!("${{model-root}}/{}", relative.to_string_lossy()),
        })
    }

    /// YAML text for the `models:` mapping
    pub fn render_model(&self) -> String {
        format!(
            concat!(
                "\n  \"{key}\":\n",
                "    cmd: |\n",
                "      ${{latest-llama}}\n",
                "      --port ${{PORT}}\n",
                "      --model {path}\n",
                "      -c 32768\n",
                "      -ngl 999\n",
                "      --jinja\n",
                "    ttl: 600\n",
            ),
            key = self.key,
            path = self.model_path,
        )
    }

    /// YAML text for the main group's `members:` list
    pub fn render_member(&self) -> String {
        format!("      - \"{}\"\n", self.key)
    }

    /// Patch inserting this entry and its group membership
    pub fn patch(&self) -> SwapPatch {
        SwapPatch {
            ops: vec![
                PatchOp::InsertBefore {
                    anchor: GROUPS_ANCHOR,
                    text: self.render_model(),
                    required: true,
                },
                PatchOp::InsertBefore {
                    anchor: EMBEDDING_GROUP_ANCHOR,
                    text: self.render_member(),
                    required: false,
                },
            ],
        }
    }
}

/// One textual edit keyed by an anchor string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Insert `text` before the first occurrence of `anchor`. If a required
    /// anchor is missing the whole patch is abandoned.
    InsertBefore {
        anchor: &'static str,
        text: String,
        required: bool,
    },
}

/// Ordered list of edits applied to a config document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPatch {
    pub ops: Vec<PatchOp>,
}

/// Result of applying a patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub content: String,
    /// Anchors that were not found, in op order
    pub missing_anchors: Vec<&'static str>,
    /// Whether anything was inserted
    pub changed: bool,
}

impl SwapPatch {
    /// Apply all edits to `content`. Pure.
    pub fn apply(&self, content: &str) -> PatchOutcome {
        let mut result = content.to_string();
        let mut missing_anchors = Vec::new();
        let mut changed = false;

        for op in &self.ops {
            let PatchOp::InsertBefore {
                anchor,
                text,
                required,
            } = op;

            match result.find(anchor) {
                Some(at) => {
                    result.insert_str(at, text);
                    changed = true;
                }
                None if *required => {
                    missing_anchors.push(*anchor);
                    return PatchOutcome {
                        content: content.to_string(),
                        missing_anchors,
                        changed: false,
                    };
                }
                None => missing_anchors.push(*anchor),
            }
        }

        PatchOutcome {
            content: result,
            missing_anchors,
            changed,
        }
    }
}

/// What `update_config` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapUpdate {
    pub entry: SwapEntry,
    pub outcome: PatchOutcome,
}

/// Add a pulled model to the llama-swap config file at `config_path`
///
/// Missing anchors are logged and skipped, not errors; the file is only
/// rewritten when something was inserted.
pub fn update_config(
    config_path: &Path,
    reference: &ModelReference,
    located: &LocatedFiles,
    models_root: &Path,
) -> Result<SwapUpdate, SwapError> {
    if !config_path.exists() {
        return Err(SwapError::ConfigNotFound(config_path.to_path_buf()));
    }

    let entry = SwapEntry::for_model(reference, located, models_root)?;

    let content = std::fs::read_to_string(config_path).map_err(|source| SwapError::Io {
        action: "read",
        path: config_path.to_path_buf(),
        source,
    })?;

    let outcome = entry.patch().apply(&content);

    for anchor in &outcome.missing_anchors {
        tracing::warn!(
            anchor = %anchor.trim(),
            config = ?config_path,
            "Anchor not found in llama-swap config, skipping insertion"
        );
    }

    if outcome.changed {
        std::fs::write(config_path, &outcome.content).map_err(|source| SwapError::Io {
            action: "write",
            path: config_path.to_path_buf(),
            source,
        })?;
        tracing::info!(key = %entry.key, config = ?config_path, "llama-swap config updated");
    }

    Ok(SwapUpdate { entry, outcome })
}

//! Model reference parsing
//!
//! A model reference is the human-typed `repo[:quant]` string given on the
//! command line, e.g. `unsloth/Qwen3-8B-GGUF:Q4_K_M`.

use std::fmt;

/// Parsed model reference: a HuggingFace repository plus an optional
/// quantization tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelReference {
    /// Repository ID (e.g., "unsloth/Qwen3-8B-GGUF")
    pub repo_id: String,
    /// Quantization tag, case preserved (e.g., "Q4_K_M")
    pub quant: Option<String>,
}

impl ModelReference {
    pub fn new(repo_id: impl Into<String>, quant: Option<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            quant,
        }
    }

    /// Parse a reference string, splitting at the last `:`.
    ///
    /// Everything left of the final colon is kept verbatim as the repo ID.
    /// An empty quant after the colon counts as no quant, and a non-empty
    /// `quant_override` replaces whatever quant was parsed.
    /// Parsing never fails; a malformed reference only fails later lookups.
    pub fn parse(raw: &str, quant_override: Option<&str>) -> Self {
        let (repo_id, quant) = match raw.rsplit_once(':') {
            Some((repo, "")) => (repo.to_string(), None),
            Some((repo, quant)) => (repo.to_string(), Some(quant.to_string())),
            None => (raw.to_string(), None),
        };

        let quant = match quant_override {
            Some(q) if !q.is_empty() => Some(q.to_string()),
            _ => quant,
        };

        Self { repo_id, quant }
    }

    /// Last path segment of the repo ID, used for on-disk lookup
    ///
    /// `"user/Model-GGUF"` -> `"Model-GGUF"`; IDs without `/` are returned whole.
    pub fn short_name(&self) -> &str {
        self.repo_id
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.repo_id)
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.quant {
            Some(quant) => write!(f, "{}:{}", self.repo_id, quant),
            None => write!(f, "{}", self.repo_id),
        }
    }
}

//! Error types for model resolution and its collaborators

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the remote repository capability
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Repository unreachable or unknown; the two are not distinguished
    #[error("Failed to list files from {repo_id}: {message}")]
    Listing { repo_id: String, message: String },

    #[error("Failed to download {file} from {repo_id}: {message}")]
    Transport {
        repo_id: String,
        file: String,
        message: String,
    },
}

/// Terminal outcomes of resolving a model reference
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Model not found locally and auto-download disabled: {reference}")]
    NotLocallyAvailable { reference: String },

    /// `available` lists the repository's `.gguf` files as a diagnostic aid
    #[error("No files found matching quantization '{quant}' in {repo_id}")]
    NoMatchingRemoteFiles {
        repo_id: String,
        quant: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    RemoteListing(RemoteError),

    #[error(transparent)]
    DownloadFailed(RemoteError),

    #[error("Download of {reference} reported success but no matching files appeared in {root:?}")]
    PostDownloadVerificationFailed { reference: String, root: PathBuf },

    /// A resolution step received an event it cannot handle
    #[error("Invalid resolution step: {event} in state {state}")]
    InvalidTransition { state: String, event: String },

    #[error("Failed to access models directory {root:?}: {source}")]
    Io {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolveError::NoMatchingRemoteFiles {
            repo_id: "Org/Model-GGUF".to_string(),
            quant: "Q4_K_M".to_string(),
            available: vec![],
        };
        assert!(err.to_string().contains("Q4_K_M"));
        assert!(err.to_string().contains("Org/Model-GGUF"));

        let err = ResolveError::DownloadFailed(RemoteError::Transport {
            repo_id: "Org/Model-GGUF".to_string(),
            file: "model.gguf".to_string(),
            message: "connection reset".to_string(),
        });
        assert!(err.to_string().contains("connection reset"));
    }
}

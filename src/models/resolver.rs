//! Model resolution: check local disk, else fetch, then re-check
//!
//! Resolution is a small state machine:
//!
//! ```text
//! Start ──located──────────────────────────────▶ Resolved
//!   │ absent (download allowed)
//!   ▼
//! Downloading ──listed──▶ download ──done──▶ Verifying ──located──▶ Resolved
//!   │ no match / transport error                  │ absent
//!   ▼                                             ▼
//! Failed                                        Failed
//! ```
//!
//! [`transition`] is pure: it maps `(state, event)` to the next state and the
//! side effect the driver should perform next. [`Resolver`] performs those
//! effects against the filesystem and a [`RemoteRepository`]. Presence is only
//! ever established by [`locate`], for cache hits and fresh downloads alike.

use super::download::RemoteRepository;
use super::locator::{LocatedFiles, locate};
use super::matching::{gguf_files, match_remote_files};
use super::reference::ModelReference;
use crate::error::{RemoteError, ResolveError, ResolveResult};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Phase of a single resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Start,
    Downloading,
    Verifying,
    Resolved,
    Failed,
}

/// Outcome of the side effect last requested by [`transition`]
#[derive(Debug)]
pub enum ResolveEvent {
    Located(Option<LocatedFiles>),
    /// Reading or preparing the models root failed
    IoFailed(io::Error),
    Listed(Vec<String>),
    ListingFailed(RemoteError),
    Downloaded,
    DownloadFailed(RemoteError),
}

/// Side effect requested by [`transition`]
#[derive(Debug)]
pub enum Effect {
    /// Scan the models root for the reference's files
    Locate,
    /// List the remote repository
    ListRemote,
    /// Download into the models root; `None` means every `.gguf` file
    Download(Option<Vec<String>>),
    /// Terminal: resolution finished
    Finish(ResolveResult<LocatedFiles>),
}

/// Inputs fixed for the duration of one resolution
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub reference: ModelReference,
    pub root: PathBuf,
    pub allow_download: bool,
}

impl ResolveRequest {
    /// Entry point: a normal resolution starts by looking on disk
    pub fn begin(&self) -> (ResolveState, Effect) {
        (ResolveState::Start, Effect::Locate)
    }

    /// Entry point that skips the cache check and always fetches
    pub fn begin_fetch(&self) -> (ResolveState, Effect) {
        (ResolveState::Downloading, Effect::ListRemote)
    }
}

fn fail(err: ResolveError) -> (ResolveState, Effect) {
    (ResolveState::Failed, Effect::Finish(Err(err)))
}

/// Compute the next state and effect. Performs no I/O.
pub fn transition(
    state: ResolveState,
    event: ResolveEvent,
    request: &ResolveRequest,
) -> (ResolveState, Effect) {
    use ResolveEvent::*;
    use ResolveState::*;

    let reference = &request.reference;

    match (state, event) {
        (Start | Downloading | Verifying, IoFailed(source)) => fail(ResolveError::Io {
            root: request.root.clone(),
            source,
        }),

        (Start, Located(Some(files))) => (Resolved, Effect::Finish(Ok(files))),
        (Start, Located(None)) if !request.allow_download => {
            fail(ResolveError::NotLocallyAvailable {
                reference: reference.to_string(),
            })
        }
        (Start, Located(None)) => (Downloading, Effect::ListRemote),

        (Downloading, ListingFailed(e)) => fail(ResolveError::RemoteListing(e)),
        (Downloading, Listed(remote)) => match &reference.quant {
            Some(quant) => {
                let matching = match_remote_files(&remote, quant);
                if matching.is_empty() {
                    fail(ResolveError::NoMatchingRemoteFiles {
                        repo_id: reference.repo_id.clone(),
                        quant: quant.clone(),
                        available: gguf_files(&remote),
                    })
                } else {
                    (Downloading, Effect::Download(Some(matching)))
                }
            }
            None => (Downloading, Effect::Download(None)),
        },
        (Downloading, DownloadFailed(e)) => fail(ResolveError::DownloadFailed(e)),
        (Downloading, Downloaded) => (Verifying, Effect::Locate),

        (Verifying, Located(Some(files))) => (Resolved, Effect::Finish(Ok(files))),
        (Verifying, Located(None)) => fail(ResolveError::PostDownloadVerificationFailed {
            reference: reference.to_string(),
            root: request.root.clone(),
        }),

        (state, event) => fail(ResolveError::InvalidTransition {
            state: format!("{:?}", state),
            event: format!("{:?}", event),
        }),
    }
}

/// Resolves references against a models root, downloading when needed
pub struct Resolver {
    remote: Arc<dyn RemoteRepository>,
    models_root: PathBuf,
}

impl Resolver {
    pub fn new(remote: Arc<dyn RemoteRepository>, models_root: PathBuf) -> Self {
        Self {
            remote,
            models_root,
        }
    }

    pub fn models_root(&self) -> &Path {
        &self.models_root
    }

    /// Resolve a reference to local files
    ///
    /// Local files always win; the remote is only consulted when nothing
    /// matches on disk and `allow_download` is set.
    pub async fn resolve(
        &self,
        reference: &ModelReference,
        allow_download: bool,
    ) -> ResolveResult<LocatedFiles> {
        let request = self.request(reference, allow_download);
        let (state, effect) = request.begin();
        self.drive(&request, state, effect).await
    }

    /// Parse a raw reference string and resolve it
    pub async fn resolve_raw(
        &self,
        raw: &str,
        quant_override: Option<&str>,
        allow_download: bool,
    ) -> ResolveResult<(ModelReference, LocatedFiles)> {
        let reference = ModelReference::parse(raw, quant_override);
        let located = self.resolve(&reference, allow_download).await?;
        Ok((reference, located))
    }

    /// Download a reference's files even if some are present, then verify
    pub async fn fetch(&self, reference: &ModelReference) -> ResolveResult<LocatedFiles> {
        let request = self.request(reference, true);
        let (state, effect) = request.begin_fetch();
        self.drive(&request, state, effect).await
    }

    fn request(&self, reference: &ModelReference, allow_download: bool) -> ResolveRequest {
        ResolveRequest {
            reference: reference.clone(),
            root: self.models_root.clone(),
            allow_download,
        }
    }

    async fn drive(
        &self,
        request: &ResolveRequest,
        mut state: ResolveState,
        mut effect: Effect,
    ) -> ResolveResult<LocatedFiles> {
        let repo_id = request.reference.repo_id.as_str();

        loop {
            let event = match effect {
                Effect::Finish(result) => {
                    tracing::debug!(reference = %request.reference, state = ?state, "Resolution finished");
                    return result;
                }
                Effect::Locate => match locate(&request.reference, &request.root) {
                    Ok(found) => ResolveEvent::Located(found),
                    Err(e) => ResolveEvent::IoFailed(e),
                },
                Effect::ListRemote => {
                    tracing::info!(repo_id = %repo_id, "Querying HuggingFace repository");
                    match self.remote.list_files(repo_id).await {
                        Ok(files) => ResolveEvent::Listed(files),
                        Err(e) => ResolveEvent::ListingFailed(e),
                    }
                }
                Effect::Download(files) => {
                    match &files {
                        Some(files) => tracing::info!(
                            repo_id = %repo_id,
                            count = files.len(),
                            files = ?files,
                            "Downloading matching files"
                        ),
                        None => tracing::info!(repo_id = %repo_id, "Downloading all .gguf files"),
                    }

                    if let Err(source) = tokio::fs::create_dir_all(&request.root).await {
                        ResolveEvent::IoFailed(source)
                    } else {
                        match self
                            .remote
                            .download_files(repo_id, files.as_deref(), &request.root)
                            .await
                        {
                            Ok(()) => ResolveEvent::Downloaded,
                            Err(e) => ResolveEvent::DownloadFailed(e),
                        }
                    }
                }
            };

            (state, effect) = transition(state, event, request);
        }
    }
}

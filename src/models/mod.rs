//! Model management module
//!
//! Provides functionality for:
//! - Parsing `repo[:quant]` model references
//! - Locating GGUF files in the local models directory
//! - Selecting the entry shard of split models
//! - Deriving stable config keys for models
//! - Downloading models from HuggingFace Hub when absent locally

pub mod download;
pub mod key;
pub mod locator;
pub mod matching;
pub mod reference;
pub mod resolver;
pub mod shard;

pub use download::{HfRepository, RemoteRepository};
pub use key::{derive_key, key_for};
pub use locator::{LocatedFiles, SearchScope, locate};
pub use matching::{match_remote_files, matches_quant};
pub use reference::ModelReference;
pub use resolver::{Resolver, ResolveState, transition};
pub use shard::select_entry;

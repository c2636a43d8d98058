//! cllama - llama.cpp launcher with HuggingFace model resolution
//!
//! Resolves `repo[:quant]` references to GGUF files in a local models
//! directory, downloading them from the HuggingFace Hub when absent, and
//! launches the matching llama.cpp backend binary on them.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod runner;
pub mod swap;

pub use config::CllamaConfig;
pub use error::{RemoteError, ResolveError, ResolveResult};
pub use models::{LocatedFiles, ModelReference, RemoteRepository, Resolver};
pub use runner::{LaunchSpec, ProcessRunner, RunOutcome, SystemProcessRunner};

//! Entry-point selection for split (multi-shard) GGUF models
//!
//! llama.cpp loads a split model from its first shard and finds the rest by
//! name, so only `*-00001-of-NNNNN.gguf` may be handed to it.

use std::path::{Path, PathBuf};

/// Filename marker carried by the first shard of a split model
pub const FIRST_SHARD_MARKER: &str = "-00001-of-";

/// Whether a filename carries a `-NNNNN-of-MMMMM` shard marker
pub fn is_shard(file_name: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(".gguf") else {
        return false;
    };
    let mut parts = stem.rsplitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(total), Some("of"), Some(rest)) => {
            let index = rest.rsplit_once('-').map(|(_, n)| n).unwrap_or(rest);
            is_zero_padded(total) && is_zero_padded(index)
        }
        _ => false,
    }
}

fn is_zero_padded(s: &str) -> bool {
    s.len() == 5 && s.chars().all(|c| c.is_ascii_digit())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Pick the file to pass to llama.cpp out of a model's candidate files
///
/// The `-00001-of-` shard wins when present; otherwise the lexicographically
/// first filename. Input order does not matter. Returns `None` only for an
/// empty slice.
pub fn select_entry(files: &[PathBuf]) -> Option<&PathBuf> {
    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort_by_key(|p| file_name(p));

    sorted
        .iter()
        .find(|p| file_name(p).contains(FIRST_SHARD_MARKER))
        .or_else(|| sorted.first())
        .copied()
}

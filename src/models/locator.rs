//! Local model file lookup
//!
//! The models root may hold a model in one of two layouts:
//!
//! ```text
//! models/
//! ├── Qwen3-8B-GGUF/                  # per-repo subdirectory (authoritative)
//! │   ├── Qwen3-8B-Q4_K_M.gguf
//! │   └── Qwen3-8B-Q8_0.gguf
//! ├── Llama-3-8B-Q4_K_M.gguf          # flat files, matched by repo short name
//! └── Llama-3-8B-Q8_0.gguf
//! ```
//!
//! If `models/<short_name>/` exists it is the only place searched. Otherwise
//! the root itself is scanned for `.gguf` files whose name contains the short
//! name, ignoring case.

use super::matching::{contains_ignore_case, is_gguf, matches_quant};
use super::reference::ModelReference;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Model files found on local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFiles {
    /// Directory the files were found in (subdirectory or models root)
    pub directory: PathBuf,
    /// Matching `.gguf` files, sorted by filename
    pub files: Vec<PathBuf>,
}

impl LocatedFiles {
    /// Filenames of the located files, in order
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

/// Where to look for a reference's files, and which name filter applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// `root/<short_name>/` exists: every `.gguf` inside belongs to the model
    Subdirectory(PathBuf),
    /// Flat layout: `.gguf` files in the root whose name contains `short_name`
    Flat { root: PathBuf, short_name: String },
}

impl SearchScope {
    /// Pick the scope for a reference under `root`
    pub fn for_reference(reference: &ModelReference, root: &Path) -> Self {
        let short_name = reference.short_name();
        let subdir = root.join(short_name);

        if is_plain_name(short_name) && subdir.is_dir() {
            Self::Subdirectory(subdir)
        } else {
            Self::Flat {
                root: root.to_path_buf(),
                short_name: short_name.to_string(),
            }
        }
    }

    pub fn directory(&self) -> &Path {
        match self {
            Self::Subdirectory(dir) => dir,
            Self::Flat { root, .. } => root,
        }
    }

    fn admits(&self, file_name: &str) -> bool {
        match self {
            Self::Subdirectory(_) => true,
            Self::Flat { short_name, .. } => contains_ignore_case(file_name, short_name),
        }
    }
}

/// A single normal path component; `.`, `..` and empty names never name a subdirectory
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Locate a reference's model files under `root`
///
/// Returns `Ok(None)` when no file survives the name and quant filters,
/// including when the root does not exist yet. Other filesystem errors are
/// returned as-is.
pub fn locate(reference: &ModelReference, root: &Path) -> io::Result<Option<LocatedFiles>> {
    let scope = SearchScope::for_reference(reference, root);
    let directory = scope.directory();

    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(dir = ?directory, "Models directory does not exist");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        if !is_gguf(&name) || !scope.admits(&name) || !path.is_file() {
            continue;
        }
        if let Some(quant) = &reference.quant
            && !matches_quant(&name, quant)
        {
            continue;
        }
        files.push(path);
    }

    if files.is_empty() {
        tracing::debug!(reference = %reference, scope = ?scope, "No local files match");
        return Ok(None);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    tracing::debug!(
        reference = %reference,
        dir = ?directory,
        count = files.len(),
        "Located local model files"
    );

    Ok(Some(LocatedFiles {
        directory: directory.to_path_buf(),
        files,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn reference(raw: &str) -> ModelReference {
        ModelReference::parse(raw, None)
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("does-not-exist");
        assert_eq!(locate(&reference("user/model"), &root).unwrap(), None);
    }

    #[test]
    fn test_empty_root_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(locate(&reference("user/model"), temp_dir.path()).unwrap(), None);
    }

    #[test]
    fn test_subdirectory_layout() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("MyModel-GGUF");
        touch(&dir.join("weights-Q8_0.gguf"));
        touch(&dir.join("weights-Q4_K_M.gguf"));
        touch(&dir.join("README.md"));

        let found = locate(&reference("user/MyModel-GGUF"), temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.directory, dir);
        assert_eq!(
            found.file_names(),
            vec!["weights-Q4_K_M.gguf", "weights-Q8_0.gguf"]
        );
    }

    #[test]
    fn test_subdirectory_quant_filter() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("MyModel-GGUF");
        touch(&dir.join("weights-Q8_0.gguf"));
        touch(&dir.join("weights-q4_k_m.gguf"));

        let found = locate(&reference("user/MyModel-GGUF:Q4_K_M"), temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.file_names(), vec!["weights-q4_k_m.gguf"]);

        assert_eq!(
            locate(&reference("user/MyModel-GGUF:IQ2_XS"), temp_dir.path()).unwrap(),
            None
        );
    }

    #[test]
    fn test_subdirectory_is_authoritative() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("mymodel").join("model.gguf"));
        touch(&root.join("mymodel-Q4_K_M.gguf"));
        touch(&root.join("mymodel-Q8_0.gguf"));

        let found = locate(&reference("user/mymodel"), root).unwrap().unwrap();
        assert_eq!(found.directory, root.join("mymodel"));
        assert_eq!(found.file_names(), vec!["model.gguf"]);
    }

    #[test]
    fn test_dot_short_names_never_select_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        touch(&temp_dir.path().join("outside.gguf"));
        touch(&root.join("model-Q4_K_M.gguf"));

        for raw in ["user/..", "user/."] {
            assert!(matches!(
                SearchScope::for_reference(&reference(raw), &root),
                SearchScope::Flat { .. }
            ));
        }
        assert_eq!(locate(&reference("user/.."), &root).unwrap(), None);
    }

    #[test]
    fn test_empty_subdirectory_does_not_fall_back_to_flat() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("mymodel")).unwrap();
        touch(&root.join("mymodel-Q4_K_M.gguf"));

        assert_eq!(locate(&reference("user/mymodel"), root).unwrap(), None);
    }

    #[test]
    fn test_flat_layout_filters_by_short_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("Llama-3-8B-Q4_K_M.gguf"));
        touch(&root.join("Qwen3-8B-Q4_K_M.gguf"));

        let found = locate(&reference("meta/Llama-3-8B"), root).unwrap().unwrap();
        assert_eq!(found.directory, root);
        assert_eq!(found.file_names(), vec!["Llama-3-8B-Q4_K_M.gguf"]);
    }

    #[test]
    fn test_flat_short_name_match_ignores_case() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("llama-3-8b-Q4_K_M.gguf"));

        let found = locate(&reference("meta/Llama-3-8B"), temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.file_names(), vec!["llama-3-8b-Q4_K_M.gguf"]);
    }

    #[test]
    fn test_flat_layout_shares_short_name_across_repos() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("model-Q4_K_M.gguf"));
        touch(&root.join("other-model-Q4_K_M.gguf"));

        let found = locate(&reference("x/model:Q4_K_M"), root).unwrap().unwrap();
        assert_eq!(found.files.len(), 2);
    }

    #[test]
    fn test_non_gguf_files_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("model.safetensors"));
        touch(&root.join("model-Q4_K_M.gguf.incomplete"));

        assert_eq!(locate(&reference("user/model"), root).unwrap(), None);
    }

    #[test]
    fn test_lookup_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("Q4_K_M").join("model-Q4_K_M.gguf"));

        assert_eq!(locate(&reference("user/model:Q4_K_M"), root).unwrap(), None);
    }

    #[test]
    fn test_split_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("model-Q4_K_M-00002-of-00002.gguf"));
        touch(&root.join("model-Q4_K_M-00001-of-00002.gguf"));

        let found = locate(&reference("x/model:Q4_K_M"), root).unwrap().unwrap();
        assert_eq!(
            found.file_names(),
            vec![
                "model-Q4_K_M-00001-of-00002.gguf",
                "model-Q4_K_M-00002-of-00002.gguf"
            ]
        );
    }
}

//! Remote model repository access using hf-hub
//!
//! Files are fetched into the HuggingFace hub cache by hf-hub and then
//! linked (or copied) into the local models directory, keeping their
//! repository-relative path.

use crate::error::RemoteError;
use async_trait::async_trait;
use hf_hub::Cache;
use hf_hub::api::tokio::{Api, ApiBuilder, ApiRepo};
use std::path::{Path, PathBuf};

use super::matching::is_gguf;

/// Remote listing and download capability
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// List file paths in a repository
    async fn list_files(&self, repo_id: &str) -> Result<Vec<String>, RemoteError>;

    /// Download files into `dest_dir`; `None` downloads every `.gguf` file
    async fn download_files(
        &self,
        repo_id: &str,
        files: Option<&[String]>,
        dest_dir: &Path,
    ) -> Result<(), RemoteError>;
}

/// HuggingFace Hub repository client
pub struct HfRepository {
    api: Api,
}

impl HfRepository {
    /// Create a client, optionally with an explicit token and a custom hub cache
    ///
    /// Without an explicit token the one saved by `huggingface-cli login`
    /// next to the hub cache is used, if any.
    pub fn new(token: Option<String>, cache_dir: Option<PathBuf>) -> Result<Self, String> {
        let cache = cache_dir.map(Cache::new).unwrap_or_else(Cache::from_env);
        let token = auth_token(token, &cache);
        tracing::debug!(authenticated = token.is_some(), "Creating HF API client");

        let api = ApiBuilder::from_cache(cache)
            .with_token(token)
            .with_progress(true)
            .build()
            .map_err(|e| format!("Failed to create HF API client: {}", e))?;
        Ok(Self { api })
    }

    fn repo(&self, repo_id: &str) -> ApiRepo {
        self.api.model(repo_id.to_string())
    }

    async fn download_file(
        &self,
        repo: &ApiRepo,
        repo_id: &str,
        file: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, RemoteError> {
        let transport = |message: String| RemoteError::Transport {
            repo_id: repo_id.to_string(),
            file: file.to_string(),
            message,
        };

        tracing::info!(repo_id = %repo_id, file = %file, "Downloading file");
        let cached = repo.get(file).await.map_err(|e| transport(e.to_string()))?;

        let local = dest_dir.join(file);
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| transport(format!("cannot create {:?}: {}", parent, e)))?;
        }
        if tokio::fs::try_exists(&local).await.unwrap_or(false) {
            tokio::fs::remove_file(&local)
                .await
                .map_err(|e| transport(format!("cannot replace {:?}: {}", local, e)))?;
        }
        if tokio::fs::hard_link(&cached, &local).await.is_err() {
            tracing::debug!(from = ?cached, to = ?local, "Hard link failed, copying");
            tokio::fs::copy(&cached, &local)
                .await
                .map_err(|e| transport(format!("cannot copy into {:?}: {}", local, e)))?;
        }

        Ok(local)
    }
}

/// Explicit token if given, else the saved login token of `cache`
fn auth_token(explicit: Option<String>, cache: &Cache) -> Option<String> {
    explicit.or_else(|| cache.token())
}

#[async_trait]
impl RemoteRepository for HfRepository {
    async fn list_files(&self, repo_id: &str) -> Result<Vec<String>, RemoteError> {
        let info = self
            .repo(repo_id)
            .info()
            .await
            .map_err(|e| RemoteError::Listing {
                repo_id: repo_id.to_string(),
                message: e.to_string(),
            })?;

        let files: Vec<String> = info
            .siblings
            .into_iter()
            .map(|s| s.rfilename)
            .filter(|f| !f.starts_with('.'))
            .collect();

        tracing::debug!(repo_id = %repo_id, count = files.len(), "Listed repository files");
        Ok(files)
    }

    async fn download_files(
        &self,
        repo_id: &str,
        files: Option<&[String]>,
        dest_dir: &Path,
    ) -> Result<(), RemoteError> {
        let selected: Vec<String> = match files {
            Some(files) => files.to_vec(),
            None => self
                .list_files(repo_id)
                .await?
                .into_iter()
                .filter(|f| is_gguf(f))
                .collect(),
        };

        let repo = self.repo(repo_id);
        for file in &selected {
            let local = self.download_file(&repo, repo_id, file, dest_dir).await?;
            tracing::debug!(path = ?local, "File available locally");
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory repository that "downloads" by creating empty files
    pub struct MockRepository {
        files: Vec<String>,
        fail_listing: bool,
        fail_download: bool,
        listings: Mutex<Vec<String>>,
        downloads: Mutex<Vec<(String, Option<Vec<String>>)>>,
    }

    impl MockRepository {
        pub fn with_files(files: &[&str]) -> Self {
            Self {
                files: files.iter().map(|f| f.to_string()).collect(),
                fail_listing: false,
                fail_download: false,
                listings: Mutex::new(Vec::new()),
                downloads: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_listing() -> Self {
            Self {
                fail_listing: true,
                ..Self::with_files(&[])
            }
        }

        pub fn failing_download(files: &[&str]) -> Self {
            Self {
                fail_download: true,
                ..Self::with_files(files)
            }
        }

        pub fn listing_count(&self) -> usize {
            self.listings.lock().unwrap().len()
        }

        /// Recorded download calls as `(repo_id, requested files)`
        pub fn downloads(&self) -> Vec<(String, Option<Vec<String>>)> {
            self.downloads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteRepository for MockRepository {
        async fn list_files(&self, repo_id: &str) -> Result<Vec<String>, RemoteError> {
            self.listings.lock().unwrap().push(repo_id.to_string());
            if self.fail_listing {
                return Err(RemoteError::Listing {
                    repo_id: repo_id.to_string(),
                    message: "repository not found".to_string(),
                });
            }
            Ok(self.files.clone())
        }

        async fn download_files(
            &self,
            repo_id: &str,
            files: Option<&[String]>,
            dest_dir: &Path,
        ) -> Result<(), RemoteError> {
            self.downloads
                .lock()
                .unwrap()
                .push((repo_id.to_string(), files.map(<[String]>::to_vec)));

            if self.fail_download {
                return Err(RemoteError::Transport {
                    repo_id: repo_id.to_string(),
                    file: "*".to_string(),
                    message: "connection reset".to_string(),
                });
            }

            let selected: Vec<&String> = match files {
                Some(files) => files.iter().collect(),
                None => self.files.iter().filter(|f| is_gguf(f)).collect(),
            };
            for file in selected {
                let path = dest_dir.join(file);
                std::fs::create_dir_all(path.parent().unwrap_or(dest_dir)).unwrap();
                std::fs::write(path, b"").unwrap();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_records_downloads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let repo = MockRepository::with_files(&["readme.md", "model-Q4_K_M.gguf"]);

        repo.download_files("user/model", None, temp_dir.path())
            .await
            .unwrap();

        assert!(temp_dir.path().join("model-Q4_K_M.gguf").exists());
        assert!(!temp_dir.path().join("readme.md").exists());
        assert_eq!(repo.downloads(), vec![("user/model".to_string(), None)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation_with_cache_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let repo = HfRepository::new(None, Some(temp_dir.path().to_path_buf()));
        assert!(repo.is_ok());
    }

    /// Hub cache at `<dir>/hub` with a saved login token at `<dir>/token`
    fn cache_with_saved_token(dir: &Path, token: &str) -> Cache {
        std::fs::write(dir.join("token"), token).unwrap();
        Cache::new(dir.join("hub"))
    }

    #[test]
    fn test_saved_login_token_used_without_explicit_token() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = cache_with_saved_token(temp_dir.path(), "hf_saved\n");
        assert_eq!(auth_token(None, &cache).as_deref(), Some("hf_saved"));
    }

    #[test]
    fn test_explicit_token_wins_over_saved_login() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = cache_with_saved_token(temp_dir.path(), "hf_saved");
        assert_eq!(
            auth_token(Some("hf_env".to_string()), &cache).as_deref(),
            Some("hf_env")
        );
    }

    #[test]
    fn test_no_token_anywhere() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(temp_dir.path().join("hub"));
        assert_eq!(auth_token(None, &cache), None);
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_list_real_repository() {
        let temp_dir = tempfile::tempdir().unwrap();
        let repo = HfRepository::new(None, Some(temp_dir.path().to_path_buf())).unwrap();
        let files = repo
            .list_files("ggml-org/models")
            .await
            .expect("listing failed");
        assert!(!files.is_empty());
        assert!(files.iter().all(|f| !f.starts_with('.')));
    }
}

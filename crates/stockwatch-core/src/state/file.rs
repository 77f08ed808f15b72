// # File State Store
//
// File-based implementation of StateStore.
//
// ## Layout
//
// One text file per (package, region) inside the state directory:
//
// ```text
// <state_dir>/903905_DE.txt   -> "True"
// <state_dir>/903905_US.txt   -> "False"
// ```
//
// The file holds the bare token, nothing else. Writes go to a temporary
// file first and are renamed into place, so a crash mid-write leaves the
// previous token intact.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::model::StateKey;
use crate::traits::state_store::StateStore;

/// File-based state store, one file per key
///
/// # Example
///
/// ```rust,no_run
/// use stockwatch_core::{FileStateStore, Region, StateKey, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/stockwatch").await?;
///     let key = StateKey::new("903905", Region::new("DE")?);
///
///     store.save(&key, "True").await?;
///     assert_eq!(store.load(&key).await?, Some("True".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Open a state directory, creating it if needed
    pub async fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(&dir).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self { dir })
    }

    /// Path of the file holding a key's token
    pub fn path_for(&self, key: &StateKey) -> PathBuf {
        self.dir.join(format!("{}.txt", key))
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut temp = path.to_path_buf();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, key: &StateKey) -> Result<Option<String>, Error> {
        let path = self.path_for(key);
        if !path.exists() {
            tracing::debug!("No state file for {}: {}", key, path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            ))
        })?;

        let token = content.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    async fn save(&self, key: &StateKey, token: &str) -> Result<(), Error> {
        let path = self.path_for(key);
        let temp_path = Self::temp_path(&path);

        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(token.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("State for {} written to {}", key, path.display());
        Ok(())
    }
}

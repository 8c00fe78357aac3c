// # File Device Storage
//
// File-based implementation of DeviceStorage with crash recovery.
//
// ## Purpose
//
// Gives the command-line client a durable "device": the guest flag, the
// guest id, every guest word collection, request-visible cookies and the
// signed-in session survive between runs.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Automatic backup: `.backup` copy of the last good file
// - Recovery: falls back to the backup when the main file does not parse
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "items": {
//     "mywords_guest_mode": "true",
//     "mywords_guest_user_id": "guest-1736424000000-k3j9x0a1b2c3d",
//     "mywords_guest_words_guest-1736424000000-k3j9x0a1b2c3d": "[...]"
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::device_storage::{DeviceStorage, DeviceStorageFactory};

/// Storage file format version
const STORAGE_FILE_VERSION: &str = "1.0";

/// File-based device storage with crash recovery
///
/// Every mutation is written to disk before the call returns. Two processes
/// sharing one file race with last-writer-wins semantics.
///
/// # Example
///
/// ```rust,no_run
/// use mywords_core::storage::FileDeviceStorage;
/// use mywords_core::traits::DeviceStorage;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let storage = FileDeviceStorage::new("/home/me/.local/share/mywords/device.json").await?;
///     storage.set_item("mywords_guest_mode", "true").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileDeviceStorage {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    items: HashMap<String, String>,
    dirty: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StorageFileFormat {
    version: String,
    #[serde(default)]
    items: HashMap<String, String>,
}

impl FileDeviceStorage {
    /// Create or load file storage
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing file
    /// 3. If it does not parse, load the backup
    /// 4. If both fail, start empty
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create storage directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let items = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                items,
                dirty: false,
            })),
        })
    }

    /// Path of the main storage file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_with_recovery(path: &Path) -> Result<HashMap<String, String>, Error> {
        match Self::load(path).await {
            Ok(items) => {
                tracing::debug!("Loaded device storage: {} keys", items.len());
                Ok(items)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Device storage file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty device storage.");
                    return Ok(HashMap::new());
                }

                match Self::load(&backup_path).await {
                    Ok(items) => {
                        tracing::info!("Recovered device storage from backup: {} keys", items.len());
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore device storage from backup: {}",
                                restore_err
                            );
                        }
                        Ok(items)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also unreadable: {}. Starting with empty device storage.",
                            backup_err
                        );
                        Ok(HashMap::new())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load(path: &Path) -> Result<HashMap<String, String>, Error> {
        if !path.exists() {
            tracing::debug!("Device storage file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::device_storage(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let file: StorageFileFormat = serde_json::from_str(&content)?;

        if file.version != STORAGE_FILE_VERSION {
            tracing::warn!(
                "Device storage version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORAGE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.items)
    }

    async fn write(&self) -> Result<(), Error> {
        let mut guard = self.state.write().await;

        let file = StorageFileFormat {
            version: STORAGE_FILE_VERSION.to_string(),
            items: guard.items.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        {
            let mut out = fs::File::create(&temp_path).await.map_err(|e| {
                Error::device_storage(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            out.write_all(json.as_bytes()).await.map_err(|e| {
                Error::device_storage(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            out.flush().await.map_err(|e| {
                Error::device_storage(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create device storage backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::device_storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        guard.dirty = false;
        tracing::trace!("Device storage written: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl DeviceStorage for FileDeviceStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.state.read().await.items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        {
            let mut guard = self.state.write().await;
            guard.items.insert(key.to_string(), value.to_string());
            guard.dirty = true;
        }
        self.write().await
    }

    async fn remove_item(&self, key: &str) -> Result<(), Error> {
        {
            let mut guard = self.state.write().await;
            if guard.items.remove(key).is_none() {
                return Ok(());
            }
            guard.dirty = true;
        }
        self.write().await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.state.read().await.items.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        if self.state.read().await.dirty {
            self.write().await
        } else {
            Ok(())
        }
    }
}

/// Factory registered under `"file"`
///
/// Expects the serialized `DeviceStorageConfig::File`, i.e. an object with a `path`.
pub struct FileDeviceStorageFactory;

#[async_trait]
impl DeviceStorageFactory for FileDeviceStorageFactory {
    async fn create(&self, config: &serde_json::Value) -> Result<Arc<dyn DeviceStorage>, Error> {
        let path = config
            .get("path")
            .and_then(|p| p.as_str())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::config("File device storage requires a non-empty 'path'"))?;

        Ok(Arc::new(FileDeviceStorage::new(path).await?))
    }
}

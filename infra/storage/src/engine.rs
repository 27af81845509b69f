//! Core storage engine: sandboxed atomic writes, streaming opens, and directory listings.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::index::{self, IndexEntry};
use crate::maintenance::{self, TMP_MARKER};
use crate::path::RelativePath;
use crate::security;
use chrono::{DateTime, Utc};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// How [`Storage::write`] treats an existing file at the target path.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum WriteMode {
    /// Atomically replace whatever is there ("latest wins").
    Replace,
    /// Publish only if nothing exists yet; otherwise [`StorageError::AlreadyExists`].
    ///
    /// Publishing hard-links the temp file onto the target, so the storage root must live on a
    /// filesystem with hard-link support.
    #[default]
    CreateNew,
}

/// Result of a successful write.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub relative_path: RelativePath,
    pub public_url: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    /// An existing file was replaced.
    pub replaced: bool,
}

/// An opened regular file inside the sandbox, ready to be streamed.
#[derive(Debug)]
pub struct OpenedFile {
    pub file: fs::File,
    pub len: u64,
    /// Canonical physical path; never hand this to clients.
    pub path: PathBuf,
}

/// The internal shared state of a [`Storage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical path on the disk where all data is stored.
    pub(crate) root: PathBuf,
    /// First segment of public URLs, without slashes.
    pub(crate) public_prefix: String,
    /// A unique counter used to generate temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A thread-safe handle to the storage engine.
///
/// All paths are validated against the sandbox root before any filesystem access. Writes go
/// through a temp file that is fsynced and then published with `rename` (replace) or
/// `hard_link` (create-new), so readers never observe a partially written file.
///
/// The handle is internally reference-counted and cheap to clone.
///
/// # Example
///
/// ```rust
/// use depot_storage::{RelativePath, Storage, StorageError, WriteMode};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("public");
///     let storage = Storage::builder().root(&root).public_prefix("uploads").connect().await?;
///
///     let path = RelativePath::parse("logos/logo.png")?;
///     let stored = storage.write(&path, b"\x89PNG", WriteMode::Replace).await?;
///     assert_eq!(stored.public_url, "/uploads/logos/logo.png");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Canonical storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// `/${publicPrefix}/${relativePath}`.
    #[must_use]
    pub fn public_url(&self, relative: &str) -> String {
        if self.public_prefix.is_empty() {
            format!("/{relative}")
        } else {
            format!("/{}/{relative}", self.public_prefix)
        }
    }

    /// Resolves a relative path to a physical path inside the sandbox.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::contain(&self.root, path)
    }

    /// Persists `data` at `path`.
    ///
    /// Missing ancestors are created. The payload goes to a unique temp file next to the
    /// target, is fsynced, and is then published according to `mode`. The temp file is removed
    /// on every exit path.
    ///
    /// # Errors
    /// - [`StorageError::PathTraversalAttempt`] if the target escapes the sandbox.
    /// - [`StorageError::AlreadyExists`] in [`WriteMode::CreateNew`] when the target exists.
    /// - [`StorageError::Io`] on any filesystem failure.
    pub async fn write(
        &self,
        path: &RelativePath,
        data: &[u8],
        mode: WriteMode,
    ) -> Result<StoredFile, StorageError> {
        let resolved = self.resolve(path.to_path_buf())?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directories for {path}"))?;
            // Re-check now that the chain exists: a symlink may have been planted meanwhile.
            security::contain(&self.root, path.to_path_buf())?;
        }

        let mut temp = TempFile::new(unique_tmp_path(&resolved, &self.tmp_counter));
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(temp.path())
                .await
                .context(format!("Temp creation failed for {path}"))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        let replaced = match mode {
            WriteMode::Replace => {
                let existed = fs::try_exists(&resolved).await.unwrap_or(false);
                fs::rename(temp.path(), &resolved)
                    .await
                    .context(format!("Atomic swap failed for {path}"))?;
                temp.disarm();
                existed
            },
            WriteMode::CreateNew => {
                match fs::hard_link(temp.path(), &resolved).await {
                    Ok(()) => {},
                    Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                        return Err(StorageError::AlreadyExists {
                            message: path.to_string().into(),
                            context: None,
                        });
                    },
                    Err(err) => {
                        return Err(StorageError::Io {
                            source: err,
                            context: Some(format!("Publishing {path} failed").into()),
                        });
                    },
                }
                false
            },
        };
        drop(temp);

        if let Some(parent) = resolved.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(path = %path, size = data.len(), replaced, "File saved atomically");
        Ok(StoredFile {
            relative_path: path.clone(),
            public_url: self.public_url(path.as_str()),
            size_bytes: data.len() as u64,
            created_at: Utc::now(),
            replaced,
        })
    }

    /// Opens a regular file inside the sandbox for streaming.
    ///
    /// # Errors
    /// - [`StorageError::PathTraversalAttempt`] if the path (after symlink resolution) escapes.
    /// - [`StorageError::FileNotFound`] if nothing exists there or it is not a regular file.
    /// - [`StorageError::Io`] on other filesystem failures.
    pub async fn open(&self, path: impl AsRef<Path>) -> Result<OpenedFile, StorageError> {
        let path = path.as_ref();
        let resolved = self.resolve(path)?;

        let not_found = || StorageError::FileNotFound {
            message: path.display().to_string().into(),
            context: None,
        };

        let metadata = match fs::metadata(&resolved).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some("Failed to read metadata".into()),
                });
            },
        };
        if !metadata.is_file() || is_tmp_path(&resolved) {
            return Err(not_found());
        }

        let file = match fs::File::open(&resolved).await {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some("Failed to open file".into()),
                });
            },
        };

        Ok(OpenedFile { file, len: metadata.len(), path: resolved })
    }

    /// Lists regular files below `dir`, newest first. A missing directory yields an empty list.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversalAttempt`] if `dir` escapes the sandbox.
    pub async fn index(&self, dir: &RelativePath) -> Result<Vec<IndexEntry>, StorageError> {
        let resolved = self.resolve(dir.to_path_buf())?;
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || index::scan(&root, &resolved))
            .await
            .map_err(|err| StorageError::Io {
                source: std::io::Error::other(err),
                context: Some("Directory scan task failed".into()),
            })
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

/// Removes the temp file on drop unless it was moved into place.
#[derive(Debug)]
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    const fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    const fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {},
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
            Err(err) => warn!(path = %self.path.display(), error = %err, "Temp file cleanup failed"),
        }
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
}

fn is_tmp_path(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(maintenance::is_tmp_name)
}

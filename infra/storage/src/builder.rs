use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

/// Builder state until a root directory is chosen.
#[derive(Debug, Default)]
pub struct Unrooted;

/// Builder state holding the root directory.
#[derive(Debug)]
pub struct Rooted(PathBuf);

/// Opens a [`Storage`]. Only a rooted builder can [`connect`](StorageBuilder::connect).
#[derive(Debug)]
pub struct StorageBuilder<R = Unrooted> {
    root: R,
    public_prefix: String,
    create_root: bool,
}

impl Default for StorageBuilder {
    fn default() -> Self {
        Self { root: Unrooted, public_prefix: String::from("uploads"), create_root: true }
    }
}

impl StorageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory every stored file lives under.
    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<Rooted> {
        StorageBuilder {
            root: Rooted(path.into()),
            public_prefix: self.public_prefix,
            create_root: self.create_root,
        }
    }
}

impl<R> StorageBuilder<R> {
    /// First segment of public URLs. Surrounding slashes are ignored.
    #[must_use]
    pub fn public_prefix(mut self, prefix: impl AsRef<str>) -> Self {
        self.public_prefix = prefix.as_ref().trim_matches('/').to_owned();
        self
    }

    /// Create the root when it is missing (the default).
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create_root = enable;
        self
    }
}

impl StorageBuilder<Rooted> {
    /// Resolves the root and sweeps what an interrupted run left behind.
    ///
    /// The root is canonicalized once here; containment checks compare against that physical
    /// path. The temp-file sweep is best-effort and only logs its failures.
    ///
    /// # Errors
    /// [`StorageError::Io`] when the root is missing and creation is off, or when it cannot be
    /// created or resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let Rooted(root) = self.root;

        if self.create_root {
            fs::create_dir_all(&root)
                .await
                .context(format!("Failed to create storage root {}", root.display()))?;
        }
        let root = fs::canonicalize(&root)
            .await
            .context(format!("Storage root {} is not usable", root.display()))?;

        info!(root = %root.display(), prefix = %self.public_prefix, "Storage opened");

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root,
                public_prefix: self.public_prefix,
                tmp_counter: AtomicU64::new(1),
            }),
        };
        storage.purge_tmp().await;

        Ok(storage)
    }
}

//! A sandboxed file storage engine for user uploads.
//!
//! # Core Features
//!
//! - **Sandbox Security**: every path is validated segment by segment ([`RelativePath`]) and then
//!   proven to stay under the canonical root ([`contain`]), symlinks included.
//! - **Atomic Publishing**: unique temp write + `fsync`, then `rename` (replace) or `hard_link`
//!   (create-new). Temp files are removed on every failure path.
//! - **Streaming Reads**: [`Storage::open`] hands out a file handle plus its length.
//! - **Indexing**: [`Storage::index`] lists a directory tree newest-first on the blocking pool.
//! - **Self-Healing**: stale temp files and empty directories are swept on startup.
//!
//! # Examples
//!
//! ```rust
//! use depot_storage::{RelativePath, Storage, StorageError, WriteMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("public");
//!     let storage = Storage::builder().root(&root).create(true).connect().await?;
//!
//!     let path = RelativePath::builder()
//!         .segment("payment-qr")?
//!         .nested("fpx")?
//!         .segment("qr_code_1700000000000.png")?
//!         .build()?;
//!     let stored = storage.write(&path, b"png bytes", WriteMode::CreateNew).await?;
//!     assert_eq!(stored.public_url, "/uploads/payment-qr/fpx/qr_code_1700000000000.png");
//!
//!     let listing = storage.index(&RelativePath::parse("payment-qr")?).await?;
//!     assert_eq!(listing.len(), 1);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod index;
mod maintenance;
mod path;
mod security;

pub use builder::StorageBuilder;
pub use engine::{OpenedFile, Storage, StoredFile, WriteMode};
pub use error::{StorageError, StorageErrorExt};
pub use index::IndexEntry;
pub use path::{RelativePath, RelativePathBuilder, validate_segment};
pub use security::{contain, has_traversal_marker};

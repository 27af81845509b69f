//! Shared string constants.

/// `OpenAPI` tag for health and other system endpoints.
pub const SYSTEM_TAG: &str = "System";
/// `OpenAPI` tag for upload endpoints.
pub const UPLOADS_TAG: &str = "Uploads";
/// `OpenAPI` tag for retrieval and listing endpoints.
pub const FILES_TAG: &str = "Files";

/// Default public URL prefix under which stored files are reachable (`/uploads/...`).
pub const DEFAULT_PUBLIC_PREFIX: &str = "uploads";

/// Prefix used for generated names when a category does not define one.
pub const DEFAULT_NAME_PREFIX: &str = "file";

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

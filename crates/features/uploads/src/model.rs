use depot_derive::api_model;
use utoipa::{IntoParams, ToSchema};

#[api_model]
/// A stored upload
pub struct UploadResponse {
    /// Always `true`
    pub success: bool,
    /// Path relative to the storage root, e.g. `payment-qr/fpx/qr_code_1700000000000.png`
    pub file_path: String,
    /// Stored file name
    pub file_name: String,
    /// Public URL of the file, e.g. `/uploads/payment-qr/fpx/qr_code_1700000000000.png`
    pub url: String,
}

/// Multipart body of an upload. Which metadata fields are required depends on the category.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct UploadFormSchema {
    /// The file itself
    #[schema(format = Binary)]
    pub file: String,
    /// Explicit base name without extension; logos default to `logo`
    pub name: Option<String>,
    /// `purchases`
    pub user_id: Option<String>,
    /// `purchases`
    pub order_id: Option<String>,
    /// `recruitment`
    pub field_id: Option<String>,
    /// `payment-qr`
    pub payment_method: Option<String>,
    /// `project-images`
    pub project_id: Option<String>,
    /// `component-assets`
    pub component_id: Option<String>,
}

#[api_model(deny_unknown_fields = false)]
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
/// Stream-by-path query
pub struct FileQuery {
    /// Relative path, optionally starting with the public prefix (`uploads/logos/logo.png`).
    /// Percent-encoding is accepted.
    pub path: Option<String>,
}

#[api_model(deny_unknown_fields = false)]
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
/// Listing query
pub struct ListQuery {
    /// `<category>` or `<category>/<sub-category>`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[api_model]
/// One listed file
pub struct FileEntry {
    /// File name
    pub name: String,
    /// Path relative to the storage root
    pub path: String,
    /// Public URL
    pub url: String,
    /// Last modification, RFC 3339 with milliseconds
    pub mtime: String,
    /// Size in bytes
    pub size: u64,
}

#[api_model]
/// Files of a category, newest first
pub struct ListResponse {
    /// Always `true`
    pub success: bool,
    /// Listed files
    pub files: Vec<FileEntry>,
}

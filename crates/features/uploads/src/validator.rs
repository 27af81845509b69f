//! Policy checks for a candidate upload.
//!
//! Type checks run as soon as the multipart headers of the file part are known; the size check
//! runs on every received chunk.

use crate::error::UploadError;
use depot_domain::policy::CategoryPolicy;

/// Lowercased extension of `file_name`, without the dot.
///
/// Hidden-file names such as `.png` and names without a dot have no extension.
#[must_use]
pub fn extension_of(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

/// Checks the declared content type and the extension of the original file name.
///
/// Returns the normalized extension to store the file under.
///
/// # Errors
/// Returns [`UploadError::Validation`] naming the first rejected property.
pub fn check_type(
    policy: &CategoryPolicy,
    content_type: Option<&str>,
    file_name: &str,
) -> Result<String, UploadError> {
    let content_type = content_type.unwrap_or("application/octet-stream");
    if !policy.allows_mime(content_type) {
        return Err(UploadError::validation(format!(
            "File type {content_type} is not allowed; expected one of: {}",
            join(&policy.allowed_mime_types)
        )));
    }

    let Some(extension) = extension_of(file_name) else {
        return Err(UploadError::validation("File name has no extension"));
    };
    if !policy.allows_extension(&extension) {
        return Err(UploadError::validation(format!(
            "File extension .{extension} is not allowed; expected one of: {}",
            join(&policy.allowed_extensions)
        )));
    }

    Ok(extension)
}

/// Checks a (possibly partial) byte count against the ceiling.
///
/// # Errors
/// Returns [`UploadError::Validation`] once `size` exceeds `max_size_bytes`.
pub fn check_size(policy: &CategoryPolicy, size: u64) -> Result<(), UploadError> {
    if size > policy.max_size_bytes {
        return Err(UploadError::validation(format!(
            "File exceeds the maximum size of {} bytes",
            policy.max_size_bytes
        )));
    }
    Ok(())
}

/// Full check of a completely received upload.
///
/// # Errors
/// Returns [`UploadError::Validation`] for empty payloads and any policy violation.
pub fn validate(
    policy: &CategoryPolicy,
    size: u64,
    content_type: Option<&str>,
    file_name: &str,
) -> Result<String, UploadError> {
    if size == 0 {
        return Err(UploadError::validation("File is empty"));
    }
    check_size(policy, size)?;
    check_type(policy, content_type, file_name)
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

//! Bounded multipart reading.

use crate::error::UploadError;
use crate::layout::FILE_FIELD;
use crate::validator;
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use depot_domain::policy::CategoryPolicy;
use std::collections::BTreeMap;

/// Longest accepted text field value, in bytes.
const MAX_TEXT_FIELD: usize = 1024;

/// The received file part.
#[derive(Debug)]
pub struct FilePart {
    pub original_name: String,
    pub content_type: String,
    /// Lowercased, policy-approved extension.
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// A fully received upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: BTreeMap<String, String>,
    pub file: Option<FilePart>,
}

impl UploadForm {
    /// Trimmed, non-empty value of a text field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

/// Drains `multipart`, checking the file part against `policy` while it streams in.
///
/// The file's type is checked from its part headers before any byte is read; the size ceiling
/// is checked on every chunk, so an oversized upload is rejected after at most one chunk past
/// the limit.
///
/// # Errors
/// Returns [`UploadError::Validation`] for malformed bodies, policy violations, duplicate file
/// parts, and oversized text fields.
pub async fn read_form(
    mut multipart: Multipart,
    policy: &CategoryPolicy,
) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == FILE_FIELD {
            if form.file.is_some() {
                return Err(UploadError::validation("Only one file may be uploaded per request"));
            }
            form.file = Some(read_file(field, policy).await?);
        } else {
            let value = read_text(field).await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

async fn read_file(mut field: Field<'_>, policy: &CategoryPolicy) -> Result<FilePart, UploadError> {
    let original_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field.content_type().unwrap_or("application/octet-stream").to_owned();
    let extension = validator::check_type(policy, Some(&content_type), &original_name)?;

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        validator::check_size(policy, (bytes.len() + chunk.len()) as u64)?;
        bytes.extend_from_slice(&chunk);
    }

    validator::validate(policy, bytes.len() as u64, Some(&content_type), &original_name)?;
    Ok(FilePart { original_name, content_type, extension, bytes })
}

async fn read_text(mut field: Field<'_>) -> Result<String, UploadError> {
    let mut raw = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        if raw.len() + chunk.len() > MAX_TEXT_FIELD {
            return Err(UploadError::validation(format!(
                "Form field {} is too long",
                field.name().unwrap_or_default()
            )));
        }
        raw.extend_from_slice(&chunk);
    }
    String::from_utf8(raw).map_err(|_| UploadError::validation("Form fields must be UTF-8"))
}

fn malformed(err: MultipartError) -> UploadError {
    UploadError::Validation {
        message: format!("Malformed multipart body: {}", err.body_text()).into(),
        context: None,
    }
}

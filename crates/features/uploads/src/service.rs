//! Upload flow: form -> path -> name -> write.

use crate::error::UploadError;
use crate::form::{FilePart, UploadForm};
use crate::layout::{Layout, NAME_FIELD};
use crate::naming::{self, NameGenerator};
use depot_domain::category::Category;
use depot_domain::policy::CategoryPolicy;
use depot_kernel::safe_nanoid;
use depot_storage::{
    RelativePath, RelativePathBuilder, Storage, StorageError, StoredFile, WriteMode,
};
use tracing::{info, warn};

/// Outcome of a stored upload.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub file: StoredFile,
    pub file_name: String,
    pub mime_type: String,
}

/// Directory of a category plus the sub-category taken from the form fields.
///
/// # Errors
/// Returns [`UploadError::Validation`] for a missing field and [`UploadError::Path`] for a
/// rejected segment.
pub fn target_dir(
    category: Category,
    form: &UploadForm,
) -> Result<RelativePathBuilder, UploadError> {
    let layout = Layout::of(category);
    let mut builder = RelativePath::builder().segment(category.as_str())?;

    for field in layout.sub_category_fields {
        let value = form
            .field(field)
            .ok_or_else(|| UploadError::validation(format!("Missing form field {field}")))?;
        builder = builder.nested(value)?;
    }

    Ok(builder)
}

/// Stores a received form under its category.
///
/// Generated names are published create-new; if another process already took the name the
/// write is retried once with a random suffix. Explicit names replace existing files only when
/// the category policy allows overwrites.
///
/// # Errors
/// - [`UploadError::Validation`] when the file part or a required field is missing.
/// - [`UploadError::Path`] when a sub-category segment is rejected.
/// - [`UploadError::Conflict`] when an explicit name exists and overwrites are off.
/// - [`UploadError::Storage`] on filesystem failures.
pub async fn store_upload(
    storage: &Storage,
    category: Category,
    policy: &CategoryPolicy,
    form: UploadForm,
) -> Result<StoredUpload, UploadError> {
    let dir = target_dir(category, &form)?;
    let layout = Layout::of(category);
    let explicit_base = form.field(NAME_FIELD).map(str::to_owned);

    let Some(FilePart { content_type, extension, bytes, original_name }) = form.file else {
        return Err(UploadError::validation("No file was uploaded"));
    };

    let base = explicit_base.as_deref().or(layout.fixed_name);
    let (file_name, mode) = match base {
        Some(base) => {
            let name = naming::explicit_name(base, &extension)
                .ok_or_else(|| UploadError::validation("File name is empty after sanitizing"))?;
            let mode =
                if policy.overwrite_allowed { WriteMode::Replace } else { WriteMode::CreateNew };
            (name, mode)
        },
        None => {
            let name = NameGenerator::global().generate(Some(layout.prefix), &extension);
            (name, WriteMode::CreateNew)
        },
    };

    let path = dir.segment(&file_name)?.build()?;
    let stored = match storage.write(&path, &bytes, mode).await {
        Err(StorageError::AlreadyExists { .. }) if base.is_none() => {
            let retry_name = naming::with_suffix(&file_name, &safe_nanoid!(6));
            warn!(
                category = %category,
                name = %file_name,
                retry = %retry_name,
                "Generated name taken; retrying"
            );
            let retry_path = path_with_name(&path, &retry_name)?;
            storage.write(&retry_path, &bytes, WriteMode::CreateNew).await?
        },
        other => other?,
    };

    if stored.replaced {
        warn!(
            category = %category,
            path = %stored.relative_path,
            size = stored.size_bytes,
            "Existing file overwritten"
        );
    }
    info!(
        category = %category,
        path = %stored.relative_path,
        size = stored.size_bytes,
        mime = %content_type,
        original = %original_name,
        "Upload stored"
    );

    Ok(StoredUpload {
        file_name: stored.relative_path.file_name().to_owned(),
        file: stored,
        mime_type: content_type,
    })
}

fn path_with_name(path: &RelativePath, name: &str) -> Result<RelativePath, UploadError> {
    let mut segments: Vec<&str> = path.segments().collect();
    segments.pop();
    segments.push(name);
    Ok(RelativePath::from_segments(segments)?)
}

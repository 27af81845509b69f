use crate::error::UploadError;
use crate::form;
use crate::gateway::{self, Accept};
use crate::model::{
    FileEntry, FileQuery, ListQuery, ListResponse, UploadFormSchema, UploadResponse,
};
use crate::service;
use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;
use chrono::SecondsFormat;
use depot_derive::api_handler;
use depot_domain::category::Category;
use depot_domain::constants::{FILES_TAG, UPLOADS_TAG};
use depot_kernel::security::admin::AdminCaller;
use depot_kernel::server::{ApiState, ErrorResponse};
use depot_storage::RelativePath;
use std::str::FromStr;

fn parse_category(raw: &str) -> Result<Category, UploadError> {
    Category::from_str(raw.trim())
        .map_err(|_| UploadError::validation(format!("Unknown upload category {raw:?}")))
}

#[api_handler(
    post,
    path = "/api/uploads/{category}",
    params(("category" = String, Path, description = "Feature area, e.g. `payment-qr`")),
    request_body(content = UploadFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "File stored", body = UploadResponse),
        (status = BAD_REQUEST, description = "Policy violation or invalid path segment", body = ErrorResponse),
        (status = CONFLICT, description = "Name taken and overwrites are off", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Storage failure", body = ErrorResponse),
    ),
    tag = UPLOADS_TAG,
)]
pub async fn upload_handler(
    State(state): State<ApiState>,
    Path(category): Path<String>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let category = parse_category(&category)?;
    let policy = state.config.policies.get(category);

    let form = form::read_form(multipart, policy).await?;
    let stored = service::store_upload(&state.storage, category, policy, form).await?;

    Ok(Json(UploadResponse {
        success: true,
        file_path: stored.file.relative_path.to_string(),
        file_name: stored.file_name,
        url: stored.file.public_url,
    }))
}

#[api_handler(
    get,
    path = "/api/files",
    params(FileQuery),
    responses(
        (status = OK, description = "File contents"),
        (status = BAD_REQUEST, description = "Missing path", body = ErrorResponse),
        (status = FORBIDDEN, description = "Path escapes the storage root", body = ErrorResponse),
        (status = NOT_FOUND, description = "No such file", body = ErrorResponse),
    ),
    tag = FILES_TAG,
)]
pub async fn file_handler(
    State(state): State<ApiState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, UploadError> {
    serve(&state, query.path.as_deref(), Accept::Any).await
}

#[api_handler(
    get,
    path = "/api/files/image",
    params(FileQuery),
    responses(
        (status = OK, description = "Image contents"),
        (status = BAD_REQUEST, description = "Missing path or not an image", body = ErrorResponse),
        (status = FORBIDDEN, description = "Path escapes the storage root", body = ErrorResponse),
        (status = NOT_FOUND, description = "No such file", body = ErrorResponse),
    ),
    tag = FILES_TAG,
)]
pub async fn image_handler(
    State(state): State<ApiState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, UploadError> {
    serve(&state, query.path.as_deref(), Accept::ImagesOnly).await
}

/// `/<public_prefix>/{*path}`: the public URL of a stored file.
pub async fn public_file_handler(
    State(state): State<ApiState>,
    Path(path): Path<String>,
) -> Result<Response, UploadError> {
    let prefixed = format!("{}/{path}", state.storage.public_prefix());
    serve(&state, Some(&prefixed), Accept::Any).await
}

async fn serve(
    state: &ApiState,
    raw: Option<&str>,
    accept: Accept,
) -> Result<Response, UploadError> {
    let raw = raw.ok_or_else(|| UploadError::validation("Missing path"))?;
    let relative = gateway::normalize_request_path(raw, state.storage.public_prefix())?;
    gateway::stream_file(&state.storage, &relative, accept).await
}

#[api_handler(
    get,
    path = "/api/files/list",
    params(ListQuery),
    responses(
        (status = OK, description = "Files, newest first", body = ListResponse),
        (status = BAD_REQUEST, description = "Missing or unknown type", body = ErrorResponse),
        (status = FORBIDDEN, description = "Caller is not an admin", body = ErrorResponse),
    ),
    tag = FILES_TAG,
)]
pub async fn list_handler(
    _admin: AdminCaller,
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, UploadError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| UploadError::validation("Missing type"))?;

    let (category, sub) = match kind.split_once('/') {
        Some((category, sub)) => (category, Some(sub)),
        None => (kind, None),
    };
    let category = parse_category(category)?;

    let mut dir = RelativePath::builder().segment(category.as_str())?;
    if let Some(sub) = sub {
        dir = dir.nested(sub)?;
    }
    let dir = dir.build()?;

    let files = state
        .storage
        .index(&dir)
        .await?
        .into_iter()
        .map(|entry| FileEntry {
            url: state.storage.public_url(&entry.relative_path),
            mtime: entry.modified.to_rfc3339_opts(SecondsFormat::Millis, true),
            size: entry.size_bytes,
            name: entry.name,
            path: entry.relative_path,
        })
        .collect();

    Ok(Json(ListResponse { success: true, files }))
}

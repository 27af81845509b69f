//! Retrieval gateway: caller-supplied path in, file stream out.

use crate::error::UploadError;
use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use depot_storage::{Storage, has_traversal_marker};
use std::borrow::Cow;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Turns a caller-supplied path into one relative to the storage root.
///
/// The value gets one percent-decoding pass on top of the query decoding, is screened for
/// traversal markers, and loses its optional `<public_prefix>/` lead.
///
/// # Errors
/// - [`UploadError::Validation`] for an empty or undecodable path.
/// - [`UploadError::Forbidden`] for traversal markers; the message never echoes the input.
pub fn normalize_request_path(raw: &str, public_prefix: &str) -> Result<String, UploadError> {
    let decoded = urlencoding::decode(raw)
        .map_err(|_| UploadError::validation("Path is not valid UTF-8 after decoding"))?;
    let decoded = decoded.trim();
    if decoded.is_empty() {
        return Err(UploadError::validation("Missing path"));
    }

    // Public URLs (`/uploads/...`) are accepted as-is.
    let with_prefix = format!("/{public_prefix}/");
    let candidate = if !public_prefix.is_empty() && decoded.starts_with(&with_prefix) {
        &decoded[1..]
    } else {
        decoded
    };

    if has_traversal_marker(candidate) {
        warn!("Rejected retrieval path with traversal markers");
        return Err(UploadError::Forbidden {
            message: Cow::Borrowed("traversal marker in request path"),
            context: None,
        });
    }

    let relative = candidate
        .strip_prefix(public_prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|_| !public_prefix.is_empty())
        .unwrap_or(candidate);

    if relative.is_empty() {
        return Err(UploadError::validation("Missing path"));
    }
    Ok(relative.to_owned())
}

const SVG_MIME: &str = "image/svg+xml";

/// Which content types a retrieval accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Any,
    ImagesOnly,
}

/// Streams the file at `relative` with `Content-Type`, `Content-Length`, and `nosniff`.
///
/// SVG files additionally get `Content-Security-Policy: sandbox` and are sent as attachments.
///
/// # Errors
/// - [`UploadError::Forbidden`] if the path escapes the root (symlinks included).
/// - [`UploadError::NotFound`] if nothing regular exists there.
/// - [`UploadError::Validation`] if `accept` is [`Accept::ImagesOnly`] and the file is not an image.
pub async fn stream_file(
    storage: &Storage,
    relative: &str,
    accept: Accept,
) -> Result<Response, UploadError> {
    let mime = mime_guess::from_path(relative).first_or_octet_stream();
    if accept == Accept::ImagesOnly && mime.type_() != mime_guess::mime::IMAGE {
        // Existence first, so a missing non-image is still a 404.
        storage.open(relative).await?;
        return Err(UploadError::validation("Requested file is not an image"));
    }

    let opened = storage.open(relative).await?;
    debug!(path = %relative, size = opened.len, mime = %mime, "Streaming file");

    let content_type = HeaderValue::from_str(mime.essence_str())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    let mut response = (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, HeaderValue::from(opened.len)),
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        ],
        Body::from_stream(ReaderStream::new(opened.file)),
    )
        .into_response();

    // SVG can carry script; never let it run with the site's origin.
    if mime.essence_str() == SVG_MIME {
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static("sandbox"));
        headers.insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));
    }
    Ok(response)
}

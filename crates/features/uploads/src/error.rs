use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use depot_kernel::server::ApiError;
use depot_storage::StorageError;
use std::borrow::Cow;
use tracing::{debug, error};

/// A specialized [`UploadError`] enum of this crate.
///
/// Every variant maps to one HTTP status; the client only ever sees [`UploadError::client_message`].
#[depot_derive::depot_error]
pub enum UploadError {
    /// The upload breaks its category policy, or the request is malformed.
    #[status(400)]
    #[error("Validation failed{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A caller-supplied path segment was rejected.
    #[status(400)]
    #[error("Invalid path{}: {message}", format_context(.context))]
    Path { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The request tried to reach outside the storage root.
    #[status(403)]
    #[error("Access denied{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(404)]
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The target name is taken and may not be overwritten.
    #[status(409)]
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {cause}", format_context(.context))]
    Storage { cause: StorageError, context: Option<Cow<'static, str>> },
}

impl UploadError {
    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    /// Text safe to return to the caller: no physical paths, no I/O details.
    #[must_use]
    pub fn client_message(&self) -> Cow<'static, str> {
        match self {
            Self::Validation { message, .. } | Self::Path { message, .. } => message.clone(),
            Self::Forbidden { .. } => Cow::Borrowed("Access denied"),
            Self::NotFound { .. } => Cow::Borrowed("File not found"),
            Self::Conflict { message, .. } => message.clone(),
            Self::Storage { .. } => Cow::Borrowed("Internal storage error"),
        }
    }
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PathTraversalAttempt { message, context } => {
                Self::Forbidden { message, context }
            },
            StorageError::InvalidSegment { message, context } => {
                let message = match context {
                    Some(reason) => format!("{reason}: {message}").into(),
                    None => message,
                };
                Self::Path { message, context: None }
            },
            StorageError::FileNotFound { message, context } => Self::NotFound { message, context },
            StorageError::AlreadyExists { message, context } => Self::Conflict {
                message: format!("A file named {message} already exists").into(),
                context,
            },
            cause @ StorageError::Io { .. } => Self::Storage { cause, context: None },
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self, "Upload request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "Upload request rejected");
        }

        ApiError::new(status, self.client_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_http_statuses() {
        let cases = [
            (StorageError::PathTraversalAttempt { message: "/etc".into(), context: None }, 403),
            (StorageError::InvalidSegment { message: "\"..\"".into(), context: None }, 400),
            (StorageError::FileNotFound { message: "a.png".into(), context: None }, 404),
            (StorageError::AlreadyExists { message: "a.png".into(), context: None }, 409),
            (StorageError::Io { source: std::io::Error::other("disk"), context: None }, 500),
        ];
        for (storage, status) in cases {
            assert_eq!(UploadError::from(storage).status_code(), status);
        }
    }

    #[test]
    fn client_messages_do_not_leak_paths() {
        let forbidden: UploadError =
            StorageError::PathTraversalAttempt { message: "/srv/secret".into(), context: None }
                .into();
        assert_eq!(forbidden.client_message(), "Access denied");

        let io: UploadError = StorageError::Io {
            source: std::io::Error::other("EIO at /srv/public/logos"),
            context: None,
        }
        .into();
        assert!(!io.client_message().contains("/srv"));
    }
}

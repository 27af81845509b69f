use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[depot_derive::depot_error]
pub enum StorageError {
    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid path segment{}: {message}", format_context(.context))]
    InvalidSegment { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("File already exists{}: {message}", format_context(.context))]
    AlreadyExists { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

impl StorageError {
    pub(crate) fn invalid_segment(segment: &str, reason: &'static str) -> Self {
        Self::InvalidSegment { message: format!("{segment:?}").into(), context: Some(reason.into()) }
    }
}

//! Validated, normalized relative paths.
//!
//! A [`RelativePath`] can only be built from segments that passed [`validate_segment`], so it
//! never contains `.`/`..`, separators inside a segment, null bytes, or drive/absolute markers.

use crate::error::StorageError;
use std::fmt;
use std::path::PathBuf;

/// A `/`-joined path relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(String);

impl RelativePath {
    #[must_use = "Start a path with the first segment"]
    pub fn builder() -> RelativePathBuilder {
        RelativePathBuilder::default()
    }

    /// Builds a path from already separated segments.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidSegment`] for the first rejected segment, or when no
    /// segment is given.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        segments.into_iter().try_fold(Self::builder(), |b, s| b.segment(s.as_ref()))?.build()
    }

    /// Parses a `/`-separated path such as `payment-qr/fpx/qr_code_1.png`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidSegment`] when any segment is rejected.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        Self::builder().nested(raw)?.build()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Platform path, relative to the storage root.
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        self.segments().collect()
    }

    /// Appends one more validated segment.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidSegment`] when `segment` is rejected.
    pub fn join(&self, segment: &str) -> Result<Self, StorageError> {
        let segment = validate_segment(segment)?;
        Ok(Self(format!("{}/{segment}", self.0)))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Accumulates validated segments in order.
#[derive(Debug, Default)]
pub struct RelativePathBuilder {
    segments: Vec<String>,
}

impl RelativePathBuilder {
    /// Adds a single segment.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidSegment`] when `segment` is rejected.
    pub fn segment(mut self, segment: &str) -> Result<Self, StorageError> {
        self.segments.push(validate_segment(segment)?.to_owned());
        Ok(self)
    }

    /// Adds a caller-supplied `a/b/c` value, split on `/` before validation.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidSegment`] when any part is rejected, including empty parts
    /// produced by `a//b` or a trailing slash.
    pub fn nested(self, value: &str) -> Result<Self, StorageError> {
        value.split('/').try_fold(self, Self::segment)
    }

    /// # Errors
    /// Returns [`StorageError::InvalidSegment`] when no segment was added.
    pub fn build(self) -> Result<RelativePath, StorageError> {
        if self.segments.is_empty() {
            return Err(StorageError::invalid_segment("", "Path has no segments"));
        }
        Ok(RelativePath(self.segments.join("/")))
    }
}

/// Trims and checks one path segment.
///
/// # Errors
/// Returns [`StorageError::InvalidSegment`] for empty segments, `.`/`..`, and segments holding a
/// separator, a null byte, a control character, or a drive marker (`:`).
pub fn validate_segment(segment: &str) -> Result<&str, StorageError> {
    let trimmed = segment.trim();
    let reason = if trimmed.is_empty() {
        "Segment is empty"
    } else if trimmed == "." || trimmed == ".." {
        "Relative markers are not allowed"
    } else if trimmed.contains(['/', '\\']) {
        "Separators are not allowed inside a segment"
    } else if trimmed.contains(':') {
        "Drive markers are not allowed"
    } else if trimmed.chars().any(char::is_control) {
        "Control characters are not allowed"
    } else {
        return Ok(trimmed);
    };
    Err(StorageError::invalid_segment(segment, reason))
}

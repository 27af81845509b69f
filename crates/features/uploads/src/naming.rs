//! Storage file names.
//!
//! Generated names are `<prefix>_<ms>[_<n>].<ext>`. The millisecond stamp never goes backwards
//! within a process and `n` counts names issued in the same stamp, so two calls never return the
//! same name even when the wall clock steps back.

use chrono::Utc;
use depot_domain::constants::DEFAULT_NAME_PREFIX;
use parking_lot::Mutex;
use std::sync::LazyLock;

static GENERATOR: LazyLock<NameGenerator> = LazyLock::new(NameGenerator::default);

/// Issues unique `<stamp>[_<n>]` tokens.
#[derive(Debug, Default)]
pub struct NameGenerator {
    /// Last issued `(millisecond, sequence)`.
    last: Mutex<(i64, u32)>,
}

impl NameGenerator {
    /// The process-wide generator.
    pub fn global() -> &'static Self {
        &GENERATOR
    }

    /// `<prefix>_<ms>[_<n>].<extension>` using the current time.
    pub fn generate(&self, prefix: Option<&str>, extension: &str) -> String {
        self.generate_at(Utc::now().timestamp_millis(), prefix, extension)
    }

    pub(crate) fn generate_at(&self, now_ms: i64, prefix: Option<&str>, extension: &str) -> String {
        let (stamp, seq) = self.next(now_ms);
        let prefix = prefix.and_then(sanitize).unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_owned());
        if seq == 0 {
            format!("{prefix}_{stamp}.{extension}")
        } else {
            format!("{prefix}_{stamp}_{seq}.{extension}")
        }
    }

    fn next(&self, now_ms: i64) -> (i64, u32) {
        let mut last = self.last.lock();
        *last = if now_ms > last.0 { (now_ms, 0) } else { (last.0, last.1 + 1) };
        *last
    }
}

/// `<base>.<extension>` for caller-chosen names.
///
/// Returns `None` when nothing usable is left after sanitizing.
#[must_use]
pub fn explicit_name(base: &str, extension: &str) -> Option<String> {
    sanitize(base).map(|base| format!("{base}.{extension}"))
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_` and trims the result.
#[must_use]
pub fn sanitize(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('_');
    (!cleaned.is_empty()).then(|| cleaned.chars().take(100).collect())
}

/// Inserts `_<suffix>` before the extension: `qr_code_1.png` -> `qr_code_1_Ab3x.png`.
#[must_use]
pub fn with_suffix(file_name: &str, suffix: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{file_name}_{suffix}"),
    }
}

use crate::maintenance::is_tmp_name;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// One regular file found under an indexed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    /// `/`-joined, relative to the storage root.
    pub relative_path: String,
    pub modified: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Recursively lists regular files below `dir`, newest first.
///
/// Symlinks are not followed. Unreadable entries are skipped.
pub(crate) fn scan(root: &Path, dir: &Path) -> Vec<IndexEntry> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut entries: Vec<IndexEntry> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| {
            entry.map_err(|err| debug!(error = %err, "Skipping unreadable entry")).ok()
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_owned();
            if is_tmp_name(&name) {
                return None;
            }
            let metadata = entry
                .metadata()
                .map_err(|err| debug!(error = %err, "Skipping entry without metadata"))
                .ok()?;
            let modified = metadata.modified().ok()?;
            let relative = entry.path().strip_prefix(root).ok()?;
            let relative_path = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect::<Option<Vec<_>>>()?
                .join("/");

            Some(IndexEntry {
                name,
                relative_path,
                modified: DateTime::<Utc>::from(modified),
                size_bytes: metadata.len(),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        Reverse(a.modified)
            .cmp(&Reverse(b.modified))
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(path: &Path, age_secs: u64) {
        fs::create_dir_all(path.parent().expect("parent")).expect("dirs");
        fs::write(path, b"data").expect("write");
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options().write(true).open(path).expect("open").set_modified(mtime).expect("mtime");
    }

    #[test]
    fn lists_newest_first_and_skips_temp_files() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path();
        touch(&root.join("purchases/u1/o1/receipt_1.png"), 300);
        touch(&root.join("purchases/u1/o2/receipt_2.pdf"), 10);
        touch(&root.join("purchases/u2/o3/receipt_3.jpg"), 100);
        touch(&root.join("purchases/u2/o3/receipt_4.jpg.depottmp.3"), 1);

        let entries = scan(root, &root.join("purchases"));
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["receipt_2.pdf", "receipt_3.jpg", "receipt_1.png"]);
        assert_eq!(entries[0].relative_path, "purchases/u1/o2/receipt_2.pdf");
        assert_eq!(entries[0].size_bytes, 4);
    }

    #[test]
    fn equal_mtimes_are_ordered_by_path() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path();
        let mtime = SystemTime::now() - Duration::from_secs(60);
        for name in ["b.png", "a.png"] {
            let path = root.join("logos").join(name);
            touch(&path, 0);
            File::options().write(true).open(&path).expect("open").set_modified(mtime).expect("mtime");
        }

        let entries = scan(root, &root.join("logos"));
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let temp = TempDir::new().expect("tempdir");
        assert!(scan(temp.path(), &temp.path().join("recruitment")).is_empty());
    }
}

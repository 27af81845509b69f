use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Marker embedded in every temp file name: `<target>.depottmp.<n>`.
pub(crate) const TMP_MARKER: &str = ".depottmp.";

/// Temp files younger than this may still belong to an in-flight write.
const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) fn is_tmp_name(name: &str) -> bool {
    name.contains(TMP_MARKER)
}

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok(Sweep { removed, failed, pruned_dirs })
            if removed > 0 || failed > 0 || pruned_dirs > 0 =>
        {
            info!(removed, failed, pruned_dirs, "Cleaned up storage root");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

#[derive(Debug, Default)]
struct Sweep {
    removed: usize,
    failed: usize,
    pruned_dirs: usize,
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> Sweep {
    let mut sweep = Sweep::default();

    // Children are visited before their directory, so emptied directories can be pruned.
    for entry in WalkDir::new(root).contents_first(true).into_iter().flatten() {
        let path = entry.path();
        if path == root {
            continue;
        }

        if entry.file_type().is_file() {
            if is_tmp(&entry) && is_stale(&entry, now, threshold) {
                match std::fs::remove_file(path) {
                    Ok(()) => sweep.removed += 1,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to remove temp file");
                        sweep.failed += 1;
                    },
                }
            }
        } else if entry.file_type().is_dir() && std::fs::remove_dir(path).is_ok() {
            sweep.pruned_dirs += 1;
        }
    }

    sweep
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(is_tmp_name)
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}

//! Atomic file write helpers.
//!
//! Uses a temp file + rename pattern. On Windows, rename-over-existing fails, so we
//! move the old file aside to `.bak` and restore it if the second rename fails.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSyncPolicy {
    /// `sync_all` the temp file before the rename and best-effort sync the parent directory after.
    #[default]
    SyncAll,
    SkipSync,
}

/// Restore `path` from `path.bak` when a previous write died between the two renames.
pub fn recover_bak_file(path: &Path) {
    let backup = path.with_extension("bak");
    if path.exists() || !backup.exists() {
        return;
    }
    match fs::rename(&backup, path) {
        Ok(()) => warn!(path = %path.display(), "Recovered .bak file from interrupted write"),
        Err(e) => warn!(path = %path.display(), "Failed to recover .bak file: {e}"),
    }
}

/// Replace the contents of `path` with `bytes` so readers see either the old
/// or the new document, never a prefix.
///
/// Missing parent directories are created.
pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8], sync: FileSyncPolicy) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    if sync == FileSyncPolicy::SyncAll {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }
        let backup = path.with_extension("bak");
        let _ = fs::remove_file(&backup);
        fs::rename(path, &backup)?;
        if let Err(retry) = err.file.persist(path) {
            let _ = fs::rename(&backup, path);
            return Err(retry.error);
        }
        if let Err(e) = fs::remove_file(&backup) {
            warn!(path = %backup.display(), "Failed to remove .bak after atomic write: {e}");
        }
    }

    if sync == FileSyncPolicy::SyncAll {
        sync_parent_dir(parent);
    }
    Ok(())
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) {
    if let Err(e) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        tracing::debug!(path = %parent.display(), "Parent directory sync_all failed (best-effort): {e}");
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_parent: &Path) {}

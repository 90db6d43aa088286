//! Per-file backup sidecars
//!
//! One backup per source file, at `<path>.backup`, holding an exact byte
//! copy of the pre-mutation content. The snapshot is durably persisted
//! before the caller is allowed to overwrite the original; that ordering
//! is the whole correctness story behind rollback.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::Result;

/// Suffix appended to a source path to form its backup path.
pub const BACKUP_SUFFIX: &str = ".backup";

/// The sidecar path for a source file.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(BACKUP_SUFFIX);
    PathBuf::from(os)
}

/// Whether a lingering backup exists for this file.
pub fn has_backup(path: &Path) -> bool {
    backup_path(path).is_file()
}

/// Snapshot the file's current content to its sidecar.
///
/// Idempotent: a second snapshot before a restore overwrites the first,
/// so the last snapshot wins. The backup is fsynced before returning.
pub fn snapshot(path: &Path) -> Result<PathBuf> {
    let content = fs::read(path)?;
    let backup = backup_path(path);

    let mut file = File::create(&backup)?;
    file.write_all(&content)?;
    file.sync_all()?;

    tracing::debug!(path = %path.display(), backup = %backup.display(), "snapshot written");
    Ok(backup)
}

/// Restore the file from its sidecar, consuming the backup.
///
/// Returns `true` if a backup existed and was applied, `false` otherwise;
/// a missing backup is never an error.
pub fn restore(path: &Path) -> Result<bool> {
    let backup = backup_path(path);
    if !backup.is_file() {
        return Ok(false);
    }
    fs::rename(&backup, path)?;
    tracing::debug!(path = %path.display(), "restored from backup");
    Ok(true)
}

/// Remove a lingering backup without restoring it.
pub fn discard(path: &Path) -> Result<()> {
    let backup = backup_path(path);
    if backup.is_file() {
        fs::remove_file(&backup)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn snapshot_then_restore_round_trips() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("User.php");
        fs::write(&file, "original").unwrap();

        snapshot(&file).unwrap();
        fs::write(&file, "mutated").unwrap();

        assert!(restore(&file).unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "original");
        // Restore consumes the backup
        assert!(!has_backup(&file));
    }

    #[test]
    fn restore_without_backup_is_false_not_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("User.php");
        fs::write(&file, "content").unwrap();

        assert!(!restore(&file).unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "content");
    }

    #[test]
    fn second_snapshot_wins() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("User.php");

        fs::write(&file, "first").unwrap();
        snapshot(&file).unwrap();
        fs::write(&file, "second").unwrap();
        snapshot(&file).unwrap();
        fs::write(&file, "third").unwrap();

        assert!(restore(&file).unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "second");
    }

    #[test]
    fn discard_removes_lingering_backup() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("User.php");
        fs::write(&file, "content").unwrap();

        snapshot(&file).unwrap();
        assert!(has_backup(&file));

        discard(&file).unwrap();
        assert!(!has_backup(&file));
        // Discarding again is a no-op
        discard(&file).unwrap();
    }
}

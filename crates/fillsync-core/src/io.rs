//! Atomic file writes
//!
//! Write-to-temp-then-rename with an advisory lock on the temp file, so a
//! crash mid-write never leaves a half-written model behind.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::Result;

/// Write content atomically to a file.
///
/// The temp file is created in the target's directory so the final rename
/// stays on one filesystem.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;

    temp_file.lock_exclusive()?;
    temp_file.write_all(content)?;
    temp_file.sync_all()?;
    temp_file.unlock()?;

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn writes_content_and_cleans_temp() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("User.php");

        write_atomic(&target, b"<?php class User {}").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "<?php class User {}");

        // No temp files left behind
        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn overwrites_existing_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("User.php");
        fs::write(&target, "old").unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }
}

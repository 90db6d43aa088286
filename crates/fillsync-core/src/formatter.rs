//! External formatter invocation
//!
//! The formatter is a black-box collaborator invoked as
//! `<formatter-binary> <file-path>`: exit 0 means success, anything else is
//! a failure whose stderr is surfaced to the caller so the orchestrator can
//! roll the file back.

use std::path::Path;
use std::process::Command;

use crate::{Error, Result};

/// Run the configured formatter over one file.
///
/// `command` may carry leading arguments (`"php vendor/bin/pint"`); the
/// file path is appended last. A formatter that cannot be launched at all
/// is reported the same way as one that exited non-zero.
pub fn run_formatter(command: &str, file: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Ok(());
    };

    let output = Command::new(program)
        .args(parts)
        .arg(file)
        .output()
        .map_err(|e| Error::FormatterFailure {
            status: -1,
            stderr: format!("failed to launch {program}: {e}"),
        })?;

    if output.status.success() {
        tracing::debug!(file = %file.display(), "formatter succeeded");
        Ok(())
    } else {
        Err(Error::FormatterFailure {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_a_formatter_failure() {
        let err = run_formatter("definitely-not-a-real-formatter-binary", Path::new("x.php"))
            .unwrap_err();
        match err {
            Error::FormatterFailure { status, stderr } => {
                assert_eq!(status, -1);
                assert!(stderr.contains("failed to launch"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_command_is_a_no_op() {
        assert!(run_formatter("", Path::new("x.php")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_succeeds_nonzero_fails() {
        assert!(run_formatter("true", Path::new("x.php")).is_ok());
        assert!(run_formatter("false", Path::new("x.php")).is_err());
    }
}

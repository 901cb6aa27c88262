//! Running the extraction tool.

use std::io::Write;
use std::process::Command;

use crate::command::KernelDocCommand;

/// Extraction failure. Neither variant stops the build.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The tool exited unsuccessfully.
    #[error("kernel-doc '{command}' failed with return code {code}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
    /// The tool could not be run or its output could not be used.
    #[error("kernel-doc '{command}' processing failed with: {reason}")]
    Processing { command: String, reason: String },
}

impl ExtractError {
    pub(crate) fn processing(command: &KernelDocCommand, reason: impl ToString) -> Self {
        Self::Processing {
            command: command.joined(),
            reason: reason.to_string(),
        }
    }
}

/// Run the tool and return its standard output.
///
/// Standard error is echoed to this process's standard error when the tool
/// fails, or on success when `verbosity` is positive.
pub fn run(command: &KernelDocCommand, verbosity: i64) -> Result<String, ExtractError> {
    run_echoing(command, verbosity, &mut std::io::stderr().lock())
}

/// [`run`] with the tool's standard error echoed to `echo`.
pub(crate) fn run_echoing<W: Write>(
    command: &KernelDocCommand,
    verbosity: i64,
    echo: &mut W,
) -> Result<String, ExtractError> {
    let Some((program, args)) = command.args.split_first() else {
        return Err(ExtractError::processing(command, "empty command line"));
    };

    tracing::debug!("calling kernel-doc '{}'", command.joined());

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| ExtractError::processing(command, e))?;

    let stdout =
        String::from_utf8(output.stdout).map_err(|e| ExtractError::processing(command, e))?;
    let stderr =
        String::from_utf8(output.stderr).map_err(|e| ExtractError::processing(command, e))?;

    if !output.status.success() {
        echo_stderr(echo, &stderr);
        return Err(ExtractError::Failed {
            command: command.joined(),
            code: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    if verbosity > 0 {
        echo_stderr(echo, &stderr);
    }
    Ok(stdout)
}

fn echo_stderr<W: Write>(echo: &mut W, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Err(e) = echo.write_all(text.as_bytes()).and_then(|()| echo.flush()) {
        tracing::debug!(error = %e, "Failed to echo kernel-doc stderr");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn script(dir: &Path, body: &str) -> String {
        let path = dir.join("kernel-doc");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn command(bin: String, rest: &[&str]) -> KernelDocCommand {
        let mut args = vec![bin];
        args.extend(rest.iter().map(|a| (*a).to_owned()));
        KernelDocCommand {
            args,
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn test_success_returns_stdout() {
        let dir = TempDir::new().unwrap();
        let bin = script(dir.path(), "echo \".. LINENO 3\"; echo \"$3\"");
        let output = run(&command(bin, &["-rst", "-enable-lineno", "target.c"]), 0).unwrap();
        assert_eq!(output, ".. LINENO 3\ntarget.c\n");
    }

    #[test]
    fn test_nonzero_exit() {
        let dir = TempDir::new().unwrap();
        let bin = script(dir.path(), "echo oops >&2; exit 3");
        let cmd = command(bin.clone(), &["file.c"]);

        let err = run(&cmd, 1).unwrap_err();
        assert_eq!(
            err,
            ExtractError::Failed {
                command: format!("{bin} file.c"),
                code: 3,
                stderr: "oops\n".to_owned(),
            }
        );
        assert_eq!(
            err.to_string(),
            format!("kernel-doc '{bin} file.c' failed with return code 3")
        );
    }

    #[test]
    fn test_stderr_echoed_on_success_when_verbose() {
        let dir = TempDir::new().unwrap();
        let bin = script(dir.path(), "echo out; echo 'warning: no structured comments' >&2");
        let cmd = command(bin, &["file.c"]);

        let mut echoed = Vec::new();
        let output = run_echoing(&cmd, 1, &mut echoed).unwrap();
        assert_eq!(output, "out\n");
        assert_eq!(
            String::from_utf8(echoed).unwrap(),
            "warning: no structured comments\n"
        );

        let mut quiet = Vec::new();
        run_echoing(&cmd, 0, &mut quiet).unwrap();
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_stderr_echoed_on_failure_regardless_of_verbosity() {
        let dir = TempDir::new().unwrap();
        let bin = script(dir.path(), "echo 'file.c: not found' >&2; exit 1");

        let mut echoed = Vec::new();
        let err = run_echoing(&command(bin, &["file.c"]), 0, &mut echoed).unwrap_err();
        assert!(matches!(err, ExtractError::Failed { code: 1, .. }));
        assert_eq!(String::from_utf8(echoed).unwrap(), "file.c: not found\n");
    }

    #[test]
    fn test_killed_by_signal() {
        let dir = TempDir::new().unwrap();
        let bin = script(dir.path(), "kill -9 $$");
        let err = run(&command(bin, &[]), 0).unwrap_err();
        assert!(matches!(err, ExtractError::Failed { code: -1, .. }));
    }

    #[test]
    fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("absent").display().to_string();
        let err = run(&command(bin, &[]), 0).unwrap_err();
        assert!(matches!(err, ExtractError::Processing { .. }));
        assert!(err.to_string().contains("processing failed with:"));
    }

    #[test]
    fn test_invalid_utf8_output() {
        let dir = TempDir::new().unwrap();
        let bin = script(dir.path(), "printf '\\377\\376'");
        let err = run(&command(bin, &[]), 0).unwrap_err();
        assert!(matches!(err, ExtractError::Processing { .. }));
    }
}

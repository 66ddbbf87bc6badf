//! Writing files the current user does not own
//!
//! The hosts file is root-owned. Content is first staged in a private temp
//! file by the caller; a [`PrivilegedWriter`] then runs one elevated shell
//! command that copies the staged file over the target and deletes it.

use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Resolver flush on macOS.
pub const MACOS_FLUSH_COMMAND: &str = "dscacheutil -flushcache && killall -HUP mDNSResponder";

/// Resolver flush on systemd hosts; a no-op where `resolvectl` is absent.
pub const LINUX_FLUSH_COMMAND: &str =
    "command -v resolvectl >/dev/null 2>&1 && resolvectl flush-caches || true";

/// The flush command for the platform this binary was built for.
pub fn default_flush_command() -> &'static str {
    if cfg!(target_os = "macos") {
        MACOS_FLUSH_COMMAND
    } else {
        LINUX_FLUSH_COMMAND
    }
}

/// Elevated operations needed by the hosts synchronizer.
pub trait PrivilegedWriter: Send + Sync + fmt::Debug {
    /// Copy `staged` over `target`, then delete `staged`.
    fn replace_file(&self, staged: &Path, target: &Path) -> Result<()>;

    /// Drop cached name resolutions so new mappings take effect.
    fn flush_resolver_cache(&self) -> Result<()>;
}

/// How to obtain elevated rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Elevation {
    /// `sudo sh -c '<script>'`, prompting on the terminal.
    Sudo,
    /// AppleScript `do shell script ... with administrator privileges`.
    Osascript,
    /// Plain `sh -c`; for targets the user can already write.
    Unprivileged,
}

impl Default for Elevation {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self::Osascript
        } else {
            Self::Sudo
        }
    }
}

impl fmt::Display for Elevation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sudo => "sudo",
            Self::Osascript => "osascript",
            Self::Unprivileged => "unprivileged",
        })
    }
}

/// Runs privileged steps as shell scripts under the chosen [`Elevation`].
#[derive(Debug, Clone)]
pub struct ShellPrivilegedWriter {
    elevation: Elevation,
    flush_command: String,
}

impl ShellPrivilegedWriter {
    pub fn new(elevation: Elevation, flush_command: impl Into<String>) -> Self {
        Self {
            elevation,
            flush_command: flush_command.into(),
        }
    }

    pub fn elevation(&self) -> Elevation {
        self.elevation
    }

    fn command_for(&self, script: &str) -> Command {
        match self.elevation {
            Elevation::Sudo => {
                let mut cmd = Command::new("sudo");
                cmd.args(["sh", "-c", script]);
                cmd
            }
            Elevation::Osascript => {
                let mut cmd = Command::new("osascript");
                cmd.arg("-e").arg(format!(
                    "do shell script \"{}\" with administrator privileges",
                    applescript_escape(script)
                ));
                cmd
            }
            Elevation::Unprivileged => {
                let mut cmd = Command::new("sh");
                cmd.args(["-c", script]);
                cmd
            }
        }
    }

    fn run(&self, script: &str) -> Result<()> {
        let mut cmd = self.command_for(script);
        let program = cmd.get_program().to_string_lossy().into_owned();
        tracing::debug!(elevation = %self.elevation, script, "running privileged command");

        let output = cmd
            .output()
            .map_err(|source| Error::PrivilegedCommandCreationFailed { program, source })?;
        check_output(output)
    }
}

impl PrivilegedWriter for ShellPrivilegedWriter {
    fn replace_file(&self, staged: &Path, target: &Path) -> Result<()> {
        let staged = shell_quote(&staged.to_string_lossy());
        let script = format!(
            "cp {staged} {} && rm -f {staged}",
            shell_quote(&target.to_string_lossy())
        );
        self.run(&script)
    }

    fn flush_resolver_cache(&self) -> Result<()> {
        if self.flush_command.trim().is_empty() {
            return Ok(());
        }
        self.run(&self.flush_command)
    }
}

fn check_output(output: Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    };
    Err(Error::PrivilegedCommandFailed(message))
}

/// Single-quote `value` for POSIX `sh`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Escape a script for embedding in an AppleScript string literal.
fn applescript_escape(script: &str) -> String {
    script.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/etc/hosts", "'/etc/hosts'")]
    #[case("/tmp/it's", r"'/tmp/it'\''s'")]
    #[case("", "''")]
    fn test_shell_quote(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(shell_quote(input), expected);
    }

    #[test]
    fn test_applescript_escape() {
        assert_eq!(
            applescript_escape(r#"cp "a" 'b\c'"#),
            r#"cp \"a\" 'b\\c'"#
        );
    }

    #[test]
    fn test_osascript_command_shape() {
        let writer = ShellPrivilegedWriter::new(Elevation::Osascript, "");
        let cmd = writer.command_for("cp 'a' 'b'");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(cmd.get_program(), "osascript");
        assert_eq!(
            args,
            vec![
                "-e".to_string(),
                "do shell script \"cp 'a' 'b'\" with administrator privileges".to_string()
            ]
        );
    }

    #[test]
    fn test_sudo_command_shape() {
        let writer = ShellPrivilegedWriter::new(Elevation::Sudo, "");
        let cmd = writer.command_for("true");
        assert_eq!(cmd.get_program(), "sudo");
        assert_eq!(cmd.get_args().count(), 3);
    }

    #[test]
    fn test_elevation_serde_names() {
        assert_eq!(
            serde_json::to_string(&Elevation::Unprivileged).unwrap(),
            "\"unprivileged\""
        );
        let parsed: Elevation = serde_json::from_str("\"osascript\"").unwrap();
        assert_eq!(parsed, Elevation::Osascript);
    }

    #[cfg(unix)]
    #[test]
    fn test_unprivileged_replace_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = dir.path().join("staged file");
        let target = dir.path().join("hosts");
        std::fs::write(&staged, "127.0.0.1 new\n").unwrap();
        std::fs::write(&target, "old\n").unwrap();

        let writer = ShellPrivilegedWriter::new(Elevation::Unprivileged, "");
        writer.replace_file(&staged, &target).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "127.0.0.1 new\n");
        assert!(!staged.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_command_reports_stderr() {
        let writer = ShellPrivilegedWriter::new(Elevation::Unprivileged, "echo boom >&2; exit 3");
        match writer.flush_resolver_cache() {
            Err(Error::PrivilegedCommandFailed(message)) => assert_eq!(message, "boom"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

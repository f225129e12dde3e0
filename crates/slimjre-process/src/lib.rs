//! Running short-lived external tools (the static dependency analyzer's
//! `jdeps`-equivalent) with bounded output and an optional timeout.
//!
//! The teacher's `nova-build::command` wraps an async `nova-process` runner
//! whose `src/` isn't present in this retrieval pack (only its `Cargo.toml`
//! and integration tests survive). This crate reconstructs the same public
//! shape — `CommandRunner` trait, `CommandOutput`, `DefaultCommandRunner`
//! with a timeout — directly on `std::process::Command`, since the only
//! caller here (`slimjre-staticdep`) makes one synchronous call per archive
//! rather than needing the full async scheduler integration.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::mpsc;
use std::time::Duration;

/// Captured output from a command invocation, with bounded capture to avoid
/// unbounded memory growth when a tool is unexpectedly chatty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub truncated: bool,
}

pub trait CommandRunner: Send + Sync + fmt::Debug {
    fn run(&self, cwd: &Path, program: &Path, args: &[String]) -> io::Result<CommandOutput>;
}

/// Bound on combined stdout+stderr capture, matching the teacher's
/// `DefaultCommandRunner::run` constant.
const MAX_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct DefaultCommandRunner {
    /// `None` means no timeout is enforced.
    pub timeout: Option<Duration>,
}

impl Default for DefaultCommandRunner {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(15 * 60)),
        }
    }
}

impl CommandRunner for DefaultCommandRunner {
    fn run(&self, cwd: &Path, program: &Path, args: &[String]) -> io::Result<CommandOutput> {
        let command = format_command(program, args);

        let mut child = std::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdout_handle = child.stdout.take().expect("stdout was piped");
        let mut stderr_handle = child.stderr.take().expect("stderr was piped");

        let (stdout_tx, stdout_rx) = mpsc::channel();
        let (stderr_tx, stderr_rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = stdout_tx.send(read_bounded(&mut stdout_handle, MAX_BYTES));
        });
        std::thread::spawn(move || {
            let _ = stderr_tx.send(read_bounded(&mut stderr_handle, MAX_BYTES));
        });

        let wait_result = match self.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout),
            None => child.wait().map(Some),
        }?;

        let Some(status) = wait_result else {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!(
                target: "slimjre.process",
                command = %command,
                timeout = ?self.timeout,
                "command timed out, killed child process"
            );
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("command `{command}` timed out after {:?}", self.timeout),
            ));
        };

        let (stdout, stdout_truncated) = stdout_rx.recv().unwrap_or_default();
        let (stderr, stderr_truncated) = stderr_rx.recv().unwrap_or_default();

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
            truncated: stdout_truncated || stderr_truncated,
        })
    }
}

fn wait_with_timeout(
    child: &mut std::process::Child,
    timeout: Duration,
) -> io::Result<Option<ExitStatus>> {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if std::time::Instant::now() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn read_bounded(reader: &mut impl io::Read, max_bytes: usize) -> (String, bool) {
    use std::io::Read;
    let mut buf = Vec::new();
    let mut limited = reader.take(max_bytes as u64 + 1);
    let _ = limited.read_to_end(&mut buf);
    let truncated = buf.len() > max_bytes;
    buf.truncate(max_bytes);
    (String::from_utf8_lossy(&buf).into_owned(), truncated)
}

pub(crate) fn format_command(program: &Path, args: &[String]) -> String {
    let mut out = format_command_part(&program.to_string_lossy());
    for arg in args {
        out.push(' ');
        out.push_str(&format_command_part(arg));
    }
    out
}

fn format_command_part(part: &str) -> String {
    if part.contains(' ') || part.contains('\t') {
        format!("\"{}\"", part.replace('"', "\\\""))
    } else {
        part.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_simple_command_and_captures_output() {
        let runner = DefaultCommandRunner::default();
        let output = runner
            .run(
                Path::new("."),
                Path::new("printf"),
                &["hello".to_string()],
            )
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "hello");
        assert!(!output.truncated);
    }

    #[cfg(unix)]
    #[test]
    fn default_runner_times_out() {
        let runner = DefaultCommandRunner {
            timeout: Some(Duration::from_millis(50)),
        };
        let err = runner
            .run(Path::new("."), Path::new("sleep"), &["5".to_string()])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn format_command_quotes_args_with_spaces() {
        let formatted = format_command(Path::new("jdeps"), &["-p a b".to_string()]);
        assert_eq!(formatted, "jdeps \"-p a b\"");
    }
}

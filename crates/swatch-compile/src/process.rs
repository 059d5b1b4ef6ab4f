use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command `{0}` timed out after {1:?}")]
    Timeout(String, Duration),
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Command output was not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Run `program` with `args`, feeding `input` on stdin.
///
/// Returns the command's stdout on success.
///
/// # Arguments
///
/// * `program` - The executable to run (looked up on `PATH`)
/// * `args` - Arguments passed verbatim, no shell involved
/// * `input` - Data to write to the command's stdin
/// * `timeout` - Optional timeout; if exceeded, the process is killed
///
/// # Notes
///
/// stdin is written and stdout/stderr are drained on helper threads, so a
/// child producing more output than the pipe buffer holds cannot deadlock.
pub fn run_command(
    program: &str,
    args: &[String],
    input: &str,
    timeout: Option<Duration>,
) -> Result<String, ProcessError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let writer = child.stdin.take().map(|mut stdin| {
        let input = input.to_owned();
        // Dropping stdin at the end of the thread closes the pipe.
        thread::spawn(move || stdin.write_all(input.as_bytes()))
    });
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match timeout {
        Some(duration) => match child.wait_timeout(duration)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                return Err(ProcessError::Timeout(program.to_string(), duration));
            }
        },
        None => child.wait()?,
    };

    if let Some(writer) = writer {
        // A child that exits without reading all of stdin breaks the pipe;
        // its exit status decides success, not the write.
        let _ = writer.join();
    }
    let stdout = collect(stdout)?;
    let stderr = collect(stderr)?;

    if !status.success() {
        return Err(ProcessError::CommandFailed {
            command: program.to_string(),
            status,
            stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8(stdout)?)
}

type Drain = thread::JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(mut reader: R) -> Drain {
    thread::spawn(move || {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<Drain>) -> Result<Vec<u8>, ProcessError> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(ProcessError::Io(std::io::Error::other(
                "output reader thread panicked",
            ))),
        },
        None => Ok(Vec::new()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_echo() {
        let output = run_command("sh", &sh("echo hello"), "", None).unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[test]
    fn test_input_piping() {
        let output = run_command("grep", &["foo".to_string()], "foo\nbar\nbaz", None).unwrap();
        assert_eq!(output.trim(), "foo");
    }

    #[test]
    fn test_large_output_does_not_deadlock() {
        let input = "x".repeat(512 * 1024);
        let output = run_command("cat", &[], &input, None).unwrap();
        assert_eq!(output.len(), input.len());
    }

    #[test]
    fn test_timeout() {
        let start = std::time::Instant::now();
        let res = run_command("sleep", &["2".to_string()], "", Some(Duration::from_millis(300)));
        assert!(matches!(res, Err(ProcessError::Timeout(_, _))));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_command_failed_carries_stderr() {
        let res = run_command("sh", &sh("echo broken >&2; exit 3"), "", None);
        match res {
            Err(ProcessError::CommandFailed {
                command, stderr, ..
            }) => {
                assert_eq!(command, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("Expected CommandFailed error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let res = run_command("swatch-definitely-not-installed", &[], "", None);
        assert!(matches!(res, Err(ProcessError::Io(_))));
    }
}

//! Spawning and supervising the vagrant subprocess.

use log::{debug, error, info};
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use super::launcher::Launcher;
use crate::error::ProcessError;

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn from_code(code: i32) -> Self {
        CommandStatus { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for CommandStatus {
    fn from(status: ExitStatus) -> Self {
        CommandStatus {
            code: status.code(),
        }
    }
}

/// Runs the external tool with the given arguments and waits for it to exit
pub trait ProcessRunner: Send + Sync {
    fn execute(&self, args: &[&str]) -> Result<CommandStatus, ProcessError>;
}

/// [`ProcessRunner`] for a real binary, launched through a [`Launcher`]
pub struct ExternalProcessRunner {
    program: String,
    launcher: Box<dyn Launcher>,
    timeout: Duration,
}

impl ExternalProcessRunner {
    pub fn new(program: impl Into<String>, launcher: Box<dyn Launcher>, timeout: Duration) -> Self {
        ExternalProcessRunner {
            program: program.into(),
            launcher,
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn requires_elevation(&self) -> bool {
        self.launcher.requires_elevation()
    }
}

impl ProcessRunner for ExternalProcessRunner {
    fn execute(&self, args: &[&str]) -> Result<CommandStatus, ProcessError> {
        let label = format_invocation(&self.program, args);
        if self.launcher.requires_elevation() {
            info!("Execute with elevation {}", label);
        } else {
            info!("Execute {}", label);
        }

        let mut command = self.launcher.command(&self.program, args);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        // Readers are detached: grandchildren may keep the pipes open after vagrant exits.
        if let Some(stdout) = child.stdout.take() {
            spawn_line_logger(stdout, label.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_logger(stderr, label.clone());
        }

        let status = wait_with_timeout(&mut child, &self.program, self.timeout)?;
        let status = CommandStatus::from(status);
        info!("Finished {} with exit code {:?}", label, status.code);
        Ok(status)
    }
}

/// Captured output of a finished process
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args...` directly and collect its output, bounded by `timeout`.
pub fn capture_output(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<CapturedOutput, ProcessError> {
    let deadline = deadline_after(timeout);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let stdout_rx = child.stdout.take().map(spawn_collector);
    let stderr_rx = child.stderr.take().map(spawn_collector);

    let status = wait_with_timeout(&mut child, program, timeout)?;

    let timed_out = || ProcessError::TimedOut {
        program: program.to_string(),
        timeout,
    };
    let collect = |rx: Option<mpsc::Receiver<String>>| -> Result<String, ProcessError> {
        match rx {
            Some(rx) => match deadline {
                Some(deadline) => rx
                    .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                    .map_err(|_| timed_out()),
                None => rx.recv().map_err(|_| timed_out()),
            },
            None => Ok(String::new()),
        }
    };

    Ok(CapturedOutput {
        status: CommandStatus::from(status),
        stdout: collect(stdout_rx)?,
        stderr: collect(stderr_rx)?,
    })
}

/// `None` when `timeout` reaches past what an `Instant` can represent,
/// which means no deadline at all.
pub fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Poll `child` until it exits; kill it once `timeout` has passed.
pub fn wait_with_timeout(
    child: &mut Child,
    program: &str,
    timeout: Duration,
) -> Result<ExitStatus, ProcessError> {
    let deadline = deadline_after(timeout);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                let now = Instant::now();
                let remaining = deadline.map(|deadline| deadline.saturating_duration_since(now));
                if remaining == Some(Duration::ZERO) {
                    error!(
                        "{} (pid {}) still running after {}s, killing it",
                        program,
                        child.id(),
                        timeout.as_secs()
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ProcessError::TimedOut {
                        program: program.to_string(),
                        timeout,
                    });
                }
                thread::sleep(remaining.map_or(POLL_INTERVAL, |left| POLL_INTERVAL.min(left)));
            }
            Err(source) => {
                return Err(ProcessError::Wait {
                    program: program.to_string(),
                    source,
                })
            }
        }
    }
}

fn spawn_line_logger<R: Read + Send + 'static>(pipe: R, label: String) {
    thread::spawn(move || {
        let reader = BufReader::new(pipe);
        for line in reader.lines() {
            let Ok(content) = line else {
                break;
            };
            if content.trim().is_empty() {
                continue;
            }
            debug!("{} | {}", label, content);
        }
    });
}

fn spawn_collector<R: Read + Send + 'static>(mut pipe: R) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// `['vagrant' 'up' 'id']`
pub fn format_invocation(program: &str, args: &[&str]) -> String {
    let parts: Vec<&str> = std::iter::once(program).chain(args.iter().copied()).collect();
    format!("['{}']", parts.join("' '"))
}

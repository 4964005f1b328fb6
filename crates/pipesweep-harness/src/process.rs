// Dweve Pipesweep - Compression Pipeline Sweep Harness
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! External tool invocation.
//!
//! [`ToolCommand`] runs a program with an explicit argument vector (never
//! through a shell), times it from spawn to exit, and enforces an optional
//! timeout by polling the child and killing it on expiry.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Bytes of stderr kept for error messages.
const STDERR_TAIL: usize = 2048;

/// How long an exited child's stderr may stay open before the tail is dropped.
const STDERR_GRACE: Duration = Duration::from_millis(250);

const MIN_POLL: Duration = Duration::from_millis(1);
const MAX_POLL: Duration = Duration::from_millis(20);

/// Where the child's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutTarget {
    /// Discarded.
    Null,
    /// Written to a file, created or truncated before spawn.
    File(PathBuf),
}

/// How a tool invocation ended.
#[derive(Debug)]
pub enum ToolError {
    /// The program could not be started.
    Spawn(io::Error),
    /// Waiting on the child failed.
    Wait(io::Error),
    /// The timeout expired and the child was killed.
    Timeout(Duration),
}

/// A finished invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit status.
    pub status: ExitStatus,
    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
    /// Last bytes written to stderr, lossily decoded.
    pub stderr_tail: String,
}

/// A program plus explicit arguments.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    stdout: StdoutTarget,
}

impl ToolCommand {
    /// Creates a command for `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            stdout: StdoutTarget::Null,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Kills the child if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Redirects standard output.
    pub fn stdout(mut self, target: StdoutTarget) -> Self {
        self.stdout = target;
        self
    }

    /// Program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments in order.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Runs the command to completion (or until the timeout).
    pub fn run(&self) -> Result<ToolOutput, ToolError> {
        let stdout = match &self.stdout {
            StdoutTarget::Null => Stdio::null(),
            StdoutTarget::File(path) => Stdio::from(File::create(path).map_err(ToolError::Spawn)?),
        };

        debug!(program = %self.program.display(), args = ?self.args, "spawning tool");
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ToolError::Spawn)?;

        let stderr = child.stderr.take().map(|pipe| {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let _ = tx.send(read_tail(pipe));
            });
            rx
        });

        let waited = match self.timeout {
            None => child.wait().map(Some).map_err(ToolError::Wait),
            Some(limit) => wait_with_timeout(&mut child, started, limit),
        };
        let elapsed = started.elapsed();

        // Descendants of the child may still hold stderr open. The reader
        // thread is never joined; it finishes on its own once they exit.
        let status = match waited? {
            Some(status) => status,
            None => return Err(ToolError::Timeout(elapsed)),
        };
        let grace = self
            .timeout
            .map_or(STDERR_GRACE, |limit| limit.saturating_sub(elapsed).max(STDERR_GRACE));
        let stderr_tail = match stderr.map(|rx| rx.recv_timeout(grace)) {
            Some(Ok(tail)) => tail,
            Some(Err(_)) => {
                debug!(program = %self.program.display(), "stderr still open after exit, tail dropped");
                String::new()
            }
            None => String::new(),
        };

        Ok(ToolOutput {
            status,
            elapsed,
            stderr_tail,
        })
    }
}

/// Polls the child until it exits; kills it when `limit` elapses.
///
/// Returns `Ok(None)` on timeout.
fn wait_with_timeout(
    child: &mut Child,
    started: Instant,
    limit: Duration,
) -> Result<Option<ExitStatus>, ToolError> {
    let mut poll = MIN_POLL;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Wait(e));
            }
        }

        if started.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }

        thread::sleep(poll);
        poll = (poll * 2).min(MAX_POLL);
    }
}

fn read_tail(mut pipe: impl Read) -> String {
    let mut tail: Vec<u8> = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match pipe.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > STDERR_TAIL {
                    tail.drain(..tail.len() - STDERR_TAIL);
                }
            }
        }
    }
    String::from_utf8_lossy(&tail).trim().to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_exit_code() {
        let output = ToolCommand::new("sh").args(["-c", "exit 0"]).run().unwrap();
        assert!(output.status.success());

        let output = ToolCommand::new("sh").args(["-c", "exit 3"]).run().unwrap();
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn test_stderr_tail() {
        let output = ToolCommand::new("sh")
            .args(["-c", "echo oops >&2; exit 1"])
            .run()
            .unwrap();
        assert_eq!(output.stderr_tail, "oops");
    }

    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let result = ToolCommand::new("sleep")
            .arg("5")
            .timeout(Some(Duration::from_millis(100)))
            .run();
        assert!(matches!(result, Err(ToolError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_exit_does_not_wait_for_inherited_stderr() {
        let started = Instant::now();
        let output = ToolCommand::new("sh")
            .args(["-c", "sleep 5 >/dev/null & exit 0"])
            .timeout(Some(Duration::from_secs(1)))
            .run()
            .unwrap();
        assert!(output.status.success());
        assert!(started.elapsed() < Duration::from_secs(3));

        let started = Instant::now();
        let output = ToolCommand::new("sh")
            .args(["-c", "sleep 5 >/dev/null & exit 0"])
            .run()
            .unwrap();
        assert!(output.status.success());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_spawn_failure() {
        let result = ToolCommand::new("/nonexistent/pipesweep-tool").run();
        assert!(matches!(result, Err(ToolError::Spawn(_))));
    }

    #[test]
    fn test_stdout_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        ToolCommand::new("sh")
            .args(["-c", "printf hello"])
            .stdout(StdoutTarget::File(out.clone()))
            .run()
            .unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "hello");
    }

    #[test]
    fn test_read_tail_keeps_end() {
        let data = vec![b'x'; STDERR_TAIL * 3];
        let mut input = data.clone();
        input.extend_from_slice(b"END");
        let tail = read_tail(input.as_slice());
        assert!(tail.ends_with("END"));
        assert_eq!(tail.len(), STDERR_TAIL);
    }
}

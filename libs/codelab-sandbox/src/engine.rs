/// Execution Engine - One Isolated Context per Test Case
///
/// **Core Responsibility:**
/// Run a submission's entry point once, inside a freshly spawned interpreter
/// process, and report what happened as a raw [`ContextVerdict`].
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to execute (process, pipes, deadline, teardown)
/// - Engine does NOT compare outputs or build test outcomes
/// - Engine returns raw verdicts for the evaluator to judge
///
/// **Isolation Rules:**
/// 1. A new OS process per call; nothing is reused between test cases
/// 2. Environment cleared except `PATH`
/// 3. Source, entry point and arguments go in over stdin, then stdin closes
/// 4. Exactly one marked result line comes back over stdout
/// 5. The process is killed with SIGKILL at the deadline, busy loops included
///
/// **Settling:**
/// Three signals race: a result message, the deadline, and the process
/// exiting on its own. One `select!` produces a single [`Settlement`]; the
/// losing branches are dropped and can no longer be observed.

use crate::error::{Result, SandboxError};
use crate::value::JsValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::oneshot;
use tracing::{debug, instrument, trace, warn};

/// Protocol lines start with this marker, then the context nonce and `:`
pub const CONTEXT_MARKER: &str = "@@codelab:";

/// JavaScript program run by every Node.js context
pub const HARNESS: &str = include_str!("harness.js");

/// How long to keep reading stdout after the process is seen exiting
const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Only the end of stderr is kept for crash messages
const STDERR_TAIL_BYTES: usize = 16 * 1024;

/// Program and arguments that start one execution context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextCommand {
    program: String,
    args: Vec<String>,
}

impl ContextCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Raw result of one context run
#[derive(Debug, Clone, PartialEq)]
pub enum ContextVerdict {
    /// The entry point returned (or resolved to) a value
    Returned(JsValue),
    /// Loading or calling the submission raised an error
    Faulted(String),
    /// The deadline elapsed and the process was killed
    TimedOut,
    /// The process ended without reporting; the message describes how
    Terminated(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextPayload<'a> {
    nonce: &'a str,
    source: &'a str,
    entry_point: &'a str,
    args: &'a [Value],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContextMessage {
    Result { output: Value },
    Error { message: String },
}

enum Settlement {
    Message(ContextMessage),
    DeadlineElapsed,
    Exited(ExitStatus),
}

/// Process-based execution engine
pub struct ProcessEngine {
    command: ContextCommand,
}

impl ProcessEngine {
    pub fn new(command: ContextCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ContextCommand {
        &self.command
    }

    /// Run `entry_point(...args)` from `source` in a new context
    ///
    /// Only infrastructure problems are errors: failing to spawn the process,
    /// to encode the payload or to wait on the child. Everything the
    /// submission does ends up in the returned verdict.
    #[instrument(
        skip(self, source, args),
        fields(program = %self.command.program, deadline_ms = deadline.as_millis() as u64)
    )]
    pub async fn execute(
        &self,
        source: &str,
        entry_point: &str,
        args: &[Value],
        deadline: Duration,
    ) -> Result<ContextVerdict> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let payload = serde_json::to_vec(&ContextPayload {
            nonce: &nonce,
            source,
            entry_point,
            args,
        })?;

        let mut child = self.spawn()?;
        let timer = tokio::time::sleep(deadline);
        tokio::pin!(timer);

        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!(error = %e, "Context closed stdin before the payload was written");
                }
            });
        }

        let (message_tx, mut message_rx) = oneshot::channel();
        match child.stdout.take() {
            Some(stdout) => {
                let prefix = format!("{CONTEXT_MARKER}{nonce}:");
                tokio::spawn(read_message(stdout, prefix, message_tx));
            }
            None => drop(message_tx),
        }
        let stderr_tail = child.stderr.take().map(|stderr| tokio::spawn(read_stderr_tail(stderr)));

        let settlement = tokio::select! {
            biased;
            message = &mut message_rx => match message {
                Ok(Some(message)) => Settlement::Message(message),
                // stdout closed without a result; the exit status decides
                _ => tokio::select! {
                    biased;
                    status = child.wait() => Settlement::Exited(status.map_err(SandboxError::Wait)?),
                    _ = &mut timer => Settlement::DeadlineElapsed,
                },
            },
            status = child.wait() => {
                let status = status.map_err(SandboxError::Wait)?;
                // The exit can be seen before the final stdout line is read.
                match tokio::time::timeout(EXIT_DRAIN_GRACE, &mut message_rx).await {
                    Ok(Ok(Some(message))) => Settlement::Message(message),
                    _ => Settlement::Exited(status),
                }
            },
            _ = &mut timer => Settlement::DeadlineElapsed,
        };

        let verdict = match settlement {
            Settlement::Message(message) => {
                teardown(&mut child).await;
                verdict_from_message(message)
            }
            Settlement::DeadlineElapsed => {
                teardown(&mut child).await;
                warn!(deadline_ms = deadline.as_millis() as u64, "Context exceeded deadline; killed");
                ContextVerdict::TimedOut
            }
            Settlement::Exited(status) => {
                let stderr = match stderr_tail {
                    Some(task) => tokio::time::timeout(EXIT_DRAIN_GRACE, task)
                        .await
                        .ok()
                        .and_then(|joined| joined.ok())
                        .unwrap_or_default(),
                    None => String::new(),
                };
                let description = describe_exit(status, &stderr);
                warn!(status = %status, "Context terminated without a result");
                ContextVerdict::Terminated(description)
            }
        };

        Ok(verdict)
    }

    fn spawn(&self) -> Result<Child> {
        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }

        let child = command.spawn().map_err(|source| SandboxError::Spawn {
            program: self.command.program.clone(),
            source,
        })?;
        trace!(pid = child.id(), "Context spawned");
        Ok(child)
    }
}

/// Kill and reap; a context that already exited is fine.
async fn teardown(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Context was already gone at teardown");
    }
}

/// Forward the first line carrying `prefix`, or `None` once stdout closes.
async fn read_message(
    stdout: ChildStdout,
    prefix: String,
    message_tx: oneshot::Sender<Option<ContextMessage>>,
) {
    let mut lines = BufReader::new(stdout).lines();
    let message = loop {
        match lines.next_line().await {
            Ok(Some(line)) => match line.strip_prefix(&prefix) {
                Some(body) => break Some(parse_message(body)),
                None => trace!(line = %line, "Ignoring unmarked context output"),
            },
            Ok(None) => break None,
            Err(e) => {
                debug!(error = %e, "Failed to read context stdout");
                break None;
            }
        }
    };
    // The receiver is gone once the race has settled some other way.
    let _ = message_tx.send(message);
}

fn parse_message(body: &str) -> ContextMessage {
    serde_json::from_str(body).unwrap_or_else(|e| ContextMessage::Error {
        message: format!("Malformed message from execution context: {e}"),
    })
}

async fn read_stderr_tail(mut stderr: ChildStderr) -> String {
    let mut tail = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                tail.extend_from_slice(&chunk[..n]);
                if tail.len() > STDERR_TAIL_BYTES {
                    let excess = tail.len() - STDERR_TAIL_BYTES;
                    tail.drain(..excess);
                }
            }
        }
    }
    String::from_utf8_lossy(&tail).into_owned()
}

fn verdict_from_message(message: ContextMessage) -> ContextVerdict {
    match message {
        ContextMessage::Result { output } => match JsValue::decode(&output) {
            Ok(value) => ContextVerdict::Returned(value),
            Err(e) => ContextVerdict::Faulted(format!("Malformed output from execution context: {e}")),
        },
        ContextMessage::Error { message } => ContextVerdict::Faulted(message),
    }
}

fn describe_exit(status: ExitStatus, stderr: &str) -> String {
    let summary = match (status.code(), exit_signal(&status)) {
        (Some(0), _) => "Execution context exited without producing a result".to_string(),
        (Some(code), _) => format!("Execution context stopped with exit code {code}"),
        (None, Some(signal)) => format!("Execution context terminated by signal {signal}"),
        (None, None) => "Execution context terminated abnormally".to_string(),
    };

    match stderr_detail(stderr) {
        Some(detail) => format!("{summary}: {detail}"),
        None => summary,
    }
}

/// First line that names an error, else the last non-empty line.
fn stderr_detail(stderr: &str) -> Option<&str> {
    let mut lines = stderr.lines().map(str::trim).filter(|line| !line.is_empty());
    let named = stderr
        .lines()
        .map(str::trim)
        .find(|line| line.contains("Error") || line.contains("ERROR"));
    named.or_else(|| lines.next_back())
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

//! Ownership wrapper around one spawned tool process.

use std::process::Stdio;
use std::time::Duration;

use droidscope_core::{CommandSpec, Line, Origin, SessionError};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

#[cfg(unix)]
use super::shutdown::kill_process_group;
use super::shutdown::shutdown_child;
use super::stream::spawn_stream_reader;

/// Lines buffered between the pipe readers and the session.
const LINE_CHANNEL_CAPACITY: usize = 256;

/// Whether the owned process is still alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Running,
    /// Exited on its own; `None` when ended by a signal.
    Exited(Option<i32>),
    /// Stopped through [`ProcessHandle::kill`] while still running.
    Killed,
}

/// Something the process did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A complete line from stdout or stderr.
    Line(Line),
    /// The process exited and both pipes are drained. Emitted exactly once.
    Exited(Option<i32>),
}

/// Sole owner of one spawned process.
///
/// The process is spawned with stdin closed and both output pipes read by
/// background tasks. On unix it leads a new process group. Dropping the
/// handle without calling [`kill`](Self::kill) still terminates the process
/// and its group.
#[derive(Debug)]
pub struct ProcessHandle {
    spec: CommandSpec,
    pid: Option<u32>,
    child: Option<Child>,
    lines: mpsc::Receiver<Line>,
    liveness: Liveness,
    kill_grace: Duration,
}

impl ProcessHandle {
    /// Spawn `spec` and start reading its output.
    pub fn spawn(spec: CommandSpec, kill_grace: Duration) -> Result<Self, SessionError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group, so a shutdown reaches everything a shell line started
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| SessionError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        let pid = child.id();
        let (tx, lines) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(stdout, Origin::Stdout, pid, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(stderr, Origin::Stderr, pid, tx);
        }

        debug!(?pid, command = %spec, "spawned process");

        Ok(Self {
            spec,
            pid,
            child: Some(child),
            lines,
            liveness: Liveness::Running,
            kill_grace,
        })
    }

    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub const fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub const fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub const fn is_alive(&self) -> bool {
        matches!(self.liveness, Liveness::Running)
    }

    /// Next line or the exit notification.
    ///
    /// Lines come first; once both pipes have closed the process is reaped
    /// and [`ProcessEvent::Exited`] is returned. After that, or after a
    /// kill, this returns `None`.
    ///
    /// Cancel safe: dropping the future loses no events.
    pub async fn next_event(&mut self) -> Option<ProcessEvent> {
        if !self.is_alive() {
            return None;
        }

        if let Some(line) = self.lines.recv().await {
            return Some(ProcessEvent::Line(line));
        }

        let child = self.child.as_mut()?;
        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(e) => {
                warn!(pid = ?self.pid, error = %e, "failed to reap process");
                None
            }
        };
        self.child = None;
        self.liveness = Liveness::Exited(code);
        debug!(pid = ?self.pid, ?code, "process exited");
        Some(ProcessEvent::Exited(code))
    }

    /// Stop the process. A no-op if it already exited or was killed.
    pub async fn kill(&mut self) {
        self.terminate().await;
        self.lines.close();
    }

    /// Stop the process and return the output it produced before dying.
    ///
    /// Lines still in flight from the pipe readers are collected for at most
    /// the kill grace period.
    pub async fn kill_and_drain(&mut self) -> Vec<Line> {
        self.terminate().await;

        let grace = self.kill_grace;
        let lines = &mut self.lines;
        let mut drained = Vec::new();
        let collect = async {
            while let Some(line) = lines.recv().await {
                drained.push(line);
            }
        };
        if timeout(grace, collect).await.is_err() {
            debug!(pid = ?self.pid, "pipes still open after kill");
        }
        self.lines.close();
        drained
    }

    async fn terminate(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        let exited = child.try_wait().ok().flatten();
        match shutdown_child(&mut child, self.kill_grace).await {
            Ok(status) => debug!(pid = ?self.pid, %status, "process stopped"),
            Err(e) => warn!(pid = ?self.pid, error = %e, "failed to kill process"),
        }
        // An exited leader may leave its group behind
        #[cfg(unix)]
        if let (Some(_), Some(pid)) = (exited, self.pid) {
            kill_process_group(pid);
        }

        self.liveness = match exited {
            Some(status) => Liveness::Exited(status.code()),
            None => Liveness::Killed,
        };
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // kill_on_drop only reaches the leader
        #[cfg(unix)]
        if let (Some(pid), Some(_)) = (self.pid, self.child.as_ref()) {
            kill_process_group(pid);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::shell("sh", script)
    }

    async fn collect(handle: &mut ProcessHandle) -> Vec<ProcessEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn streams_lines_then_exit() {
        let mut handle =
            ProcessHandle::spawn(sh("echo one; echo two; exit 3"), Duration::from_secs(1))
                .unwrap();
        assert!(handle.pid().is_some());

        let events = collect(&mut handle).await;
        assert_eq!(
            events,
            vec![
                ProcessEvent::Line(Line::stdout("one")),
                ProcessEvent::Line(Line::stdout("two")),
                ProcessEvent::Exited(Some(3)),
            ]
        );
        assert_eq!(handle.liveness(), Liveness::Exited(Some(3)));
    }

    #[tokio::test]
    async fn stderr_lines_are_tagged() {
        let mut handle = ProcessHandle::spawn(sh("echo bad >&2"), Duration::from_secs(1)).unwrap();
        let events = collect(&mut handle).await;
        assert_eq!(events[0], ProcessEvent::Line(Line::stderr("bad")));
        assert_eq!(events[1], ProcessEvent::Exited(Some(0)));
    }

    #[tokio::test]
    async fn spawn_failure_is_reported() {
        let err = ProcessHandle::spawn(
            CommandSpec::new("/nonexistent/frida-trace").arg("-U"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        match err {
            SessionError::Spawn { command, .. } => {
                assert_eq!(command, "/nonexistent/frida-trace -U");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn kill_after_exit_is_a_noop() {
        let mut handle = ProcessHandle::spawn(sh("exit 0"), Duration::from_secs(1)).unwrap();
        let events = collect(&mut handle).await;
        assert_eq!(events, vec![ProcessEvent::Exited(Some(0))]);

        handle.kill().await;
        handle.kill().await;
        assert_eq!(handle.liveness(), Liveness::Exited(Some(0)));
        assert!(handle.next_event().await.is_none());
    }

    #[tokio::test]
    async fn kill_and_drain_keeps_early_output() {
        let mut handle =
            ProcessHandle::spawn(sh("echo early; sleep 30"), Duration::from_secs(1)).unwrap();
        // Wait for the first line so it is known to be in flight
        let first = handle.next_event().await;
        assert_eq!(first, Some(ProcessEvent::Line(Line::stdout("early"))));

        let rest = handle.kill_and_drain().await;
        assert!(rest.is_empty());
        assert_eq!(handle.liveness(), Liveness::Killed);
        assert!(handle.next_event().await.is_none());
    }

    #[tokio::test]
    async fn kill_is_idempotent() {
        let mut handle = ProcessHandle::spawn(sh("sleep 30"), Duration::from_secs(1)).unwrap();
        handle.kill().await;
        assert_eq!(handle.liveness(), Liveness::Killed);
        handle.kill().await;
        assert_eq!(handle.liveness(), Liveness::Killed);
        assert!(handle.next_event().await.is_none());
    }

    #[tokio::test]
    async fn kill_after_unobserved_exit_keeps_exit_code() {
        let mut handle = ProcessHandle::spawn(sh("exit 4"), Duration::from_secs(1)).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        handle.kill().await;
        assert_eq!(handle.liveness(), Liveness::Exited(Some(4)));
        assert!(handle.next_event().await.is_none());
    }

    #[cfg(target_os = "linux")]
    async fn background_pid(handle: &mut ProcessHandle) -> u32 {
        match handle.next_event().await {
            Some(ProcessEvent::Line(line)) => line.text.parse().unwrap(),
            other => panic!("expected the background pid, got {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn kill_reaches_shell_descendants() {
        use crate::testing::{process_running, wait_until_gone};

        let mut handle =
            ProcessHandle::spawn(sh("sleep 30 & echo $!; wait"), Duration::from_secs(1)).unwrap();
        let pid = background_pid(&mut handle).await;
        assert!(process_running(pid));

        handle.kill().await;
        assert_eq!(handle.liveness(), Liveness::Killed);
        assert!(wait_until_gone(pid).await);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn drop_reaches_shell_descendants() {
        use crate::testing::wait_until_gone;

        let mut handle =
            ProcessHandle::spawn(sh("sleep 30 & echo $!; wait"), Duration::from_secs(1)).unwrap();
        let pid = background_pid(&mut handle).await;

        drop(handle);
        assert!(wait_until_gone(pid).await);
    }
}

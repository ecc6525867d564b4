//! Shutdown for `tokio::process::Child` with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::{Pid, getpgid};

/// Shut down a child process, escalating to SIGKILL after `grace`.
///
/// # Strategy
/// 1. Send SIGTERM and wait up to `grace` for the process to exit
/// 2. If still running, send SIGKILL
/// 3. Wait for reaping (required to avoid zombies)
///
/// # Platform behavior
/// - Unix: signals go through nix. A child that leads its own process group
///   is signalled as a group, so shell pipelines and their descendants stop
///   with it.
/// - Windows: `Child::kill` immediately (no graceful shutdown available)
///
/// A child that has already exited is reaped and its status returned.
pub async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    let group = child
        .id()
        .and_then(|pid| i32::try_from(pid).ok())
        .map(Pid::from_raw)
        .filter(|pid| leads_own_group(*pid));

    if let Some(status) = child.try_wait()? {
        #[cfg(unix)]
        if let Some(pgid) = group {
            kill_group(pgid);
        }
        return Ok(status);
    }

    #[cfg(unix)]
    {
        let status = shutdown_unix(child, grace, group).await;
        if let Some(pgid) = group {
            kill_group(pgid);
        }
        status
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        shutdown_windows(child).await
    }
}

/// SIGKILL every process left in the group led by `pid`.
///
/// Used when a group leader is released without a graceful shutdown.
#[cfg(unix)]
pub(crate) fn kill_process_group(pid: u32) {
    if let Ok(pid) = i32::try_from(pid) {
        kill_group(Pid::from_raw(pid));
    }
}

#[cfg(unix)]
fn leads_own_group(pid: Pid) -> bool {
    getpgid(Some(pid)).is_ok_and(|pgid| pgid == pid)
}

#[cfg(unix)]
fn kill_group(pgid: Pid) {
    // ESRCH once every member is gone
    let _ = signal::killpg(pgid, Signal::SIGKILL);
}

#[cfg(unix)]
async fn shutdown_unix(
    child: &mut Child,
    grace: Duration,
    group: Option<Pid>,
) -> io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        // Already reaped by tokio
        return child.wait().await;
    };
    let pid = i32::try_from(pid).map_err(|_| io::Error::other("pid out of range"))?;

    let sent = match group {
        Some(pgid) => signal::killpg(pgid, Signal::SIGTERM),
        None => signal::kill(Pid::from_raw(pid), Signal::SIGTERM),
    };
    if let Err(e) = sent {
        // Process may have already exited
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    if !grace.is_zero() {
        if let Ok(result) = timeout(grace, child.wait()).await {
            return result;
        }
    }

    if let Some(pgid) = group {
        kill_group(pgid);
    }
    // Child::kill sends SIGKILL and reaps
    child.kill().await?;
    child.wait().await
}

#[cfg(not(unix))]
async fn shutdown_windows(child: &mut Child) -> io::Result<ExitStatus> {
    child.kill().await?;
    child.wait().await
}

use crate::domain::model::ChildExit;
use crate::utils::error::{LabError, Result};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use std::panic::{self, AssertUnwindSafe};

/// Forks, runs `child` in the new process and blocks until it is gone.
///
/// The child leaves through `_exit`: status 0 when `child` returns `Ok`,
/// 1 on error and 101 on panic. It never returns into the caller.
pub fn fork_and_wait<F>(fork_context: &str, child: F) -> Result<(Pid, ChildExit)>
where
    F: FnOnce() -> Result<()>,
{
    // SAFETY: the child only performs reads, writes and allocation before
    // `_exit`; it never returns into code that assumes a single owner of
    // the parent's threads.
    match unsafe { fork() }.map_err(|e| LabError::sys(fork_context, e))? {
        ForkResult::Child => {
            let code = match panic::catch_unwind(AssertUnwindSafe(child)) {
                Ok(Ok(())) => 0,
                Ok(Err(e)) => {
                    tracing::error!("child failed: {}", e);
                    1
                }
                Err(_) => 101,
            };
            // SAFETY: `_exit` skips atexit handlers and stdio flushing, which
            // belong to the parent; it takes no pointers and never returns.
            unsafe { libc::_exit(code) }
        }
        ForkResult::Parent { child } => {
            tracing::debug!("forked child {}", child);
            let exit = wait_for(child)?;
            tracing::debug!("child {} {}", child, exit);
            Ok((child, exit))
        }
    }
}

/// Turns anything but a clean `exit(0)` into [`LabError::ChildFailedError`].
pub fn ensure_success(pid: Pid, exit: &ChildExit) -> Result<()> {
    if exit.success() {
        Ok(())
    } else {
        Err(LabError::ChildFailedError {
            pid: pid.as_raw(),
            status: exit.to_string(),
        })
    }
}

pub fn wait_for(pid: Pid) -> Result<ChildExit> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ChildExit::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return Ok(ChildExit::Signaled(signal.as_str().to_string()))
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => return Err(LabError::sys("wait failed", e)),
        }
    }
}

use crate::config::RecursionSection;
use crate::core::limits::{print_limits, set_soft_limit};
use crate::core::sink::FdSink;
use crate::core::Demo;
use crate::domain::model::{DemoOutcome, LimitReport, RecursionReport};
use crate::utils::error::{LabError, Result};
use nix::sys::resource::Resource;
use std::hint::black_box;
use std::io::Write;
use std::thread;

/// State threaded through the mutual recursion.
pub struct Descent<'a> {
    out: &'a mut FdSink,
    max_depth: Option<u64>,
    calls: u64,
    frames: Vec<usize>,
}

impl<'a> Descent<'a> {
    pub fn new(out: &'a mut FdSink, max_depth: Option<u64>) -> Self {
        Self {
            out,
            max_depth,
            calls: 0,
            frames: Vec::new(),
        }
    }

    fn record(&mut self, frame: usize) {
        // Unbounded runs only ever end in a crash; don't grow a list for them.
        if self.max_depth.is_some() {
            self.frames.push(frame);
        }
    }
}

/// First half of the pair. Both halves use the frame's local after the
/// call returns, so neither call is a tail call and every level keeps its
/// own stack frame.
#[inline(never)]
pub fn descend(descent: &mut Descent<'_>) -> Result<u64> {
    if descent.max_depth.is_some_and(|max| descent.calls >= max) {
        return Ok(0);
    }
    descent.calls += 1;

    let local: u64 = descent.calls;
    let frame = black_box(&local) as *const u64 as usize;
    descent.record(frame);
    writeln!(
        descent.out,
        "func (called {:5} times): frame at : 0x{:12X}",
        descent.calls, frame
    )?;

    let deeper = ascend(descent)?;
    Ok(black_box(local).wrapping_add(deeper))
}

#[inline(never)]
pub fn ascend(descent: &mut Descent<'_>) -> Result<u64> {
    let local: u64 = 0;
    let frame = black_box(&local) as *const u64 as usize;
    descent.record(frame);
    writeln!(descent.out, "func2: frame at : 0x{:12X}", frame)?;

    let deeper = descend(descent)?;
    Ok(black_box(local).wrapping_add(deeper))
}

/// Recurses on the calling thread. Returns only when `max_depth` is set.
pub fn recurse_here(out: &mut FdSink, max_depth: Option<u64>) -> Result<(u64, Vec<usize>)> {
    let mut descent = Descent::new(out, max_depth);
    descend(&mut descent)?;
    Ok((descent.calls, descent.frames))
}

/// Recurses on a fresh thread with a `stack_bytes` stack and joins it.
pub fn recurse_on_worker(
    out: &mut FdSink,
    stack_bytes: usize,
    max_depth: Option<u64>,
) -> Result<(u64, Vec<usize>)> {
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("recur".to_string())
            .stack_size(stack_bytes)
            .spawn_scoped(scope, || recurse_here(out, max_depth))
            .map_err(LabError::ThreadSpawnError)?;

        tracing::debug!("worker started with a {} byte stack", stack_bytes);
        handle.join().map_err(|panic| LabError::WorkerPanicError {
            message: panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string()),
        })?
    })
}

/// Lowers the soft stack limit, prints the stack, address-space and RSS
/// limits, then recurses until the stack gives out.
pub struct RecursionDemo {
    settings: RecursionSection,
}

impl RecursionDemo {
    pub fn new(settings: RecursionSection) -> Self {
        Self { settings }
    }

    /// Worker stack size: the soft stack limit when it is finite.
    fn worker_stack_bytes(&self, limits: &[LimitReport]) -> usize {
        limits
            .iter()
            .find(|l| l.name == "RLIMIT_STACK")
            .and_then(|l| l.soft.finite())
            .unwrap_or(self.settings.stack_limit_bytes) as usize
    }
}

impl Demo for RecursionDemo {
    fn name(&self) -> &'static str {
        "thread-recur"
    }

    fn run(&mut self, out: &mut FdSink) -> Result<DemoOutcome> {
        set_soft_limit(
            "RLIMIT_STACK",
            Resource::RLIMIT_STACK,
            self.settings.stack_limit_bytes,
        )?;
        tracing::debug!(
            "soft RLIMIT_STACK set to {} bytes",
            self.settings.stack_limit_bytes
        );

        let limits = print_limits(out)?;

        let (calls, frames) = if self.settings.worker_thread {
            let stack_bytes = self.worker_stack_bytes(&limits);
            recurse_on_worker(out, stack_bytes, self.settings.max_depth)?
        } else {
            recurse_here(out, self.settings.max_depth)?
        };

        writeln!(out, "Sentinel")?;
        tracing::info!("recursion stopped after {} calls", calls);

        Ok(DemoOutcome::Recursion(RecursionReport {
            limits,
            calls,
            frames,
        }))
    }
}

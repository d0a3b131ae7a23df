use serde::{Deserialize, Serialize};
use std::fmt;

/// One observed memory location: its current value and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub name: String,
    pub value: i32,
    pub address: usize,
}

impl fmt::Display for CellSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} = {} ({:#x})", self.name, self.value, self.address)
    }
}

/// A soft or hard resource limit as reported by `getrlimit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    Infinite,
    Finite(u64),
}

impl Limit {
    pub fn from_raw(raw: libc::rlim_t) -> Self {
        if raw == libc::RLIM_INFINITY {
            Limit::Infinite
        } else {
            Limit::Finite(raw as u64)
        }
    }

    pub fn finite(self) -> Option<u64> {
        match self {
            Limit::Infinite => None,
            Limit::Finite(n) => Some(n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitReport {
    pub name: String,
    pub soft: Limit,
    pub hard: Limit,
}

/// How a forked child ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildExit {
    Exited(i32),
    Signaled(String),
}

impl ChildExit {
    pub fn success(&self) -> bool {
        matches!(self, ChildExit::Exited(0))
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildExit::Exited(code) => write!(f, "exited with status {}", code),
            ChildExit::Signaled(signal) => write!(f, "killed by {}", signal),
        }
    }
}

/// A line pulled from a [`LineSource`](crate::domain::ports::LineSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub bytes: Vec<u8>,
    /// False when the source ended before a newline.
    pub terminated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterleaveReport {
    pub parent_before: usize,
    pub child: ChildExit,
    pub parent_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CowReport {
    pub initial: Vec<CellSnapshot>,
    /// What the child saw after its own increments.
    pub child_view: Vec<CellSnapshot>,
    pub child_pid: i32,
    pub after_child: Vec<CellSnapshot>,
    pub after_increment: Vec<CellSnapshot>,
    pub child: ChildExit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursionReport {
    pub limits: Vec<LimitReport>,
    pub calls: u64,
    pub frames: Vec<usize>,
}

/// What a finished demo hands back to the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemoOutcome {
    Interleave(InterleaveReport),
    Cow(CowReport),
    Recursion(RecursionReport),
}

use crate::core::process::{ensure_success, fork_and_wait};
use crate::core::sink::FdSink;
use crate::core::Demo;
use crate::domain::model::{CellSnapshot, CowReport, DemoOutcome};
use crate::utils::error::{LabError, Result};
use nix::unistd::getpid;
use std::fs::File;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicI32, Ordering};

static GLOBAL: AtomicI32 = AtomicI32::new(0);

fn snapshot(stack: &i32, heap: &i32) -> Vec<CellSnapshot> {
    vec![
        CellSnapshot {
            name: "global".to_string(),
            value: GLOBAL.load(Ordering::SeqCst),
            address: &GLOBAL as *const AtomicI32 as usize,
        },
        CellSnapshot {
            name: "stack".to_string(),
            value: *stack,
            address: stack as *const i32 as usize,
        },
        CellSnapshot {
            name: "*heap".to_string(),
            value: *heap,
            address: heap as *const i32 as usize,
        },
    ]
}

fn print_cells(out: &mut FdSink, cells: &[CellSnapshot]) -> Result<()> {
    for cell in cells {
        writeln!(out, "{}", cell)?;
    }
    Ok(())
}

fn increment(stack: &mut i32, heap: &mut i32) {
    GLOBAL.fetch_add(1, Ordering::SeqCst);
    *stack += 1;
    *heap += 1;
}

/// Forks with a global, a stack and a heap integer live, then shows that
/// the child's increments never reach the parent even though every
/// address is the same on both sides.
#[derive(Debug, Default)]
pub struct CowDemo;

impl CowDemo {
    pub fn new() -> Self {
        Self
    }
}

impl Demo for CowDemo {
    fn name(&self) -> &'static str {
        "cow-fork"
    }

    fn run(&mut self, out: &mut FdSink) -> Result<DemoOutcome> {
        GLOBAL.store(0, Ordering::SeqCst);
        let mut stack: i32 = 0;
        let mut heap: Box<i32> = Box::new(0);

        let initial = snapshot(&stack, &heap);
        writeln!(out, "Initial values:")?;
        print_cells(out, &initial)?;

        // The child reports what it saw back over a pipe as JSON.
        let (report_rx, report_tx) =
            nix::unistd::pipe().map_err(|e| LabError::sys("pipe failed", e))?;
        let mut report_rx = File::from(report_rx);
        let mut report_tx = File::from(report_tx);

        let (child_pid, child) = fork_and_wait("fork() failed", || {
            increment(&mut stack, &mut heap);

            let cells = snapshot(&stack, &heap);
            writeln!(out, "Child says:")?;
            writeln!(out, "  My pid: {}", getpid())?;
            print_cells(out, &cells)?;

            serde_json::to_writer(&mut report_tx, &cells)?;
            Ok(())
        })?;
        drop(report_tx);
        ensure_success(child_pid, &child)?;

        let mut raw_view = String::new();
        report_rx.read_to_string(&mut raw_view)?;
        let child_view: Vec<CellSnapshot> = serde_json::from_str(&raw_view)?;

        let after_child = snapshot(&stack, &heap);
        writeln!(out, "Parent says:")?;
        writeln!(out, "  My pid: {}", getpid())?;
        print_cells(out, &after_child)?;

        writeln!(out, "Parent increments:")?;
        increment(&mut stack, &mut heap);
        let after_increment = snapshot(&stack, &heap);
        print_cells(out, &after_increment)?;

        Ok(DemoOutcome::Cow(CowReport {
            initial,
            child_view,
            child_pid: child_pid.as_raw(),
            after_child,
            after_increment,
            child,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::tests::fork_guard;
    use std::io::{Seek, SeekFrom};

    fn values(cells: &[CellSnapshot]) -> Vec<i32> {
        cells.iter().map(|c| c.value).collect()
    }

    fn addresses(cells: &[CellSnapshot]) -> Vec<usize> {
        cells.iter().map(|c| c.address).collect()
    }

    #[test]
    fn test_cell_display_format() {
        let cell = CellSnapshot {
            name: "stack".to_string(),
            value: 1,
            address: 0x7ffe_1234,
        };
        assert_eq!(cell.to_string(), "  stack = 1 (0x7ffe1234)");
    }

    #[test]
    fn test_child_changes_stay_in_the_child() {
        let _guard = fork_guard();
        let mut file = tempfile::tempfile().unwrap();
        let mut out = FdSink::from_file(file.try_clone().unwrap());

        let outcome = CowDemo::new().run(&mut out).unwrap();
        let report = match outcome {
            DemoOutcome::Cow(report) => report,
            other => panic!("unexpected outcome: {:?}", other),
        };

        let start = values(&report.initial);
        assert_eq!(start, [0, 0, 0]);
        let bumped = vec![1, 1, 1];

        assert!(report.child.success());
        assert_eq!(values(&report.child_view), bumped);
        assert_eq!(values(&report.after_child), start);
        assert_eq!(values(&report.after_increment), bumped);

        assert_eq!(addresses(&report.child_view), addresses(&report.initial));
        assert_eq!(addresses(&report.after_increment), addresses(&report.initial));

        let mut text = String::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_string(&mut text).unwrap();
        let headings: Vec<&str> = text.lines().filter(|l| !l.starts_with("  ")).collect();
        assert_eq!(
            headings,
            ["Initial values:", "Child says:", "Parent says:", "Parent increments:"]
        );
        assert!(text.contains(&format!("  My pid: {}", report.child_pid)));
        assert!(text.contains(&format!("  My pid: {}", std::process::id())));
    }

    #[test]
    fn test_second_run_starts_from_zero() {
        let _guard = fork_guard();
        let mut out = FdSink::from_file(tempfile::tempfile().unwrap());

        CowDemo::new().run(&mut out).unwrap();
        let outcome = CowDemo::new().run(&mut out).unwrap();

        match outcome {
            DemoOutcome::Cow(report) => {
                assert_eq!(values(&report.initial), [0, 0, 0]);
                assert_eq!(values(&report.child_view), [1, 1, 1]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}

use anyhow::Result;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn run(bin: &str, args: &[&str]) -> Result<Output> {
    Ok(Command::new(bin)
        .args(args)
        .env("RUST_LOG", "off")
        .output()?)
}

fn numbered_file(count: usize) -> Result<NamedTempFile> {
    let file = NamedTempFile::new()?;
    let text: String = (1..=count).map(|i| format!("line {}\n", i)).collect();
    std::fs::write(file.path(), text)?;
    Ok(file)
}

#[test]
fn test_fd_interleaved_prints_three_turns() -> Result<()> {
    let input = numbered_file(15)?;
    let output = run(
        env!("CARGO_BIN_EXE_fd-interleaved"),
        &[input.path().to_str().unwrap()],
    )?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 15);
    assert_eq!(lines[0], "parent: line 1");
    assert_eq!(lines[5], " child: line 6");
    assert_eq!(lines[14], "parent: line 15");
    Ok(())
}

#[test]
fn test_streams_interleaved_repeats_child_lines() -> Result<()> {
    let input = numbered_file(15)?;
    let output = run(
        env!("CARGO_BIN_EXE_streams-interleaved"),
        &[input.path().to_str().unwrap()],
    )?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[5], " child: line 6");
    assert_eq!(lines[10], "parent: line 6");
    Ok(())
}

#[test]
fn test_missing_file_argument_exits_with_one() -> Result<()> {
    let output = run(env!("CARGO_BIN_EXE_fd-interleaved"), &[])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_unreadable_file_reports_open_error() -> Result<()> {
    let output = run(
        env!("CARGO_BIN_EXE_streams-interleaved"),
        &["/no/such/file.txt"],
    )?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("fopen error"), "stderr: {}", stderr);
    Ok(())
}

#[test]
fn test_cow_fork_output_order() -> Result<()> {
    let output = run(env!("CARGO_BIN_EXE_cow-fork"), &[])?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 18);
    assert_eq!(lines[0], "Initial values:");
    assert!(lines[1].starts_with("  global = 0 (0x"));
    assert_eq!(lines[4], "Child says:");
    assert!(lines[6].starts_with("  global = 1 (0x"));
    assert_eq!(lines[9], "Parent says:");
    assert!(lines[11].starts_with("  global = 0 (0x"));
    assert_eq!(lines[14], "Parent increments:");
    assert!(lines[17].starts_with("  *heap = 1 (0x"));

    // Same address on both sides of the fork.
    let address = |line: &str| line.rsplit('(').next().map(str::to_string);
    assert_eq!(address(lines[3]), address(lines[8]));
    assert_eq!(address(lines[3]), address(lines[13]));
    Ok(())
}

#[test]
fn test_thread_recur_bounded_run_reaches_sentinel() -> Result<()> {
    let output = run(
        env!("CARGO_BIN_EXE_thread-recur"),
        &["--thread", "--max-depth", "3"],
    )?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("RLIMIT_STACK"));
    assert_eq!(lines.len(), 3 + 6 + 1);
    assert_eq!(lines[9], "Sentinel");
    Ok(())
}

#[test]
fn test_thread_recur_default_run_overflows_main_thread() -> Result<()> {
    let output = run(env!("CARGO_BIN_EXE_thread-recur"), &[])?;

    assert_eq!(output.status.code(), None);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("RLIMIT_STACK"));
    assert!(lines[1].starts_with("RLIMIT_AS"));
    assert!(lines[2].starts_with("RLIMIT_RSS"));
    assert!(lines[3].starts_with("func (called     1 times): frame at : 0x"));
    assert!(lines.len() > 10);
    assert!(!stdout.contains("Sentinel"));
    Ok(())
}

#[test]
fn test_thread_recur_unbounded_run_dies() -> Result<()> {
    let output = run(env!("CARGO_BIN_EXE_thread-recur"), &["--thread"])?;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), None);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Sentinel"));
    Ok(())
}

#[test]
fn test_umbrella_cli_runs_subcommand() -> Result<()> {
    let input = numbered_file(2)?;
    let output = run(
        env!("CARGO_BIN_EXE_fork-lab"),
        &["fd", input.path().to_str().unwrap(), "-n", "1"],
    )?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "parent: line 1\n child: line 2\n"
    );
    Ok(())
}

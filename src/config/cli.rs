use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Flags every program accepts.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log process memory at each phase
    #[arg(long, global = true)]
    pub monitor: bool,
}

#[derive(Debug, Clone, Args)]
pub struct FileArgs {
    /// File to read from
    pub file: Option<PathBuf>,

    /// Lines read per turn (overrides the config)
    #[arg(short = 'n', long)]
    pub lines: Option<usize>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RecurArgs {
    /// Recurse inside a worker thread instead of the main thread
    #[arg(long)]
    pub thread: bool,

    /// Stop after this many calls instead of overflowing the stack
    #[arg(long)]
    pub max_depth: Option<u64>,

    /// Soft RLIMIT_STACK to install, in bytes (overrides the config)
    #[arg(long)]
    pub stack_limit: Option<u64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interleave reads on a shared file descriptor (unbuffered)
    Fd(FileArgs),
    /// Interleave reads through a buffered stream
    Stream(FileArgs),
    /// Show copy-on-write values and addresses across fork
    Cow,
    /// Print stack limits and recurse until the stack runs out
    Recur(RecurArgs),
}

#[derive(Debug, Parser)]
#[command(name = "fork-lab")]
#[command(about = "Small programs that make fork, file offsets and stack limits visible")]
pub struct LabCli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

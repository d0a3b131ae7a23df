use clap::Parser;
use fork_lab::app;
use fork_lab::config::{Command, CommonArgs, RecurArgs};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "thread-recur")]
#[command(about = "Lower the stack limit, print resource limits and recurse until the stack runs out")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    recur: RecurArgs,
}

fn main() -> ExitCode {
    let args = Args::parse();
    app::main_with(&args.common, Command::Recur(args.recur))
}

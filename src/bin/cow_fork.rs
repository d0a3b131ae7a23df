use clap::Parser;
use fork_lab::app;
use fork_lab::config::{Command, CommonArgs};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cow-fork")]
#[command(about = "Show a global, a stack and a heap integer diverging across fork")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> ExitCode {
    let args = Args::parse();
    app::main_with(&args.common, Command::Cow)
}

use clap::Parser;
use fork_lab::app;
use fork_lab::config::{Command, CommonArgs, FileArgs};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fd-interleaved")]
#[command(about = "Read a file in turns with a forked child through one raw file descriptor")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    file: FileArgs,
}

fn main() -> ExitCode {
    let args = Args::parse();
    app::main_with(&args.common, Command::Fd(args.file))
}

use clap::Parser;
use fork_lab::{app, LabCli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = LabCli::parse();
    app::main_with(&cli.common, cli.command)
}

//! Glue shared by the binaries: logging, config, overrides and exit codes.

use crate::config::{Command, CommonArgs, FileArgs, LabConfig};
use crate::core::cow::CowDemo;
use crate::core::interleave::{InterleaveDemo, ReaderKind};
use crate::core::recursion::RecursionDemo;
use crate::core::runner::DemoRunner;
use crate::core::sink::FdSink;
use crate::core::{Demo, DemoOutcome};
use crate::utils::error::LabError;
use crate::utils::logger;
use crate::utils::validation::{self, Validate};
use anyhow::Context;
use std::path::PathBuf;
use std::process::ExitCode;

pub fn init_logging(common: &CommonArgs) {
    if common.json_logs {
        logger::init_json_logger(common.verbose);
    } else {
        logger::init_cli_logger(common.verbose);
    }
}

/// Loads the config file (if any) and folds command-line overrides into it.
pub fn resolve_config(common: &CommonArgs, command: &Command) -> anyhow::Result<LabConfig> {
    let mut config =
        LabConfig::load(common.config.as_deref()).context("failed to load configuration")?;

    if common.monitor {
        config.monitoring.enabled = true;
    }

    match command {
        Command::Fd(args) | Command::Stream(args) => {
            if let Some(lines) = args.lines {
                config.interleave.lines_per_turn = lines;
            }
        }
        Command::Recur(args) => {
            if args.thread {
                config.recursion.worker_thread = true;
            }
            if let Some(depth) = args.max_depth {
                config.recursion.max_depth = Some(depth);
            }
            if let Some(bytes) = args.stack_limit {
                config.recursion.stack_limit_bytes = bytes;
            }
        }
        Command::Cow => {}
    }

    config.validate()?;
    tracing::debug!("resolved config: {:?}", config);
    Ok(config)
}

fn require_file(args: &FileArgs) -> Result<PathBuf, LabError> {
    let path = args.file.clone().ok_or_else(|| LabError::MissingArgumentError {
        field: "FILE".to_string(),
    })?;
    validation::validate_path("FILE", &path.to_string_lossy())?;
    Ok(path)
}

fn run_demo<D: Demo>(demo: D, monitor: bool, out: &mut FdSink) -> anyhow::Result<DemoOutcome> {
    let mut runner = DemoRunner::new_with_monitoring(demo, monitor);
    Ok(runner.run(out)?)
}

pub fn run(common: &CommonArgs, command: Command) -> anyhow::Result<DemoOutcome> {
    let config = resolve_config(common, &command)?;
    let monitor = config.monitoring.enabled;
    let mut out = FdSink::stdout().context("failed to duplicate stdout")?;

    match command {
        Command::Fd(args) => {
            let path = require_file(&args)?;
            let demo = InterleaveDemo::new(path, ReaderKind::RawFd, config.interleave);
            run_demo(demo, monitor, &mut out)
        }
        Command::Stream(args) => {
            let path = require_file(&args)?;
            let demo = InterleaveDemo::new(path, ReaderKind::Buffered, config.interleave);
            run_demo(demo, monitor, &mut out)
        }
        Command::Cow => run_demo(CowDemo::new(), monitor, &mut out),
        Command::Recur(_) => run_demo(RecursionDemo::new(config.recursion), monitor, &mut out),
    }
}

/// Runs `command` and maps any failure to exit status 1.
pub fn main_with(common: &CommonArgs, command: Command) -> ExitCode {
    init_logging(common);

    match run(common, command) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<LabError>() {
                Some(lab) => {
                    tracing::error!("❌ {} (Category: {:?})", lab, lab.category());
                    tracing::error!("💡 Suggestion: {}", lab.recovery_suggestion());
                    eprintln!("{}", lab.user_friendly_message());
                }
                None => {
                    tracing::error!("❌ {:#}", e);
                    eprintln!("{:#}", e);
                }
            }
            ExitCode::FAILURE
        }
    }
}

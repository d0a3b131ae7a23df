#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Command, CommonArgs, LabCli};

pub use config::LabConfig;
pub use crate::core::{runner::DemoRunner, sink::FdSink};
pub use domain::model::DemoOutcome;
pub use utils::error::{LabError, Result};

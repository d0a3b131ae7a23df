#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{Command, CommonArgs, FileArgs, LabCli, RecurArgs};
pub use toml_config::{InterleaveSection, LabConfig, MonitoringSection, RecursionSection};

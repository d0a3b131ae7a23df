use nix::errno::Errno;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{context}: {source}")]
    SysError {
        context: String,
        #[source]
        source: Errno,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required argument: {field}")]
    MissingArgumentError { field: String },

    #[error("pthread_create error: {0}")]
    ThreadSpawnError(std::io::Error),

    #[error("Worker thread panicked: {message}")]
    WorkerPanicError { message: String },

    #[error("Child process {pid} failed: {status}")]
    ChildFailedError { pid: i32, status: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    System,
    Configuration,
    Process,
}

impl LabError {
    /// Wraps an errno with the name of the call that produced it.
    pub fn sys(context: impl Into<String>, source: Errno) -> Self {
        LabError::SysError {
            context: context.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        LabError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LabError::IoError(_) | LabError::SysError { .. } => ErrorCategory::System,
            LabError::SerializationError(_)
            | LabError::ConfigError { .. }
            | LabError::InvalidConfigValueError { .. }
            | LabError::MissingArgumentError { .. } => ErrorCategory::Configuration,
            LabError::ThreadSpawnError(_)
            | LabError::WorkerPanicError { .. }
            | LabError::ChildFailedError { .. } => ErrorCategory::Process,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LabError::SysError { context, source } => format!("{}: {}", context, source.desc()),
            LabError::MissingArgumentError { field } => {
                format!("{} is required", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LabError::IoError(_) => "Check that the file exists and is readable",
            LabError::SysError { source, .. } => match source {
                Errno::ENOENT => "Check that the file exists",
                Errno::EACCES | Errno::EPERM => {
                    "Check permissions; raising a hard limit needs privileges"
                }
                Errno::EAGAIN | Errno::ENOMEM => {
                    "The system is out of processes or memory; try again later"
                }
                Errno::EINVAL => "The requested value is outside what the kernel accepts",
                _ => "Inspect the system call error above",
            },
            LabError::SerializationError(_) | LabError::ConfigError { .. } => {
                "Make sure the config file is valid TOML"
            }
            LabError::InvalidConfigValueError { .. } => "Fix the highlighted config value",
            LabError::MissingArgumentError { .. } => "Pass a file name as the first argument",
            LabError::ThreadSpawnError(_) => "Lower the worker stack size or free some memory",
            LabError::WorkerPanicError { .. } => "Run with --verbose to see the worker's log",
            LabError::ChildFailedError { .. } => "Run with --verbose to see the child's log",
        }
    }
}

pub type Result<T> = std::result::Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sys_error_display_keeps_context() {
        let err = LabError::sys("open failed", Errno::ENOENT);
        assert!(err.to_string().starts_with("open failed: "));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.recovery_suggestion(), "Check that the file exists");
    }

    #[test]
    fn test_missing_argument_is_configuration() {
        let err = LabError::MissingArgumentError {
            field: "FILE".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.user_friendly_message(), "FILE is required");
    }
}

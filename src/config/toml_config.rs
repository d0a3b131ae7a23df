use crate::utils::error::{LabError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LINES_PER_TURN: usize = 5;
pub const DEFAULT_STACK_LIMIT_BYTES: u64 = 64 * 1024;
const MIN_STACK_LIMIT_BYTES: u64 = 16 * 1024;
const MAX_STACK_LIMIT_BYTES: u64 = 1 << 30;

/// Settings shared by every program. Each section falls back to the
/// values the programs use when run with no config at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub interleave: InterleaveSection,
    pub recursion: RecursionSection,
    pub monitoring: MonitoringSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterleaveSection {
    pub lines_per_turn: usize,
    pub parent_prefix: String,
    pub child_prefix: String,
}

impl Default for InterleaveSection {
    fn default() -> Self {
        Self {
            lines_per_turn: DEFAULT_LINES_PER_TURN,
            parent_prefix: "parent".to_string(),
            child_prefix: " child".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecursionSection {
    pub stack_limit_bytes: u64,
    pub worker_thread: bool,
    pub max_depth: Option<u64>,
}

impl Default for RecursionSection {
    fn default() -> Self {
        Self {
            stack_limit_bytes: DEFAULT_STACK_LIMIT_BYTES,
            worker_thread: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl LabConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LabError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| LabError::config(format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are
    /// left in place.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| LabError::config(format!("bad substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

impl Validate for InterleaveSection {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number("interleave.lines_per_turn", self.lines_per_turn, 1)?;
        validation::validate_non_empty_string("interleave.parent_prefix", &self.parent_prefix)?;
        validation::validate_non_empty_string("interleave.child_prefix", &self.child_prefix)?;
        Ok(())
    }
}

impl Validate for RecursionSection {
    fn validate(&self) -> Result<()> {
        validation::validate_range(
            "recursion.stack_limit_bytes",
            self.stack_limit_bytes,
            MIN_STACK_LIMIT_BYTES,
            MAX_STACK_LIMIT_BYTES,
        )?;
        if let Some(depth) = self.max_depth {
            validation::validate_positive_number("recursion.max_depth", depth as usize, 1)?;
        }
        Ok(())
    }
}

impl Validate for LabConfig {
    fn validate(&self) -> Result<()> {
        self.interleave.validate()?;
        self.recursion.validate()
    }
}

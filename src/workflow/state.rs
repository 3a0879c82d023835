use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    InProgress,
    /// Quality gate met.
    Success,
    /// Quality gate not met, or a stage could not do its job.
    Failed,
    /// The run ended in an unanticipated error.
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InProgress => "IN_PROGRESS",
            Status::Success => "SUCCESS",
            Status::Failed => "FAILED",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the stages know about one file's repair.
///
/// Stages never mutate a state in place: each takes the current value by
/// reference and returns the next one, so the driver always holds the last
/// complete state even when a stage fails.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowState {
    pub target_dir: PathBuf,
    /// Relative to `target_dir`.
    pub file_name: PathBuf,
    pub code_content: String,
    pub refactoring_plan: String,
    pub test_results: String,
    pub pylint_report: String,
    /// Completed Fixer passes.
    pub iteration: u32,
    pub status: Status,
}

impl WorkflowState {
    pub fn new(target_dir: &Path, file_name: &Path) -> Self {
        Self {
            target_dir: target_dir.to_path_buf(),
            file_name: file_name.to_path_buf(),
            code_content: String::new(),
            refactoring_plan: String::new(),
            test_results: String::new(),
            pylint_report: String::new(),
            iteration: 0,
            status: Status::InProgress,
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.target_dir.join(&self.file_name)
    }

    pub fn display_name(&self) -> String {
        self.file_name.display().to_string()
    }

    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

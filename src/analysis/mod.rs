pub mod process;
pub mod pylint;
pub mod pytest;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

pub use pylint::PylintRunner;
pub use pytest::PytestRunner;

/// Prefix carried by every transcript of a run that did not complete.
pub const FAILURE_MARKER: &str = "ERROR:";

/// Marker line prepended to the transcript of a passing test run.
pub const ALL_PASSED_MARKER: &str = "✅ All tests passed!";

/// How an external tool invocation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The process ran to completion; a non-zero exit code is still a completion.
    Completed {
        exit_code: Option<i32>,
        output: String,
    },
    /// The program could not be started (missing binary, bad permissions).
    Unavailable(String),
    /// The process was killed after exceeding its time limit.
    TimedOut(Duration),
    /// The process started but could not be waited on, or died from a signal.
    Crashed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Lint,
    Test,
}

/// Structured result of one lint or test run.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReport {
    pub kind: ToolKind,
    pub tool: String,
    pub outcome: ToolOutcome,
}

impl ToolReport {
    pub fn new(kind: ToolKind, tool: &str, outcome: ToolOutcome) -> Self {
        Self {
            kind,
            tool: tool.to_string(),
            outcome,
        }
    }

    /// Completed with exit status zero.
    pub fn succeeded(&self) -> bool {
        matches!(
            self.outcome,
            ToolOutcome::Completed {
                exit_code: Some(0),
                ..
            }
        )
    }

    /// Raw output of a completed run.
    pub fn output(&self) -> Option<&str> {
        match &self.outcome {
            ToolOutcome::Completed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Textual form stored in the workflow state and shown to the agents.
    pub fn transcript(&self) -> String {
        match (&self.outcome, self.kind) {
            (ToolOutcome::Completed { output, .. }, ToolKind::Lint) => output.clone(),
            (ToolOutcome::Completed { exit_code: Some(0), output }, ToolKind::Test) => {
                format!("{ALL_PASSED_MARKER}\n\n{output}")
            }
            (ToolOutcome::Completed { exit_code, output }, ToolKind::Test) => {
                let code = exit_code.map_or_else(|| "unknown".to_string(), |c| c.to_string());
                format!("❌ Tests failed (exit code {code})\n\n{output}")
            }
            (ToolOutcome::Unavailable(detail), _) => {
                format!("{FAILURE_MARKER} {} is not available: {detail}", self.tool)
            }
            (ToolOutcome::TimedOut(limit), _) => format!(
                "{FAILURE_MARKER} {} timed out after {} seconds",
                self.tool,
                limit.as_secs()
            ),
            (ToolOutcome::Crashed(detail), _) => {
                format!("{FAILURE_MARKER} {} crashed: {detail}", self.tool)
            }
        }
    }
}

/// Static analysis over a single source file. Never fails: problems are
/// reported through [`ToolOutcome`].
#[async_trait]
pub trait Linter: Send + Sync {
    async fn lint(&self, path: &Path) -> ToolReport;
}

/// Runs the test file associated with a source file. Same never-fails contract.
#[async_trait]
pub trait TestSuite: Send + Sync {
    async fn run(&self, test_path: &Path) -> ToolReport;
}

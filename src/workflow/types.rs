use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use super::router::Termination;
use super::state::{Status, WorkflowState};
use crate::error::AppError;

/// Where a file's run ended: the last complete state plus how it stopped.
#[derive(Debug)]
pub struct FileRun {
    pub state: WorkflowState,
    /// Stage invocations consumed.
    pub steps: u32,
    pub outcome: std::result::Result<Termination, AppError>,
}

/// Final, immutable summary of one file's run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub file_name: PathBuf,
    pub status: Status,
    pub iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<Termination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRecord {
    pub fn from_run(run: FileRun) -> Self {
        match run.outcome {
            Ok(termination) => Self {
                file_name: run.state.file_name,
                status: run.state.status,
                iterations: run.state.iteration,
                error: termination.detail().map(str::to_string),
                termination: Some(termination),
            },
            Err(e) => Self {
                file_name: run.state.file_name,
                status: Status::Error,
                iterations: run.state.iteration,
                termination: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// The run died without handing back a state.
    pub fn aborted(file_name: PathBuf, error: String) -> Self {
        Self {
            file_name,
            status: Status::Error,
            iterations: 0,
            termination: None,
            error: Some(error),
        }
    }
}

/// Records of a batch in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub records: Vec<ResultRecord>,
}

impl BatchReport {
    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn success_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == Status::Success)
            .count()
    }

    /// `FAILED` and `ERROR` together.
    pub fn failure_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.status, Status::Failed | Status::Error))
            .count()
    }

    /// Per-file lines followed by the totals block.
    pub fn render(&self) -> String {
        let rule = "=".repeat(70);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "FINAL RESULTS");
        let _ = writeln!(out, "{rule}");

        for record in &self.records {
            let mark = if record.status == Status::Success { "✅" } else { "❌" };
            let _ = write!(
                out,
                "{mark} {}: {} (Iterations: {})",
                record.file_name.display(),
                record.status,
                record.iterations
            );
            if let Some(error) = &record.error {
                let _ = write!(out, " - {error}");
            }
            out.push('\n');
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "✅ Success: {}/{}", self.success_count(), self.total());
        let _ = writeln!(out, "❌ Failed:  {}/{}", self.failure_count(), self.total());
        let _ = writeln!(out, "{rule}");
        out
    }
}

use serde::Serialize;

use super::state::{Status, WorkflowState};

/// Why a file's run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// The Judge's quality gate passed.
    QualityGatePassed,
    /// The fail-safe: the iteration cap was reached without passing.
    IterationCapReached,
    /// The Auditor could not read the file or obtain a plan.
    AuditFailed { detail: String },
    /// The Fixer could not persist its rewrite.
    WriteFailed { detail: String },
}

impl Termination {
    pub fn detail(&self) -> Option<&str> {
        match self {
            Termination::AuditFailed { detail } | Termination::WriteFailed { detail } => {
                Some(detail)
            }
            _ => None,
        }
    }
}

/// Result of the Auditor and Fixer stages, which otherwise follow fixed edges.
#[derive(Debug)]
pub enum Transition {
    Advance(WorkflowState),
    Halt(WorkflowState, Termination),
}

/// Decision taken after every Judge pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Back to the Fixer for another attempt.
    Continue,
    Terminate(Termination),
}

/// Success ends the run outright; otherwise the iteration cap is checked
/// regardless of status, and anything below it loops back to the Fixer.
pub fn route(state: &WorkflowState, max_iterations: u32) -> Route {
    if state.status == Status::Success {
        tracing::info!(
            file = %state.display_name(),
            iterations = state.iteration,
            "Quality gate passed"
        );
        return Route::Terminate(Termination::QualityGatePassed);
    }

    if state.iteration >= max_iterations {
        tracing::warn!(
            file = %state.display_name(),
            max_iterations,
            status = %state.status,
            "Fail-safe: iteration cap reached"
        );
        return Route::Terminate(Termination::IterationCapReached);
    }

    tracing::info!(
        file = %state.display_name(),
        iteration = state.iteration,
        max_iterations,
        "Retrying: looping back to the Fixer"
    );
    Route::Continue
}

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::agent::AgentContext;
use crate::interaction_log::{ActionKind, Interaction};
use crate::workflow::gate::{gate, Evidence};
use crate::workflow::router::{route, Route};
use crate::workflow::state::{Status, WorkflowState};

const AGENT_NAME: &str = "Judge";

/// Test file exercising `file_name`, relative to the same directory.
///
/// A `test_*` file is its own test target; anything else is tested by the
/// `test_`-prefixed sibling with the same name.
pub fn test_file_for(file_name: &Path) -> PathBuf {
    let name = file_name
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name.starts_with("test_") {
        file_name.to_path_buf()
    } else {
        file_name.with_file_name(format!("test_{name}"))
    }
}

/// Run the tests and the linter against the rewritten file, apply the quality
/// gate, and decide where the workflow goes next.
///
/// Never touches `iteration` and never calls the backend.
pub async fn run(ctx: &AgentContext, state: &WorkflowState) -> (WorkflowState, Route) {
    let file = state.display_name();
    tracing::info!(file = %file, iteration = state.iteration, "Judge: validating fixes");

    let test_path = state.target_dir.join(test_file_for(&state.file_name));
    let tests = ctx.test_suite.run(&test_path).await;
    let lint = ctx.linter.lint(&state.file_path()).await;

    let evidence = Evidence::collect(ctx.workflow.gate_strategy, &tests, &lint);
    let status = gate(
        evidence.tests_passed,
        evidence.lint_score,
        ctx.workflow.min_lint_score,
    );

    match (status, evidence.tests_passed) {
        (Status::Success, _) => {
            tracing::info!(file = %file, score = ?evidence.lint_score, "Judge: tests pass and quality is acceptable");
        }
        (_, false) => {
            tracing::warn!(file = %file, "Judge: tests failed");
        }
        (_, true) => {
            tracing::warn!(
                file = %file,
                score = ?evidence.lint_score,
                min_score = ctx.workflow.min_lint_score,
                "Judge: lint score too low"
            );
        }
    }

    let next = WorkflowState {
        test_results: tests.transcript(),
        pylint_report: lint.transcript(),
        status,
        ..state.clone()
    };

    ctx.log
        .record(Interaction::new(
            AGENT_NAME,
            ctx.backend.model(),
            ActionKind::Debug,
            json!({
                "input_prompt": format!("Validating {file} at iteration {}", next.iteration),
                "output_response": format!(
                    "Tests passed: {}, Lint score: {:?}",
                    evidence.tests_passed, evidence.lint_score
                ),
                "test_file": test_path.display().to_string(),
                "test_results": next.test_results,
                "pylint_report": next.pylint_report,
                "file_validated": file,
                "iteration": next.iteration,
                "tests_passed": evidence.tests_passed,
                "pylint_score": evidence.lint_score,
            }),
            status.as_str(),
        ))
        .await;

    let decision = route(&next, ctx.workflow.max_iterations);
    (next, decision)
}

use serde_json::json;

use crate::agent::{prompt, AgentContext};
use crate::error::Result;
use crate::interaction_log::{ActionKind, Interaction};
use crate::workflow::gate::parse_lint_score;
use crate::workflow::router::{Termination, Transition};
use crate::workflow::state::{Status, WorkflowState};

const AGENT_NAME: &str = "Auditor";

/// Read the file, lint it and ask the backend for a remediation plan.
///
/// Never writes to disk. A file that cannot be read or a backend failure
/// halts the run with `FAILED`; only sandbox violations are returned as errors.
pub async fn run(ctx: &AgentContext, state: &WorkflowState) -> Result<Transition> {
    let file = state.display_name();
    tracing::info!(file = %file, "Auditor: analyzing file");

    let path = state.file_path();
    let code = match ctx.sandbox.read(&path).await {
        Ok(code) => code,
        Err(e) if e.is_security_violation() => return Err(e),
        Err(e) => {
            tracing::error!(file = %file, error = %e, "Auditor: failed to read file");
            return Ok(Transition::Halt(
                state.with_status(Status::Failed),
                Termination::AuditFailed {
                    detail: format!("Failed to read file: {e}"),
                },
            ));
        }
    };

    let lint = ctx.linter.lint(&path).await;
    let lint_report = lint.transcript();

    let input = prompt::auditor_input(&file, &lint_report, &code, &ctx.workflow.language);

    let reply = ctx
        .backend
        .complete(prompt::AUDITOR_SYSTEM, &input, ctx.workflow.auditor_temperature)
        .await;

    let read_state = WorkflowState {
        code_content: code,
        pylint_report: lint_report,
        ..state.clone()
    };

    match reply {
        Ok(plan) => {
            ctx.log
                .record(Interaction::new(
                    AGENT_NAME,
                    ctx.backend.model(),
                    ActionKind::Analysis,
                    json!({
                        "input_prompt": input,
                        "output_response": plan,
                        "file_analyzed": file,
                        "pylint_score": parse_lint_score(&read_state.pylint_report),
                    }),
                    "SUCCESS",
                ))
                .await;

            tracing::info!(file = %file, plan_len = plan.len(), "Auditor: analysis complete");
            Ok(Transition::Advance(WorkflowState {
                refactoring_plan: plan,
                ..read_state
            }))
        }
        Err(e) => {
            tracing::error!(file = %file, error = %e, "Auditor: backend call failed");
            ctx.log
                .record(Interaction::new(
                    AGENT_NAME,
                    ctx.backend.model(),
                    ActionKind::Analysis,
                    json!({
                        "input_prompt": input,
                        "output_response": format!("LLM call failed: {e}"),
                        "file_analyzed": file,
                        "error": e.to_string(),
                    }),
                    "FAILURE",
                ))
                .await;

            Ok(Transition::Halt(
                read_state.with_status(Status::Failed),
                Termination::AuditFailed {
                    detail: format!("LLM call failed: {e}"),
                },
            ))
        }
    }
}

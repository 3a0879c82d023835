use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::agent::prompt::{self, FixerInput};
use crate::agent::AgentContext;
use crate::error::Result;
use crate::interaction_log::{ActionKind, Interaction};
use crate::workflow::router::{Termination, Transition};
use crate::workflow::state::{Status, WorkflowState};

const AGENT_NAME: &str = "Fixer";

/// Ask the backend for a corrected file and persist it.
///
/// The new code and the iteration bump are applied together, and only after
/// the write succeeded. A backend failure marks the state `FAILED` and lets
/// the Judge re-evaluate the unchanged file; a write failure halts the run.
pub async fn run(ctx: &AgentContext, state: &WorkflowState) -> Result<Transition> {
    let file = state.display_name();
    let attempt = state.iteration + 1;
    tracing::info!(
        file = %file,
        attempt,
        max_iterations = ctx.workflow.max_iterations,
        "Fixer: applying fixes"
    );

    let input = prompt::fixer_input(&FixerInput {
        file_name: &file,
        code: &state.code_content,
        plan: &state.refactoring_plan,
        test_results: &state.test_results,
        lint_report: &state.pylint_report,
        attempt,
        max_attempts: ctx.workflow.max_iterations,
        language: &ctx.workflow.language,
    });

    let reply = match ctx
        .backend
        .complete(prompt::FIXER_SYSTEM, &input, ctx.workflow.fixer_temperature)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(file = %file, attempt, error = %e, "Fixer: backend call failed");
            log_failure(ctx, &file, attempt, &input, &e.to_string()).await;
            return Ok(Transition::Advance(state.with_status(Status::Failed)));
        }
    };

    let fixed = extract_code(&reply, &ctx.workflow.language);

    if let Err(e) = ctx.sandbox.write(&state.file_path(), &fixed).await {
        if e.is_security_violation() {
            return Err(e);
        }
        tracing::error!(file = %file, error = %e, "Fixer: failed to write fixed code");
        log_failure(ctx, &file, attempt, &input, &e.to_string()).await;
        return Ok(Transition::Halt(
            state.with_status(Status::Failed),
            Termination::WriteFailed {
                detail: format!("Failed to write fixed code: {e}"),
            },
        ));
    }

    ctx.log
        .record(Interaction::new(
            AGENT_NAME,
            ctx.backend.model(),
            ActionKind::Fix,
            json!({
                "input_prompt": input,
                "output_response": reply,
                "file_fixed": file,
                "iteration": attempt,
                "code_length": fixed.len(),
            }),
            "SUCCESS",
        ))
        .await;

    tracing::info!(file = %file, iteration = attempt, "Fixer: wrote fixed code");
    Ok(Transition::Advance(WorkflowState {
        code_content: fixed,
        iteration: attempt,
        ..state.clone()
    }))
}

async fn log_failure(ctx: &AgentContext, file: &str, attempt: u32, input: &str, error: &str) {
    ctx.log
        .record(Interaction::new(
            AGENT_NAME,
            ctx.backend.model(),
            ActionKind::Fix,
            json!({
                "input_prompt": input,
                "output_response": format!("LLM call or file write failed: {error}"),
                "file_fixed": file,
                "iteration": attempt,
                "error": error,
            }),
            "FAILURE",
        ))
        .await;
}

/// Any fence: the opener line, including whatever tag it carries, is skipped.
static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").expect("valid fence pattern"));

/// Pull source text out of a model reply.
///
/// Prefers a fence tagged exactly with `language`, then any fence, and
/// otherwise takes the whole reply. An unterminated fence falls through to
/// the next rule.
pub fn extract_code(reply: &str, language: &str) -> String {
    let tagged = Regex::new(&format!(
        r"(?s)```{}[ \t]*\n(.*?)```",
        regex::escape(language)
    ));
    if let Some(code) = tagged.ok().and_then(|re| fenced_block(&re, reply)) {
        return code;
    }
    if let Some(code) = fenced_block(&ANY_FENCE, reply) {
        return code;
    }
    reply.trim().to_string()
}

fn fenced_block(fence: &Regex, reply: &str) -> Option<String> {
    let body = fence.captures(reply)?.get(1)?;
    Some(body.as_str().trim().to_string())
}

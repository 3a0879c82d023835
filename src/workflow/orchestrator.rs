use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agent::{auditor, fixer, judge, AgentContext};
use crate::error::AppError;
use crate::workflow::router::{Route, Transition};
use crate::workflow::state::WorkflowState;
use crate::workflow::types::{BatchReport, FileRun, ResultRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Auditing,
    Fixing,
    Judging,
}

/// Drives Auditor -> Fixer -> Judge -> (Fixer | end) for one file at a time.
pub struct Orchestrator {
    ctx: AgentContext,
}

impl Orchestrator {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }

    /// Run one file's state machine to a terminal state.
    ///
    /// Two independent bounds apply: the Judge's routing stops at
    /// `max_iterations` completed Fixer passes, and the driver itself stops
    /// after `step_limit` stage invocations whatever the routing says.
    pub async fn run_file(&self, target_dir: &Path, file_name: &Path) -> FileRun {
        let limit = self.ctx.workflow.step_limit;
        let mut state = WorkflowState::new(target_dir, file_name);
        let mut stage = Stage::Auditing;
        let mut steps = 0u32;

        let outcome = loop {
            if steps >= limit {
                tracing::error!(file = %state.display_name(), limit, "Step budget exhausted");
                break Err(AppError::StepBudgetExceeded(limit));
            }
            steps += 1;
            tracing::debug!(file = %state.display_name(), step = steps, stage = ?stage, "Entering stage");

            match stage {
                Stage::Auditing | Stage::Fixing => {
                    let transition = if stage == Stage::Auditing {
                        auditor::run(&self.ctx, &state).await
                    } else {
                        fixer::run(&self.ctx, &state).await
                    };

                    match transition {
                        Ok(Transition::Advance(next)) => {
                            state = next;
                            stage = if stage == Stage::Auditing {
                                Stage::Fixing
                            } else {
                                Stage::Judging
                            };
                        }
                        Ok(Transition::Halt(next, reason)) => {
                            state = next;
                            break Ok(reason);
                        }
                        Err(e) => break Err(e),
                    }
                }
                Stage::Judging => {
                    let (next, decision) = judge::run(&self.ctx, &state).await;
                    state = next;
                    match decision {
                        Route::Continue => stage = Stage::Fixing,
                        Route::Terminate(reason) => break Ok(reason),
                    }
                }
            }
        };

        FileRun {
            state,
            steps,
            outcome,
        }
    }

    /// Process `files` strictly one after another.
    ///
    /// Each file runs on its own task that is awaited before the next one
    /// starts, so a panic is contained to that file. Errors and panics become
    /// `ERROR` records; the batch always reaches the end of the list.
    pub async fn run_batch(self: &Arc<Self>, target_dir: &Path, files: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, file) in files.iter().enumerate() {
            tracing::info!(
                file = %file.display(),
                position = index + 1,
                total = files.len(),
                "Processing file"
            );

            let this = Arc::clone(self);
            let dir = target_dir.to_path_buf();
            let name = file.clone();
            let joined = tokio::spawn(async move { this.run_file(&dir, &name).await }).await;

            let record = match joined {
                Ok(run) => {
                    if let Err(e) = &run.outcome {
                        tracing::error!(file = %file.display(), error = %e, "File run failed");
                    }
                    ResultRecord::from_run(run)
                }
                Err(e) => {
                    tracing::error!(file = %file.display(), error = %e, "File run panicked");
                    ResultRecord::aborted(file.clone(), format!("Processing task failed: {e}"))
                }
            };

            tracing::info!(
                file = %record.file_name.display(),
                status = %record.status,
                iterations = record.iterations,
                "File finished"
            );
            report.push(record);
        }

        report
    }
}

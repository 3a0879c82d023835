pub mod auditor;
pub mod claude;
pub mod fixer;
pub mod judge;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;

use crate::analysis::{Linter, TestSuite};
use crate::config::WorkflowConfig;
use crate::error::Result;
use crate::interaction_log::InteractionLog;
use crate::workspace::Sandbox;

/// Generative backend shared by the Auditor and the Fixer.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Identifier recorded in the interaction log.
    fn model(&self) -> &str;

    /// One system role, one user message, one text reply.
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String>;
}

/// Collaborators and settings every stage runs against.
pub struct AgentContext {
    pub sandbox: Sandbox,
    pub backend: Arc<dyn Backend>,
    pub linter: Arc<dyn Linter>,
    pub test_suite: Arc<dyn TestSuite>,
    pub log: Arc<dyn InteractionLog>,
    pub workflow: WorkflowConfig,
}

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::process::run_command;
use super::{TestSuite, ToolKind, ToolReport};
use crate::config::ToolsConfig;

/// Runs a test file with an external test runner (pytest by default).
pub struct PytestRunner {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl PytestRunner {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            command: config.test_command.clone(),
            args: config.test_args.clone(),
            timeout: Duration::from_secs(config.test_timeout_secs),
        }
    }
}

#[async_trait]
impl TestSuite for PytestRunner {
    async fn run(&self, test_path: &Path) -> ToolReport {
        // Run beside the test so `import module` resolves to the sibling file
        let working_dir = test_path.parent().unwrap_or(Path::new("."));
        let mut args = self.args.clone();
        args.push(test_path.display().to_string());

        tracing::info!(test = %test_path.display(), tool = %self.command, "Running tests");
        let outcome = run_command(&self.command, &args, working_dir, self.timeout).await;
        ToolReport::new(ToolKind::Test, &self.command, outcome)
    }
}

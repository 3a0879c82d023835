use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::process::run_command;
use super::{Linter, ToolKind, ToolReport};
use crate::config::ToolsConfig;

/// Lints one file with an external linter (pylint by default).
pub struct PylintRunner {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl PylintRunner {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            command: config.lint_command.clone(),
            args: config.lint_args.clone(),
            timeout: Duration::from_secs(config.lint_timeout_secs),
        }
    }
}

#[async_trait]
impl Linter for PylintRunner {
    async fn lint(&self, path: &Path) -> ToolReport {
        let working_dir = path.parent().unwrap_or(Path::new("."));
        let mut args = self.args.clone();
        args.push(path.display().to_string());

        tracing::info!(file = %path.display(), tool = %self.command, "Running lint analysis");
        let outcome = run_command(&self.command, &args, working_dir, self.timeout).await;
        ToolReport::new(ToolKind::Lint, &self.command, outcome)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::analysis::{ToolOutcome, FAILURE_MARKER};

    #[tokio::test]
    async fn test_missing_linter_degrades_to_text() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("module.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let config = ToolsConfig {
            lint_command: "no-such-linter-installed".to_string(),
            ..ToolsConfig::default()
        };
        let report = PylintRunner::new(&config).lint(&file).await;

        assert!(matches!(report.outcome, ToolOutcome::Unavailable(_)));
        assert!(report.transcript().starts_with(FAILURE_MARKER));
    }

    #[tokio::test]
    async fn test_file_path_is_passed_last() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("module.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        let config = ToolsConfig {
            lint_command: "echo".to_string(),
            lint_args: vec!["--score=y".to_string()],
            ..ToolsConfig::default()
        };
        let report = PylintRunner::new(&config).lint(&file).await;

        let output = report.output().unwrap();
        assert!(output.starts_with("--score=y"));
        assert!(output.trim_end().ends_with("module.py"));
    }
}

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::state::Status;
use crate::analysis::{ToolReport, ALL_PASSED_MARKER};

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rated at\s+(-?\d+(?:\.\d+)?)\s*/\s*10").expect("valid score pattern")
});

/// How the Judge reads tool results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStrategy {
    /// Tests pass iff the runner completed with exit status zero; the lint
    /// score is only read from a completed lint run.
    #[default]
    Structured,
    /// Scan the textual transcripts: the all-passed marker or the word
    /// "passed" anywhere counts as passing.
    MarkerScan,
}

/// Evidence the gate decides on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evidence {
    pub tests_passed: bool,
    pub lint_score: Option<f64>,
}

impl Evidence {
    pub fn collect(strategy: GateStrategy, tests: &ToolReport, lint: &ToolReport) -> Self {
        match strategy {
            GateStrategy::Structured => Self {
                tests_passed: tests.succeeded(),
                lint_score: lint.output().and_then(parse_lint_score),
            },
            GateStrategy::MarkerScan => Self {
                tests_passed: transcript_reports_pass(&tests.transcript()),
                lint_score: parse_lint_score(&lint.transcript()),
            },
        }
    }
}

/// Substring scan kept for transcripts produced by older runners.
pub fn transcript_reports_pass(transcript: &str) -> bool {
    transcript.contains(ALL_PASSED_MARKER) || transcript.to_lowercase().contains("passed")
}

/// Pull `X` out of "Your code has been rated at X/10".
pub fn parse_lint_score(report: &str) -> Option<f64> {
    SCORE_RE
        .captures(report)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A missing score is neutral; only a parsed score below `min_score` fails.
pub fn gate(tests_passed: bool, score: Option<f64>, min_score: f64) -> Status {
    let score_ok = score.map_or(true, |s| s >= min_score);
    if tests_passed && score_ok {
        Status::Success
    } else {
        Status::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ToolKind, ToolOutcome};
    use std::time::Duration;

    #[test]
    fn test_gate_truth_table() {
        assert_eq!(gate(true, None, 7.0), Status::Success);
        assert_eq!(gate(true, Some(6.99), 7.0), Status::Failed);
        assert_eq!(gate(true, Some(7.0), 7.0), Status::Success);
        assert_eq!(gate(false, Some(10.0), 7.0), Status::Failed);
        assert_eq!(gate(false, None, 7.0), Status::Failed);
    }

    #[test]
    fn test_parse_lint_score() {
        let report = "************* Module calc\n\
                      calc.py:1:0: C0114: Missing module docstring\n\n\
                      ------------------------------------------------------------------\n\
                      Your code has been rated at 8.50/10 (previous run: 7.00/10, +1.50)";
        assert_eq!(parse_lint_score(report), Some(8.5));
        assert_eq!(parse_lint_score("rated at 10/10"), Some(10.0));
        assert_eq!(parse_lint_score("rated at -3.20/10"), Some(-3.2));
        assert_eq!(parse_lint_score("no score here"), None);
        assert_eq!(parse_lint_score("rated at banana/10"), None);
    }

    fn tests_report(outcome: ToolOutcome) -> ToolReport {
        ToolReport::new(ToolKind::Test, "pytest", outcome)
    }

    fn lint_report(output: &str) -> ToolReport {
        ToolReport::new(
            ToolKind::Lint,
            "pylint",
            ToolOutcome::Completed {
                exit_code: Some(0),
                output: output.to_string(),
            },
        )
    }

    #[test]
    fn test_structured_strategy_uses_exit_status() {
        // "passed" appears in the output, but the run failed
        let tests = tests_report(ToolOutcome::Completed {
            exit_code: Some(1),
            output: "1 failed, 4 passed".to_string(),
        });
        let lint = lint_report("Your code has been rated at 9.00/10");

        let evidence = Evidence::collect(GateStrategy::Structured, &tests, &lint);
        assert!(!evidence.tests_passed);
        assert_eq!(evidence.lint_score, Some(9.0));
    }

    #[test]
    fn test_marker_scan_accepts_any_passed_substring() {
        let tests = tests_report(ToolOutcome::Completed {
            exit_code: Some(1),
            output: "1 failed, 4 passed".to_string(),
        });
        let lint = lint_report("Your code has been rated at 9.00/10");

        let evidence = Evidence::collect(GateStrategy::MarkerScan, &tests, &lint);
        assert!(evidence.tests_passed);
    }

    #[test]
    fn test_degraded_tools_never_pass() {
        let tests = tests_report(ToolOutcome::TimedOut(Duration::from_secs(120)));
        let lint = ToolReport::new(
            ToolKind::Lint,
            "pylint",
            ToolOutcome::Unavailable("not installed".to_string()),
        );

        for strategy in [GateStrategy::Structured, GateStrategy::MarkerScan] {
            let evidence = Evidence::collect(strategy, &tests, &lint);
            assert!(!evidence.tests_passed);
            assert_eq!(evidence.lint_score, None);
        }
    }
}

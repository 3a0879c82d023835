//! Scripted stand-ins for the backend, the tools and the interaction log.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::agent::{AgentContext, Backend};
use crate::analysis::{Linter, TestSuite, ToolKind, ToolOutcome, ToolReport};
use crate::config::WorkflowConfig;
use crate::error::{AppError, Result};
use crate::interaction_log::{Interaction, InteractionLog};
use crate::workspace::Sandbox;

/// Replays queued values in order; the last one repeats forever.
struct Script<T> {
    queue: Mutex<VecDeque<T>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, value: T) {
        self.queue.lock().unwrap().push_back(value);
    }

    fn next(&self) -> Option<T> {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

pub fn lint_report(output: &str) -> ToolReport {
    ToolReport::new(
        ToolKind::Lint,
        "pylint",
        ToolOutcome::Completed {
            exit_code: Some(0),
            output: output.to_string(),
        },
    )
}

pub fn test_report(passed: bool) -> ToolReport {
    let (exit_code, output) = if passed {
        (0, "5 passed in 0.02s")
    } else {
        (1, "FAILED test_calc.py::test_divide - ZeroDivisionError\n1 failed, 4 passed in 0.03s")
    };
    ToolReport::new(
        ToolKind::Test,
        "pytest",
        ToolOutcome::Completed {
            exit_code: Some(exit_code),
            output: output.to_string(),
        },
    )
}

pub struct FakeBackend {
    replies: Script<std::result::Result<String, String>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn push_reply(&self, reply: &str) {
        self.replies.push(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, error: &str) {
        self.replies.push(Err(error.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// User messages received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, _system: &str, user: &str, _temperature: f32) -> Result<String> {
        self.prompts.lock().unwrap().push(user.to_string());
        match self.replies.next() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(error)) => Err(AppError::ClaudeApi(error)),
            None => Err(AppError::ClaudeApi("no scripted reply".to_string())),
        }
    }
}

pub struct FakeLinter {
    reports: Script<ToolReport>,
    calls: Mutex<usize>,
}

impl FakeLinter {
    pub fn push(&self, report: ToolReport) {
        self.reports.push(report);
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Linter for FakeLinter {
    async fn lint(&self, _path: &Path) -> ToolReport {
        *self.calls.lock().unwrap() += 1;
        self.reports.next().unwrap_or_else(|| lint_report(""))
    }
}

pub struct FakeTestSuite {
    reports: Script<ToolReport>,
    passing: Mutex<HashSet<String>>,
    paths: Mutex<Vec<PathBuf>>,
}

impl FakeTestSuite {
    pub fn push(&self, report: ToolReport) {
        self.reports.push(report);
    }

    /// Always pass for a test file with this name.
    pub fn pass_for(&self, test_file: &str) {
        self.passing.lock().unwrap().insert(test_file.to_string());
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl TestSuite for FakeTestSuite {
    async fn run(&self, test_path: &Path) -> ToolReport {
        self.paths.lock().unwrap().push(test_path.to_path_buf());

        let name = test_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.passing.lock().unwrap().contains(&name) {
            return test_report(true);
        }

        self.reports.next().unwrap_or_else(|| test_report(false))
    }
}

#[derive(Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<Interaction>>,
}

impl MemoryLog {
    pub fn entries(&self) -> Vec<Interaction> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl InteractionLog for MemoryLog {
    async fn record(&self, interaction: Interaction) {
        self.entries.lock().unwrap().push(interaction);
    }
}

/// A sandbox on disk plus one of each fake.
pub struct Harness {
    tmp: tempfile::TempDir,
    root: PathBuf,
    pub backend: Arc<FakeBackend>,
    pub linter: Arc<FakeLinter>,
    pub test_suite: Arc<FakeTestSuite>,
    pub log: Arc<MemoryLog>,
}

impl Harness {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("sandbox");
        std::fs::create_dir(&root).unwrap();
        let root = root.canonicalize().unwrap();

        Self {
            tmp,
            root,
            backend: Arc::new(FakeBackend {
                replies: Script::new(),
                prompts: Mutex::new(Vec::new()),
            }),
            linter: Arc::new(FakeLinter {
                reports: Script::new(),
                calls: Mutex::new(0),
            }),
            test_suite: Arc::new(FakeTestSuite {
                reports: Script::new(),
                passing: Mutex::new(HashSet::new()),
                paths: Mutex::new(Vec::new()),
            }),
            log: Arc::new(MemoryLog::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A path beside the sandbox root, outside of it.
    pub fn outside_path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    pub fn write_source(&self, name: &str, content: &str) {
        std::fs::write(self.root.join(name), content).unwrap();
    }

    pub fn read_source(&self, name: &str) -> String {
        std::fs::read_to_string(self.root.join(name)).unwrap()
    }

    pub fn context(&self) -> AgentContext {
        self.context_with(WorkflowConfig::default())
    }

    pub fn context_with(&self, workflow: WorkflowConfig) -> AgentContext {
        AgentContext {
            sandbox: Sandbox::new(&self.root).unwrap(),
            backend: self.backend.clone(),
            linter: self.linter.clone(),
            test_suite: self.test_suite.clone(),
            log: self.log.clone(),
            workflow,
        }
    }
}

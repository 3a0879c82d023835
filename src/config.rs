use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::workflow::gate::GateStrategy;

/// Environment credential consulted when `backend.api_key` is not configured.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ToolsConfig {
    #[serde(default = "default_lint_command")]
    pub lint_command: String,
    #[serde(default)]
    pub lint_args: Vec<String>,
    #[serde(default = "default_lint_timeout")]
    pub lint_timeout_secs: u64,
    #[serde(default = "default_test_command")]
    pub test_command: String,
    #[serde(default = "default_test_args")]
    pub test_args: Vec<String>,
    #[serde(default = "default_test_timeout")]
    pub test_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            lint_command: default_lint_command(),
            lint_args: Vec::new(),
            lint_timeout_secs: default_lint_timeout(),
            test_command: default_test_command(),
            test_args: default_test_args(),
            test_timeout_secs: default_test_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    /// Completed Fixer passes allowed per file.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Stage invocations allowed per file, independent of the iteration cap.
    #[serde(default = "default_step_limit")]
    pub step_limit: u32,
    #[serde(default = "default_min_lint_score")]
    pub min_lint_score: f64,
    #[serde(default)]
    pub gate_strategy: GateStrategy,
    /// Fence tag used in prompts and when extracting code from replies.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_auditor_temperature")]
    pub auditor_temperature: f32,
    #[serde(default = "default_fixer_temperature")]
    pub fixer_temperature: f32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            step_limit: default_step_limit(),
            min_lint_score: default_min_lint_score(),
            gate_strategy: GateStrategy::default(),
            language: default_language(),
            auditor_temperature: default_auditor_temperature(),
            fixer_temperature: default_fixer_temperature(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    #[serde(default)]
    pub include_tests: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            recursive: default_recursive(),
            include_tests: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SandboxConfig {
    /// Defaults to the target directory when unset.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_interaction_log")]
    pub interaction_log: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            interaction_log: default_interaction_log(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    16384
}

fn default_request_timeout() -> u64 {
    120
}

fn default_lint_command() -> String {
    "pylint".to_string()
}

fn default_lint_timeout() -> u64 {
    60
}

fn default_test_command() -> String {
    "pytest".to_string()
}

fn default_test_args() -> Vec<String> {
    vec!["-v".to_string(), "--tb=short".to_string()]
}

fn default_test_timeout() -> u64 {
    120
}

fn default_max_iterations() -> u32 {
    10
}

fn default_step_limit() -> u32 {
    50
}

fn default_min_lint_score() -> f64 {
    7.0
}

fn default_language() -> String {
    "python".to_string()
}

fn default_auditor_temperature() -> f32 {
    0.3
}

fn default_fixer_temperature() -> f32 {
    0.2
}

fn default_extension() -> String {
    "py".to_string()
}

fn default_recursive() -> bool {
    true
}

fn default_interaction_log() -> PathBuf {
    PathBuf::from("logs/experiment_data.json")
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("swarm").required(false));
        }

        // Environment variable overrides with SWARM_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("SWARM")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// The configured key, or the environment credential when none is set.
    pub fn api_key(&self) -> Option<String> {
        self.backend
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

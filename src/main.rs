use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use refactoring_swarm::agent::claude::ClaudeClient;
use refactoring_swarm::agent::AgentContext;
use refactoring_swarm::analysis::{PylintRunner, PytestRunner};
use refactoring_swarm::config::{AppConfig, API_KEY_ENV};
use refactoring_swarm::interaction_log::JsonFileLog;
use refactoring_swarm::workflow::Orchestrator;
use refactoring_swarm::workspace::discovery::discover;
use refactoring_swarm::workspace::Sandbox;

#[derive(Parser)]
#[command(
    name = "refactoring-swarm",
    about = "Audit, repair and verify every source file in a directory"
)]
struct Cli {
    /// Directory containing the files to repair
    #[arg(long, alias = "target_dir")]
    target_dir: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    let Some(api_key) = config.api_key() else {
        eprintln!("❌ ERROR: {API_KEY_ENV} environment variable not set!");
        eprintln!("   Set it in your .env file or environment.");
        return Ok(ExitCode::from(1));
    };

    if !cli.target_dir.is_dir() {
        eprintln!(
            "❌ ERROR: Directory '{}' not found!",
            cli.target_dir.display()
        );
        return Ok(ExitCode::from(1));
    }
    let target_dir = cli.target_dir.canonicalize()?;

    let sandbox_root = config.sandbox.root.clone().unwrap_or_else(|| target_dir.clone());
    let sandbox = Sandbox::new(&sandbox_root)?;
    if let Err(e) = sandbox.verify_path(&target_dir) {
        eprintln!("❌ ERROR: {e}");
        return Ok(ExitCode::from(1));
    }

    let files = discover(&target_dir, &config.discovery)?;
    if files.is_empty() {
        println!(
            "⚠️ No .{} files found in {}",
            config.discovery.extension,
            target_dir.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!(
        target_dir = %target_dir.display(),
        files = files.len(),
        max_iterations = config.workflow.max_iterations,
        model = %config.backend.model,
        "Starting refactoring swarm"
    );
    for file in &files {
        tracing::info!(file = %file.display(), "Queued");
    }

    let log = Arc::new(JsonFileLog::open(&config.log.interaction_log).await?);
    let ctx = AgentContext {
        sandbox,
        backend: Arc::new(ClaudeClient::new(&config.backend, &api_key)?),
        linter: Arc::new(PylintRunner::new(&config.tools)),
        test_suite: Arc::new(PytestRunner::new(&config.tools)),
        log: log.clone(),
        workflow: config.workflow.clone(),
    };

    let orchestrator = Arc::new(Orchestrator::new(ctx));
    let report = orchestrator.run_batch(&target_dir, &files).await;

    println!();
    print!("{}", report.render());
    println!(
        "\nDetailed agent interactions: {}",
        log.path().display()
    );

    Ok(ExitCode::SUCCESS)
}

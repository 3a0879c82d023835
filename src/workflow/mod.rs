pub mod gate;
pub mod orchestrator;
pub mod router;
pub mod state;
pub mod types;

pub use orchestrator::Orchestrator;
pub use state::{Status, WorkflowState};

pub mod orchestrator;
pub mod types;

pub use orchestrator::{Orchestrator, TurnOutcome};
pub use types::{ChatMessage, Role, ToolDetails, TurnStatus};

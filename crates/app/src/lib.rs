//! VoxHive application library
//!
//! Wires the pipeline together: capture feeds the segmenter, transcribed
//! text goes through the command router, and anything that is not a system
//! command reaches the active agent.

pub mod config;
pub mod orchestrator;
pub mod router;
pub mod runtime;

pub use orchestrator::{Orchestrator, OrchestratorError, OrchestratorStatus};
pub use router::{Command, CommandRouter};

//! Conversational agents for VoxHive
//!
//! A persona describes an agent's identity and model parameters; an agent
//! binds a persona to the conversation store and the LLM backend and keeps a
//! bounded in-memory context window over its durable history.

pub mod agent;
pub mod context;
pub mod llm;
pub mod persona;

pub use agent::{Agent, FALLBACK_REPLY};
pub use context::ContextWindow;
pub use llm::{ChatMessage, LlmClient, LlmError, OllamaClient};
pub use persona::{Persona, PersonaError, PersonaTemplate};

//! Conversation history storage for VoxHive
//!
//! Agents record every exchange through the [`ConversationStore`] trait.
//! Two implementations ship here: an in-memory store for tests and
//! ephemeral runs, and an append-only JSONL store that survives restarts.
//! The store is the durable record; the agent's in-RAM context window is a
//! bounded view over it and may forget what the store keeps.

pub mod jsonl_store;
pub mod memory_store;
pub mod store;
pub mod types;

pub use jsonl_store::JsonlStore;
pub use memory_store::MemoryStore;
pub use store::{ConversationStore, StoreError};
pub use types::{Conversation, Message, MessageMeta, MessageRole};

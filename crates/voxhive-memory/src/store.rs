//! Storage trait and errors

use thiserror::Error;

use crate::types::Message;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unknown conversation: {0}")]
    UnknownConversation(u64),
}

/// Durable conversation log. Append-only: messages are never edited or
/// deleted once written. Implementations serialize internally so a shared
/// `Arc<dyn ConversationStore>` can be handed to every agent.
pub trait ConversationStore: Send + Sync {
    /// Opens a new conversation for `agent_name` and returns its id.
    fn create_conversation(
        &self,
        agent_name: &str,
        title: Option<&str>,
    ) -> Result<u64, StoreError>;

    /// Marks the conversation as ended. Ending an already-ended
    /// conversation is a no-op.
    fn end_conversation(&self, conversation_id: u64) -> Result<(), StoreError>;

    fn append_message(&self, conversation_id: u64, message: &Message) -> Result<(), StoreError>;

    /// The most recent `limit` messages across all of `agent_name`'s
    /// conversations, oldest first.
    fn recent_messages(&self, agent_name: &str, limit: usize) -> Result<Vec<Message>, StoreError>;

    fn conversation_len(&self, conversation_id: u64) -> Result<usize, StoreError>;
}

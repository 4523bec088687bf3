//! In-memory store for tests and ephemeral runs

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::store::{ConversationStore, StoreError};
use crate::types::{Conversation, Message};

#[derive(Default)]
struct Inner {
    next_id: u64,
    conversations: HashMap<u64, Conversation>,
    /// Global append order is the chronological order
    log: Vec<(u64, Message)>,
}

/// Keeps everything in RAM. Same semantics as [`crate::JsonlStore`] minus
/// durability.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryStore {
    fn create_conversation(
        &self,
        agent_name: &str,
        title: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.conversations.insert(
            id,
            Conversation {
                id,
                agent_name: agent_name.to_string(),
                started_at: chrono::Utc::now().to_rfc3339(),
                ended_at: None,
                title: title.map(|t| t.to_string()),
            },
        );
        Ok(id)
    }

    fn end_conversation(&self, conversation_id: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let conversation = inner
            .conversations
            .get_mut(&conversation_id)
            .ok_or(StoreError::UnknownConversation(conversation_id))?;
        if conversation.ended_at.is_none() {
            conversation.ended_at = Some(chrono::Utc::now().to_rfc3339());
        }
        Ok(())
    }

    fn append_message(&self, conversation_id: u64, message: &Message) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(StoreError::UnknownConversation(conversation_id));
        }
        inner.log.push((conversation_id, message.clone()));
        Ok(())
    }

    fn recent_messages(&self, agent_name: &str, limit: usize) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.lock();
        let mut matched: Vec<Message> = inner
            .log
            .iter()
            .filter(|(conv_id, _)| {
                inner
                    .conversations
                    .get(conv_id)
                    .is_some_and(|c| c.agent_name == agent_name)
            })
            .map(|(_, m)| m.clone())
            .collect();
        if matched.len() > limit {
            matched.drain(..matched.len() - limit);
        }
        Ok(matched)
    }

    fn conversation_len(&self, conversation_id: u64) -> Result<usize, StoreError> {
        let inner = self.inner.lock();
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(StoreError::UnknownConversation(conversation_id));
        }
        Ok(inner
            .log
            .iter()
            .filter(|(id, _)| *id == conversation_id)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn recent_messages_filters_by_agent_and_keeps_order() {
        let store = MemoryStore::new();
        let a = store.create_conversation("alice", None).unwrap();
        let b = store.create_conversation("bob", None).unwrap();

        store
            .append_message(a, &Message::now(MessageRole::User, "one"))
            .unwrap();
        store
            .append_message(b, &Message::now(MessageRole::User, "noise"))
            .unwrap();
        store
            .append_message(a, &Message::now(MessageRole::Assistant, "two").with_agent("alice"))
            .unwrap();

        let recent = store.recent_messages("alice", 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "one");
        assert_eq!(recent[1].content, "two");
    }

    #[test]
    fn recent_messages_truncates_to_last_limit() {
        let store = MemoryStore::new();
        let id = store.create_conversation("alice", None).unwrap();
        for i in 0..5 {
            store
                .append_message(id, &Message::now(MessageRole::User, format!("m{i}")))
                .unwrap();
        }
        let recent = store.recent_messages("alice", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "m3");
        assert_eq!(recent[1].content, "m4");
    }

    #[test]
    fn append_to_unknown_conversation_fails() {
        let store = MemoryStore::new();
        let err = store
            .append_message(99, &Message::now(MessageRole::User, "hi"))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownConversation(99)));
    }

    #[test]
    fn end_conversation_is_idempotent() {
        let store = MemoryStore::new();
        let id = store.create_conversation("alice", None).unwrap();
        store.end_conversation(id).unwrap();
        store.end_conversation(id).unwrap();
        assert!(matches!(
            store.end_conversation(404),
            Err(StoreError::UnknownConversation(404))
        ));
    }
}

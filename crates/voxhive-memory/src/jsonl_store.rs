//! Append-only JSONL store
//!
//! Two files under the store directory: `conversations.jsonl` carries
//! started/ended events, `messages.jsonl` carries every message in append
//! order. Opening the store replays both files into an in-memory index, so
//! queries never touch disk. Writes are flushed per record; a crash loses at
//! most the record being written.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::store::{ConversationStore, StoreError};
use crate::types::{Conversation, Message};

const CONVERSATIONS_FILE: &str = "conversations.jsonl";
const MESSAGES_FILE: &str = "messages.jsonl";

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ConvRecord {
    Started {
        id: u64,
        agent_name: String,
        started_at: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Ended {
        id: u64,
        ended_at: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct MessageRecord {
    conversation_id: u64,
    message: Message,
}

struct Inner {
    next_id: u64,
    conversations: HashMap<u64, Conversation>,
    log: Vec<(u64, Message)>,
    conv_writer: BufWriter<File>,
    msg_writer: BufWriter<File>,
}

pub struct JsonlStore {
    dir: PathBuf,
    inner: Mutex<Inner>,
}

impl JsonlStore {
    /// Opens the store at `dir`, creating it if needed, and replays any
    /// existing log. Unparseable lines are skipped with a warning rather
    /// than failing the whole replay.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let conv_path = dir.join(CONVERSATIONS_FILE);
        let msg_path = dir.join(MESSAGES_FILE);

        let mut conversations = HashMap::new();
        let mut next_id = 0u64;
        if conv_path.exists() {
            for line in BufReader::new(File::open(&conv_path)?).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<ConvRecord>(&line) {
                    Ok(ConvRecord::Started {
                        id,
                        agent_name,
                        started_at,
                        title,
                    }) => {
                        next_id = next_id.max(id);
                        conversations.insert(
                            id,
                            Conversation {
                                id,
                                agent_name,
                                started_at,
                                ended_at: None,
                                title,
                            },
                        );
                    }
                    Ok(ConvRecord::Ended { id, ended_at }) => {
                        if let Some(c) = conversations.get_mut(&id) {
                            c.ended_at = Some(ended_at);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("skipping bad conversation record: {}", e);
                    }
                }
            }
        }

        let mut log = Vec::new();
        if msg_path.exists() {
            for line in BufReader::new(File::open(&msg_path)?).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<MessageRecord>(&line) {
                    Ok(record) => log.push((record.conversation_id, record.message)),
                    Err(e) => {
                        tracing::warn!("skipping bad message record: {}", e);
                    }
                }
            }
        }

        let conv_writer = BufWriter::new(OpenOptions::new().create(true).append(true).open(&conv_path)?);
        let msg_writer = BufWriter::new(OpenOptions::new().create(true).append(true).open(&msg_path)?);

        tracing::info!(
            path = %dir.display(),
            conversations = conversations.len(),
            messages = log.len(),
            "conversation store opened"
        );

        Ok(Self {
            dir,
            inner: Mutex::new(Inner {
                next_id,
                conversations,
                log,
                conv_writer,
                msg_writer,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn write_conv_record(inner: &mut Inner, record: &ConvRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        writeln!(inner.conv_writer, "{line}")?;
        inner.conv_writer.flush()?;
        Ok(())
    }
}

impl ConversationStore for JsonlStore {
    fn create_conversation(
        &self,
        agent_name: &str,
        title: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let started_at = chrono::Utc::now().to_rfc3339();

        Self::write_conv_record(
            &mut inner,
            &ConvRecord::Started {
                id,
                agent_name: agent_name.to_string(),
                started_at: started_at.clone(),
                title: title.map(|t| t.to_string()),
            },
        )?;
        inner.conversations.insert(
            id,
            Conversation {
                id,
                agent_name: agent_name.to_string(),
                started_at,
                ended_at: None,
                title: title.map(|t| t.to_string()),
            },
        );
        Ok(id)
    }

    fn end_conversation(&self, conversation_id: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let already_ended = match inner.conversations.get(&conversation_id) {
            Some(c) => c.ended_at.is_some(),
            None => return Err(StoreError::UnknownConversation(conversation_id)),
        };
        if already_ended {
            return Ok(());
        }
        let ended_at = chrono::Utc::now().to_rfc3339();
        Self::write_conv_record(
            &mut inner,
            &ConvRecord::Ended {
                id: conversation_id,
                ended_at: ended_at.clone(),
            },
        )?;
        if let Some(c) = inner.conversations.get_mut(&conversation_id) {
            c.ended_at = Some(ended_at);
        }
        Ok(())
    }

    fn append_message(&self, conversation_id: u64, message: &Message) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(StoreError::UnknownConversation(conversation_id));
        }
        let record = MessageRecord {
            conversation_id,
            message: message.clone(),
        };
        let line = serde_json::to_string(&record)?;
        writeln!(inner.msg_writer, "{line}")?;
        inner.msg_writer.flush()?;
        inner.log.push((conversation_id, record.message));
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
    fn history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let first_id;
        {
            let store = JsonlStore::open(dir.path()).unwrap();
            first_id = store.create_conversation("alice", Some("greeting")).unwrap();
            store
                .append_message(first_id, &Message::now(MessageRole::User, "hello"))
                .unwrap();
            store
                .append_message(
                    first_id,
                    &Message::now(MessageRole::Assistant, "hi").with_agent("alice"),
                )
                .unwrap();
            store.end_conversation(first_id).unwrap();
        }

        let store = JsonlStore::open(dir.path()).unwrap();
        assert_eq!(store.conversation_len(first_id).unwrap(), 2);
        let recent = store.recent_messages("alice", 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "hello");
        assert_eq!(recent[1].content, "hi");

        // Ids keep counting up after a reopen.
        let second_id = store.create_conversation("alice", None).unwrap();
        assert!(second_id > first_id);
    }

    #[test]
    fn ended_state_survives_reopen_and_stays_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let id;
        {
            let store = JsonlStore::open(dir.path()).unwrap();
            id = store.create_conversation("bob", None).unwrap();
            store.end_conversation(id).unwrap();
        }
        let store = JsonlStore::open(dir.path()).unwrap();
        store.end_conversation(id).unwrap();
        assert!(matches!(
            store.end_conversation(999),
            Err(StoreError::UnknownConversation(999))
        ));
    }

    #[test]
    fn corrupt_lines_are_skipped_on_replay() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonlStore::open(dir.path()).unwrap();
            let id = store.create_conversation("alice", None).unwrap();
            store
                .append_message(id, &Message::now(MessageRole::User, "kept"))
                .unwrap();
        }
        std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join(MESSAGES_FILE))
            .unwrap()
            .write_all(b"{not json\n")
            .unwrap();

        let store = JsonlStore::open(dir.path()).unwrap();
        let recent = store.recent_messages("alice", 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "kept");
    }
}

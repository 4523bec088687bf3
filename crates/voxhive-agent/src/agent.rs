//! One conversational agent
//!
//! Binds a persona to the conversation store and the LLM backend. Every
//! turn is appended to the durable log before and after inference; the
//! in-memory window is the only thing that ever forgets.

use std::sync::Arc;

use voxhive_memory::{ConversationStore, Message, MessageMeta, MessageRole, StoreError};

use crate::context::ContextWindow;
use crate::llm::LlmClient;
use crate::persona::Persona;

/// Substituted whenever inference fails or comes back empty. The raw
/// failure never reaches the caller.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that. Could you try again?";

pub struct Agent {
    persona: Persona,
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmClient>,
    conversation_id: Option<u64>,
    context: ContextWindow,
    active: bool,
}

impl Agent {
    pub fn new(persona: Persona, store: Arc<dyn ConversationStore>, llm: Arc<dyn LlmClient>) -> Self {
        tracing::info!(agent = %persona.name, model = %persona.model, "agent initialized");
        Self {
            persona,
            store,
            llm,
            conversation_id: None,
            context: ContextWindow::default(),
            active: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.persona.name
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn conversation_id(&self) -> Option<u64> {
        self.conversation_id
    }

    pub fn context_len(&self) -> usize {
        self.context.len()
    }

    /// Opens a durable conversation and resets the window to the rendered
    /// system prompt. Returns the conversation id.
    pub fn start_conversation(&mut self, title: Option<&str>) -> Result<u64, StoreError> {
        let id = self.store.create_conversation(&self.persona.name, title)?;
        self.conversation_id = Some(id);
        self.context
            .reset_with_system(&self.persona.render_system_prompt(), &self.persona.name);
        self.active = true;
        tracing::info!(agent = %self.persona.name, conversation = id, "conversation started");
        Ok(id)
    }

    /// Runs one turn: record the user message, call the model over the
    /// current window, record the reply. Inference failure degrades to
    /// [`FALLBACK_REPLY`]; append failures are logged and the turn continues
    /// on the in-memory window. Only conversation creation propagates.
    pub fn process(&mut self, text: &str, meta: Option<MessageMeta>) -> Result<String, StoreError> {
        let conversation_id = match self.conversation_id {
            Some(id) => id,
            None => self.start_conversation(None)?,
        };

        let mut user_msg = Message::now(MessageRole::User, text);
        if let Some(meta) = meta {
            user_msg = user_msg.with_meta(meta);
        }
        if let Err(e) = self.store.append_message(conversation_id, &user_msg) {
            tracing::error!(agent = %self.persona.name, "failed to persist user message: {}", e);
        }
        self.context.push(user_msg);

        let request = self.context.llm_messages();
        let reply = match self.llm.chat(
            &self.persona.model,
            &request,
            self.persona.temperature,
            self.persona.max_tokens,
        ) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(agent = %self.persona.name, "empty LLM reply, using fallback");
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!(agent = %self.persona.name, "LLM call failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        };

        let assistant_msg =
            Message::now(MessageRole::Assistant, reply.clone()).with_agent(&self.persona.name);
        if let Err(e) = self.store.append_message(conversation_id, &assistant_msg) {
            tracing::error!(agent = %self.persona.name, "failed to persist reply: {}", e);
        }
        self.context.push(assistant_msg);
        self.context.trim();

        tracing::debug!(agent = %self.persona.name, chars = reply.len(), "turn complete");
        Ok(reply)
    }

    /// Rebuilds the window from the durable log without opening a new
    /// conversation record.
    pub fn load_history(&mut self, limit: usize) -> Result<(), StoreError> {
        let history = self.store.recent_messages(&self.persona.name, limit)?;
        let loaded = history.len();
        self.context.replace_with_history(
            &self.persona.render_system_prompt(),
            &self.persona.name,
            history,
        );
        tracing::info!(agent = %self.persona.name, messages = loaded, "history loaded");
        Ok(())
    }

    /// Closes the durable record. Idempotent.
    pub fn end_conversation(&mut self) -> Result<(), StoreError> {
        if let Some(id) = self.conversation_id.take() {
            self.store.end_conversation(id)?;
            tracing::info!(agent = %self.persona.name, conversation = id, "conversation ended");
        }
        self.active = false;
        Ok(())
    }
}

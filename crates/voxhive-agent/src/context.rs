//! Bounded in-memory context window
//!
//! The durable log keeps everything; the window keeps only what the model
//! gets to see. Trimming fires once the window grows past `max_len + 5`,
//! keeping every system message plus the newest `max_len - 1` others.

use voxhive_memory::{Message, MessageRole};

use crate::llm::ChatMessage;

pub const DEFAULT_WINDOW: usize = 20;

#[derive(Debug, Clone)]
pub struct ContextWindow {
    messages: Vec<Message>,
    max_len: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl ContextWindow {
    pub fn new(max_len: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_len,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Drops everything and seeds the window with the system prompt.
    pub fn reset_with_system(&mut self, system_prompt: &str, agent_name: &str) {
        self.messages.clear();
        self.messages
            .push(Message::now(MessageRole::System, system_prompt).with_agent(agent_name));
    }

    /// Replaces the window with `[system] + history`, oldest first.
    pub fn replace_with_history(
        &mut self,
        system_prompt: &str,
        agent_name: &str,
        history: Vec<Message>,
    ) {
        self.reset_with_system(system_prompt, agent_name);
        self.messages.extend(history);
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Hysteresis keeps trimming off the per-turn hot path until the window
    /// overshoots by 5.
    pub fn trim(&mut self) {
        if self.messages.len() <= self.max_len + 5 {
            return;
        }
        let system: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .cloned()
            .collect();
        let keep_from = self
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .count()
            .saturating_sub(self.max_len.saturating_sub(1));
        let recent: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .skip(keep_from)
            .cloned()
            .collect();
        self.messages = system;
        self.messages.extend(recent);
    }

    /// The request body for the next inference call: the last `max_len`
    /// window messages, with the system message forced in front when it
    /// would otherwise fall outside the slice.
    pub fn llm_messages(&self) -> Vec<ChatMessage> {
        let start = self.messages.len().saturating_sub(self.max_len);
        let slice = &self.messages[start..];

        let mut out = Vec::with_capacity(slice.len() + 1);
        if !slice.iter().any(|m| m.role == MessageRole::System) {
            if let Some(system) = self
                .messages
                .iter()
                .find(|m| m.role == MessageRole::System)
            {
                out.push(ChatMessage::new(system.role.as_str(), &system.content));
            }
        }
        out.extend(
            slice
                .iter()
                .map(|m| ChatMessage::new(m.role.as_str(), &m.content)),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(window: &mut ContextWindow, i: usize) {
        window.push(Message::now(MessageRole::User, format!("q{i}")));
        window.push(Message::now(MessageRole::Assistant, format!("a{i}")).with_agent("ada"));
        window.trim();
    }

    #[test]
    fn window_stays_bounded_after_many_turns() {
        let mut window = ContextWindow::new(20);
        window.reset_with_system("sys", "ada");
        for i in 0..40 {
            turn(&mut window, i);
        }
        assert!(window.len() <= 21);
        assert_eq!(window.messages()[0].role, MessageRole::System);
        // Newest turn is still present.
        assert!(window.messages().iter().any(|m| m.content == "a39"));
    }

    #[test]
    fn trim_waits_for_overshoot() {
        let mut window = ContextWindow::new(20);
        window.reset_with_system("sys", "ada");
        for i in 0..12 {
            turn(&mut window, i);
        }
        // 25 messages, within max + 5: untouched.
        assert_eq!(window.len(), 25);
        turn(&mut window, 12);
        // 27 crossed the line: system + 19 newest non-system.
        assert_eq!(window.len(), 20);
    }

    #[test]
    fn zero_capacity_window_trims_to_system_only() {
        let mut window = ContextWindow::new(0);
        window.reset_with_system("sys", "ada");
        for i in 0..6 {
            turn(&mut window, i);
        }
        // Trim fires at 7 messages and keeps nothing but the system entry.
        assert_eq!(window.len(), 1);
        assert_eq!(window.messages()[0].role, MessageRole::System);
    }

    #[test]
    fn llm_request_always_carries_system_message() {
        let mut window = ContextWindow::new(4);
        window.reset_with_system("sys", "ada");
        for i in 0..3 {
            window.push(Message::now(MessageRole::User, format!("q{i}")));
            window.push(Message::now(MessageRole::Assistant, format!("a{i}")));
        }
        // 7 messages, last 4 exclude the system entry.
        let request = window.llm_messages();
        assert_eq!(request[0].role, "system");
        assert_eq!(request.len(), 5);
        assert_eq!(request.last().unwrap().content, "a2");
    }
}

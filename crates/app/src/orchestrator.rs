//! Agent registry and command execution
//!
//! The orchestrator owns every agent, the active pointer, and the voice
//! profile registry. Voice text lowercases agent names, so all lookups are
//! case-insensitive against the registered names.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use voxhive_agent::{Agent, LlmClient, Persona, PersonaTemplate};
use voxhive_memory::{ConversationStore, MessageMeta, StoreError};
use voxhive_tts::{TtsManager, VoiceProfile};

use crate::router::{Command, CommandRouter};

pub const DEFAULT_MAX_AGENTS: usize = 10;
const NO_ACTIVE_AGENT: &str = "No active agent. Create an agent first.";

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Agent limit reached ({0})")]
    CapacityExceeded(usize),

    #[error("Agent already exists: {0}")]
    DuplicateName(String),

    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Bookkeeping for one audio path through the system.
#[derive(Debug, Clone)]
pub struct AudioRoute {
    pub input_source: String,
    pub target_agent: String,
    pub output_device: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorStatus {
    pub running: bool,
    pub agent_count: usize,
    pub active_agent: Option<String>,
    pub audio_input_count: usize,
    pub audio_output_count: usize,
    pub route_count: usize,
}

pub struct Orchestrator {
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmClient>,
    tts: TtsManager,
    router: CommandRouter,
    agents: HashMap<String, Agent>,
    active: Option<String>,
    max_agents: usize,
    audio_inputs: Vec<String>,
    audio_outputs: Vec<String>,
    routes: Vec<AudioRoute>,
    running: bool,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        llm: Arc<dyn LlmClient>,
        tts: TtsManager,
        max_agents: usize,
    ) -> Self {
        tracing::info!(max_agents, "orchestrator initialized");
        Self {
            store,
            llm,
            tts,
            router: CommandRouter::new(),
            agents: HashMap::new(),
            active: None,
            max_agents,
            audio_inputs: Vec::new(),
            audio_outputs: Vec::new(),
            routes: Vec::new(),
            running: true,
        }
    }

    /// Registered name matching `name` case-insensitively.
    fn resolve_name(&self, name: &str) -> Option<String> {
        self.agents
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active_agent_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    /// Registers a new agent. The first agent added becomes active. If the
    /// persona carries a voice sample, the matching profile is registered
    /// with the synthesis manager; a bad sample only loses the voice, not
    /// the agent.
    pub fn add_agent(&mut self, persona: Persona) -> Result<(), OrchestratorError> {
        if self.agents.len() >= self.max_agents {
            return Err(OrchestratorError::CapacityExceeded(self.max_agents));
        }
        if self.resolve_name(&persona.name).is_some() {
            return Err(OrchestratorError::DuplicateName(persona.name));
        }

        if let Some(sample) = &persona.voice_sample {
            let profile = VoiceProfile::new(&persona.name, sample, &persona.voice_language);
            if let Err(e) = self.tts.add_profile(&persona.name, profile) {
                tracing::warn!(agent = %persona.name, "voice profile rejected: {}", e);
            }
        }

        let name = persona.name.clone();
        let agent = Agent::new(persona, Arc::clone(&self.store), Arc::clone(&self.llm));
        self.agents.insert(name.clone(), agent);
        if self.active.is_none() {
            self.active = Some(name.clone());
        }
        tracing::info!(agent = %name, "agent added");
        Ok(())
    }

    pub fn create_agent_from_template(
        &mut self,
        name: &str,
        template: PersonaTemplate,
    ) -> Result<(), OrchestratorError> {
        self.add_agent(Persona::from_template(name, template))
    }

    /// Ends the agent's conversation, drops its voice profile, and removes
    /// it. When the active agent goes away the replacement is an arbitrary
    /// remaining agent; the registry promises no ordering.
    pub fn remove_agent(&mut self, name: &str) -> Result<(), OrchestratorError> {
        let name = self
            .resolve_name(name)
            .ok_or_else(|| OrchestratorError::NotFound(name.to_string()))?;

        if let Some(agent) = self.agents.get_mut(&name) {
            // Same policy as stop(): a failing durability flush must not
            // block removal.
            if let Err(e) = agent.end_conversation() {
                tracing::error!(agent = %name, "failed to end conversation: {}", e);
            }
        }
        self.tts.remove_profile(&name);
        self.remove_routes_for(&name);
        self.agents.remove(&name);

        if self.active.as_deref() == Some(name.as_str()) {
            self.active = self.agents.keys().next().cloned();
        }
        tracing::info!(agent = %name, "agent removed");
        Ok(())
    }

    /// Pure pointer change, no conversation side effects.
    pub fn switch_agent(&mut self, name: &str) -> Result<(), OrchestratorError> {
        let name = self
            .resolve_name(name)
            .ok_or_else(|| OrchestratorError::NotFound(name.to_string()))?;
        tracing::info!(agent = %name, "active agent switched");
        self.active = Some(name);
        Ok(())
    }

    /// Main entry point for both voice and text input. System commands are
    /// executed here and never reach an LLM; everything else goes to the
    /// active agent.
    pub fn route(&mut self, text: &str) -> Result<String, OrchestratorError> {
        if let Some(command) = self.router.parse(text) {
            return Ok(self.execute(command));
        }
        let name = match self.active.clone() {
            Some(name) => name,
            None => return Ok(NO_ACTIVE_AGENT.to_string()),
        };
        match self.agents.get_mut(&name) {
            Some(agent) => Ok(agent.process(text, None)?),
            None => Err(OrchestratorError::NotFound(name)),
        }
    }

    fn execute(&mut self, command: Command) -> String {
        match command {
            Command::CreateAgent { name } => {
                match self.create_agent_from_template(&name, PersonaTemplate::Default) {
                    Ok(()) => format!("Created new agent: {name}"),
                    Err(e) => {
                        tracing::warn!("create failed: {}", e);
                        format!("Failed to create agent: {name}")
                    }
                }
            }
            Command::SwitchAgent { name } => match self.switch_agent(&name) {
                Ok(()) => format!("Switched to {name}"),
                Err(_) => format!("Agent {name} not found"),
            },
            Command::ListAgents => {
                if self.agents.is_empty() {
                    "No agents available".to_string()
                } else {
                    let mut names = self.agent_names();
                    names.sort();
                    let active = self.active.as_deref().unwrap_or("none");
                    format!(
                        "Available agents: {}. Active agent: {active}",
                        names.join(", ")
                    )
                }
            }
            Command::StopAgent { name } => match self.remove_agent(&name) {
                Ok(()) => format!("Stopped agent: {name}"),
                Err(OrchestratorError::NotFound(_)) => format!("Agent {name} not found"),
                Err(e) => {
                    tracing::error!("stop failed: {}", e);
                    format!("Failed to stop agent: {name}")
                }
            },
            Command::StartTalk { agent1, agent2 } => {
                match self.start_inter_agent_conversation(&agent1, &agent2, "Hello", 3) {
                    Ok(summary) => summary,
                    Err(OrchestratorError::NotFound(_)) => {
                        "One or both agents not found".to_string()
                    }
                    Err(e) => {
                        tracing::error!("inter-agent conversation failed: {}", e);
                        "Inter-agent conversation failed".to_string()
                    }
                }
            }
            Command::Exit => {
                self.stop();
                "Shutting down VoxHive. Goodbye!".to_string()
            }
            Command::Help => Self::help_text().to_string(),
        }
    }

    /// Alternates turns between two agents: each round, agent1 answers the
    /// current message and agent2 answers agent1. Both sides tag the
    /// exchange as inter-agent traffic. The transcript stays in each
    /// agent's own context and durable log; only a summary comes back.
    pub fn start_inter_agent_conversation(
        &mut self,
        agent1: &str,
        agent2: &str,
        topic: &str,
        rounds: usize,
    ) -> Result<String, OrchestratorError> {
        let name1 = self
            .resolve_name(agent1)
            .ok_or_else(|| OrchestratorError::NotFound(agent1.to_string()))?;
        let name2 = self
            .resolve_name(agent2)
            .ok_or_else(|| OrchestratorError::NotFound(agent2.to_string()))?;

        tracing::info!(a = %name1, b = %name2, rounds, "inter-agent conversation starting");

        {
            let agent = self
                .agents
                .get_mut(&name1)
                .ok_or_else(|| OrchestratorError::NotFound(name1.clone()))?;
            if agent.conversation_id().is_none() {
                agent.start_conversation(Some(&format!("Conversation with {name2}")))?;
            }
        }
        {
            let agent = self
                .agents
                .get_mut(&name2)
                .ok_or_else(|| OrchestratorError::NotFound(name2.clone()))?;
            if agent.conversation_id().is_none() {
                agent.start_conversation(Some(&format!("Conversation with {name1}")))?;
            }
        }

        let mut message = topic.to_string();
        for round in 0..rounds {
            let meta1 = MessageMeta {
                inter_agent: true,
                other_agent: Some(name2.clone()),
            };
            let r1 = {
                let agent = self
                    .agents
                    .get_mut(&name1)
                    .ok_or_else(|| OrchestratorError::NotFound(name1.clone()))?;
                agent.process(&message, Some(meta1))?
            };

            let meta2 = MessageMeta {
                inter_agent: true,
                other_agent: Some(name1.clone()),
            };
            let r2 = {
                let agent = self
                    .agents
                    .get_mut(&name2)
                    .ok_or_else(|| OrchestratorError::NotFound(name2.clone()))?;
                agent.process(&r1, Some(meta2))?
            };

            tracing::debug!(round, "inter-agent round complete");
            message = r2;
        }

        Ok(format!(
            "Completed {rounds} rounds of conversation between {name1} and {name2}"
        ))
    }

    /// Synthesizes `text` in the active agent's voice, if it has one.
    pub fn synthesize_active(&self, text: &str) -> Option<voxhive_tts::SynthesizedAudio> {
        let name = self.active.as_deref()?;
        self.tts.synthesize_for(name, text)
    }

    pub fn add_audio_input(&mut self, name: impl Into<String>) {
        self.audio_inputs.push(name.into());
    }

    pub fn add_audio_output(&mut self, name: impl Into<String>) {
        self.audio_outputs.push(name.into());
    }

    pub fn add_route(&mut self, route: AudioRoute) {
        tracing::info!(
            input = %route.input_source,
            agent = %route.target_agent,
            "audio route added"
        );
        self.routes.push(route);
    }

    /// Drops every route targeting `agent_name`. Returns how many went.
    pub fn remove_routes_for(&mut self, agent_name: &str) -> usize {
        let before = self.routes.len();
        self.routes
            .retain(|r| !r.target_agent.eq_ignore_ascii_case(agent_name));
        before - self.routes.len()
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            running: self.running,
            agent_count: self.agents.len(),
            active_agent: self.active.clone(),
            audio_input_count: self.audio_inputs.len(),
            audio_output_count: self.audio_outputs.len(),
            route_count: self.routes.len(),
        }
    }

    /// Ends every open conversation and marks the orchestrator stopped.
    /// Storage failures are logged, not propagated, so shutdown always
    /// completes.
    pub fn stop(&mut self) {
        self.running = false;
        for (name, agent) in self.agents.iter_mut() {
            if let Err(e) = agent.end_conversation() {
                tracing::error!(agent = %name, "failed to end conversation: {}", e);
            }
        }
        tracing::info!("orchestrator stopped");
    }

    pub fn help_text() -> &'static str {
        "Available voice commands:\n\
         - \"Create a new agent named [name]\" - Create a new agent\n\
         - \"Switch to [name]\" - Switch active agent\n\
         - \"List agents\" - Show all agents\n\
         - \"Let [agent1] and [agent2] talk\" - Start inter-agent conversation\n\
         - \"Stop [agent]\" - Remove an agent\n\
         - \"Exit\" - Shut down the system\n\
         - \"Help\" - Show this help message"
    }
}

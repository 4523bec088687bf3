//! Persona configuration
//!
//! Personas load from TOML files so users can version their agents outside
//! the binary. Templates cover the common starting points; anything beyond
//! that is edited on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid persona file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize persona: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_voice_language() -> String {
    "en".to_string()
}

/// Identity and model parameters for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub system_prompt: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub beliefs: Vec<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    /// Optional reference recording for voice cloning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_sample: Option<PathBuf>,
    #[serde(default = "default_voice_language")]
    pub voice_language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaTemplate {
    Default,
    Assistant,
    Creative,
}

impl PersonaTemplate {
    /// Unrecognized names fall back to `Default`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "assistant" => PersonaTemplate::Assistant,
            "creative" => PersonaTemplate::Creative,
            _ => PersonaTemplate::Default,
        }
    }
}

impl Persona {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersonaError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn from_template(name: &str, template: PersonaTemplate) -> Self {
        let (system_prompt, goals, beliefs, traits) = match template {
            PersonaTemplate::Default => (
                format!(
                    "You are {name}, a helpful AI assistant. You are friendly, knowledgeable, and eager to help."
                ),
                vec!["Be helpful", "Be informative", "Be engaging"],
                vec!["Knowledge should be shared", "Respect others", "Stay curious"],
                vec!["friendly", "patient", "knowledgeable"],
            ),
            PersonaTemplate::Assistant => (
                format!(
                    "You are {name}, a professional AI assistant. You are efficient, accurate, and detail-oriented."
                ),
                vec!["Provide accurate information", "Be efficient", "Stay professional"],
                vec!["Accuracy is crucial", "Time is valuable", "Clarity matters"],
                vec!["professional", "organized", "precise"],
            ),
            PersonaTemplate::Creative => (
                format!(
                    "You are {name}, a creative AI companion. You are imaginative, playful, and love brainstorming ideas."
                ),
                vec!["Inspire creativity", "Think outside the box", "Have fun"],
                vec!["Creativity is essential", "No idea is bad", "Imagination matters"],
                vec!["creative", "playful", "enthusiastic"],
            ),
        };
        Self {
            name: name.to_string(),
            system_prompt,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            goals: goals.into_iter().map(String::from).collect(),
            beliefs: beliefs.into_iter().map(String::from).collect(),
            traits: traits.into_iter().map(String::from).collect(),
            voice_sample: None,
            voice_language: default_voice_language(),
        }
    }

    /// The full system prompt sent to the model: the base prompt followed by
    /// goals, beliefs, and traits blocks in that fixed order. Empty sections
    /// are omitted.
    pub fn render_system_prompt(&self) -> String {
        let mut parts = vec![self.system_prompt.clone()];

        if !self.goals.is_empty() {
            let goals: Vec<String> = self.goals.iter().map(|g| format!("- {g}")).collect();
            parts.push(format!("\nYour goals:\n{}", goals.join("\n")));
        }
        if !self.beliefs.is_empty() {
            let beliefs: Vec<String> = self.beliefs.iter().map(|b| format!("- {b}")).collect();
            parts.push(format!("\nYour beliefs:\n{}", beliefs.join("\n")));
        }
        if !self.traits.is_empty() {
            parts.push(format!(
                "\nYour personality traits: {}",
                self.traits.join(", ")
            ));
        }

        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_produces_named_prompt() {
        let persona = Persona::from_template("Ada", PersonaTemplate::Creative);
        assert_eq!(persona.name, "Ada");
        assert!(persona.system_prompt.starts_with("You are Ada, a creative"));
        assert_eq!(persona.model, "llama3.1:8b");
        assert_eq!(persona.traits, ["creative", "playful", "enthusiastic"]);
    }

    #[test]
    fn unknown_template_name_falls_back_to_default() {
        assert_eq!(PersonaTemplate::parse("wizard"), PersonaTemplate::Default);
        assert_eq!(PersonaTemplate::parse("Creative"), PersonaTemplate::Creative);
    }

    #[test]
    fn rendered_prompt_orders_sections() {
        let persona = Persona::from_template("Ada", PersonaTemplate::Default);
        let prompt = persona.render_system_prompt();
        let goals_at = prompt.find("Your goals:").unwrap();
        let beliefs_at = prompt.find("Your beliefs:").unwrap();
        let traits_at = prompt.find("Your personality traits:").unwrap();
        assert!(goals_at < beliefs_at && beliefs_at < traits_at);
        assert!(prompt.contains("- Be helpful"));
    }

    #[test]
    fn rendered_prompt_omits_empty_sections() {
        let persona = Persona {
            goals: Vec::new(),
            beliefs: Vec::new(),
            traits: Vec::new(),
            ..Persona::from_template("Ada", PersonaTemplate::Default)
        };
        let prompt = persona.render_system_prompt();
        assert_eq!(prompt, persona.system_prompt);
    }

    #[test]
    fn toml_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ada.toml");
        let persona = Persona::from_template("Ada", PersonaTemplate::Assistant);
        persona.save(&path).unwrap();
        let loaded = Persona::load(&path).unwrap();
        assert_eq!(loaded, persona);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let persona: Persona = toml::from_str(
            r#"
            name = "Min"
            system_prompt = "You are Min."
            "#,
        )
        .unwrap();
        assert_eq!(persona.model, "llama3.1:8b");
        assert_eq!(persona.max_tokens, 2048);
        assert_eq!(persona.voice_language, "en");
        assert!(persona.goals.is_empty());
    }
}

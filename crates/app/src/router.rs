//! Voice command grammar
//!
//! The router is a pure classifier: it normalizes text and tests it against
//! an ordered rule list, first match wins. More specific grammars sit above
//! general ones so "let alice and bob talk" never falls into the stop rule.
//! Side effects belong to the orchestrator.

use regex::{Captures, Regex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateAgent { name: String },
    SwitchAgent { name: String },
    ListAgents,
    StartTalk { agent1: String, agent2: String },
    StopAgent { name: String },
    Exit,
    Help,
}

struct Rule {
    pattern: Regex,
    build: fn(&Captures) -> Command,
}

pub struct CommandRouter {
    rules: Vec<Rule>,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        let specs: [(&str, fn(&Captures) -> Command); 7] = [
            (
                r"create (?:a )?new (?:steve|agent) (?:named |called )?([a-z0-9_]+)",
                |c| Command::CreateAgent {
                    name: c[1].to_string(),
                },
            ),
            (r"switch to (?:steve |agent )?([a-z0-9_]+)", |c| {
                Command::SwitchAgent {
                    name: c[1].to_string(),
                }
            }),
            (r"list (?:all )?(?:steves?|agents?)", |_| Command::ListAgents),
            (
                r"let (?:steve )?([a-z0-9_]+) and (?:steve )?([a-z0-9_]+) talk",
                |c| Command::StartTalk {
                    agent1: c[1].to_string(),
                    agent2: c[2].to_string(),
                },
            ),
            (r"stop (?:steve |agent )?([a-z0-9_]+)", |c| {
                Command::StopAgent {
                    name: c[1].to_string(),
                }
            }),
            (r"^exit\b", |_| Command::Exit),
            (r"^(?:help|what can you do)", |_| Command::Help),
        ];

        let rules = specs
            .into_iter()
            .filter_map(|(pattern, build)| match Regex::new(pattern) {
                Ok(pattern) => Some(Rule { pattern, build }),
                Err(e) => {
                    tracing::warn!("invalid command grammar {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Classifies `text`. `None` means persona-directed content; the caller
    /// falls through to the active agent.
    pub fn parse(&self, text: &str) -> Option<Command> {
        let text = text.to_lowercase();
        let text = text.trim();
        for rule in &self.rules {
            if let Some(captures) = rule.pattern.captures(text) {
                return Some((rule.build)(&captures));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Command> {
        CommandRouter::new().parse(text)
    }

    #[test]
    fn create_variants() {
        for text in [
            "create a new steve named bob",
            "Create new agent called bob",
            "create a new steve bob",
        ] {
            assert_eq!(
                parse(text),
                Some(Command::CreateAgent {
                    name: "bob".to_string()
                }),
                "{text}"
            );
        }
    }

    #[test]
    fn switch_lowercases_the_name() {
        assert_eq!(
            parse("Switch to Steve Bob"),
            Some(Command::SwitchAgent {
                name: "bob".to_string()
            })
        );
    }

    #[test]
    fn list_variants() {
        assert_eq!(parse("list agents"), Some(Command::ListAgents));
        assert_eq!(parse("list all steves"), Some(Command::ListAgents));
    }

    #[test]
    fn talk_captures_both_agents() {
        assert_eq!(
            parse("let alice and steve bob talk"),
            Some(Command::StartTalk {
                agent1: "alice".to_string(),
                agent2: "bob".to_string()
            })
        );
    }

    #[test]
    fn stop_captures_agent_name() {
        assert_eq!(
            parse("stop steve bob"),
            Some(Command::StopAgent {
                name: "bob".to_string()
            })
        );
        assert_eq!(
            parse("stop agent alice"),
            Some(Command::StopAgent {
                name: "alice".to_string()
            })
        );
    }

    #[test]
    fn exit_and_help() {
        assert_eq!(parse("exit"), Some(Command::Exit));
        assert_eq!(parse("exit voxhive"), Some(Command::Exit));
        assert_eq!(parse("help"), Some(Command::Help));
        assert_eq!(parse("what can you do"), Some(Command::Help));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse("tell me about rust"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn classification_is_pure_and_repeatable() {
        let router = CommandRouter::new();
        let first = router.parse("switch to steve bob");
        let second = router.parse("switch to steve bob");
        assert_eq!(first, second);
    }
}

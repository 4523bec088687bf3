//! Application configuration
//!
//! Loaded from `voxhive.toml`. Every section and field has a default, and a
//! missing file just means defaults, so first runs need no setup.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use voxhive_foundation::AudioConfig;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// "http" or "null"
    pub backend: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Buffered audio before a forced flush
    pub buffer_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            backend: "null".to_string(),
            endpoint: "http://localhost:8080/transcribe".to_string(),
            timeout_secs: 60,
            buffer_secs: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub host: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// "jsonl" or "memory"
    pub backend: String,
    pub path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: "jsonl".to_string(),
            path: PathBuf::from("data/voxhive"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub max_agents: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { max_agents: 10 }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file is absent.
    /// A file that exists but fails to parse is an error; silently running
    /// with defaults after a typo would be worse.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load("/nonexistent/voxhive.toml").unwrap();
        assert_eq!(config.orchestrator.max_agents, 10);
        assert_eq!(config.stt.backend, "null");
        assert_eq!(config.audio.sample_rate, 16_000);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxhive.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[orchestrator]\nmax_agents = 3\n\n[stt]\nbackend = \"http\"\n"
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.orchestrator.max_agents, 3);
        assert_eq!(config.stt.backend, "http");
        assert_eq!(config.llm.host, "http://localhost:11434");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxhive.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}

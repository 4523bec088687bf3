use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

use voxhive_agent::{OllamaClient, Persona, PersonaTemplate};
use voxhive_app::config::AppConfig;
use voxhive_app::orchestrator::{AudioRoute, Orchestrator};
use voxhive_app::runtime;
use voxhive_foundation::{AppState, StateManager};
use voxhive_memory::{ConversationStore, JsonlStore, MemoryStore};
use voxhive_tts::{NullSynthesizer, TtsManager};

#[derive(Parser)]
#[command(name = "voxhive", about = "Voice-driven multi-agent persona coordinator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline
    Run {
        /// Input mode: "text" or "voice"
        #[arg(long, default_value = "text")]
        mode: String,
        #[arg(long, default_value = "voxhive.toml")]
        config: PathBuf,
        /// Persona TOML files to load at startup
        #[arg(long = "persona")]
        personas: Vec<PathBuf>,
        /// Feed a WAV file instead of the microphone (voice mode)
        #[arg(long)]
        wav: Option<PathBuf>,
        /// Input device name override
        #[arg(long, env = "VOXHIVE_DEVICE")]
        device: Option<String>,
    },
    /// Print effective configuration and collaborator reachability
    Status {
        #[arg(long, default_value = "voxhive.toml")]
        config: PathBuf,
    },
    /// List audio devices
    Devices,
}

fn init_logging() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "voxhive.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(guard);
    Ok(())
}

fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ConversationStore>> {
    match config.memory.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        _ => Ok(Arc::new(JsonlStore::open(&config.memory.path)?)),
    }
}

fn build_orchestrator(
    config: &AppConfig,
    personas: &[PathBuf],
) -> anyhow::Result<Orchestrator> {
    let store = open_store(config)?;
    let llm = Arc::new(OllamaClient::new(
        config.llm.host.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )?);
    if llm.check_connection() {
        tracing::info!(host = %config.llm.host, "connected to Ollama");
    } else {
        tracing::warn!(host = %config.llm.host, "Ollama unreachable, replies will fall back");
    }

    let tts = TtsManager::new(Box::new(NullSynthesizer));
    let mut orchestrator = Orchestrator::new(store, llm, tts, config.orchestrator.max_agents);

    if personas.is_empty() {
        orchestrator.create_agent_from_template("steve", PersonaTemplate::Default)?;
    } else {
        for path in personas {
            let persona = Persona::load(path)?;
            tracing::info!(path = %path.display(), agent = %persona.name, "persona loaded");
            orchestrator.add_agent(persona)?;
        }
    }
    Ok(orchestrator)
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            mode,
            config,
            personas,
            wav,
            device,
        } => {
            let mut config = AppConfig::load(&config)?;
            if device.is_some() {
                config.audio.device = device;
            }

            let state = StateManager::new();
            let mut orchestrator = build_orchestrator(&config, &personas)?;
            state.transition(AppState::Running)?;
            match mode.as_str() {
                "voice" => {
                    orchestrator.add_audio_input(match &wav {
                        Some(path) => format!("file:{}", path.display()),
                        None => "microphone".to_string(),
                    });
                    orchestrator.add_audio_output("default");
                    if let Some(active) = orchestrator.active_agent_name() {
                        let route = AudioRoute {
                            input_source: "microphone".to_string(),
                            target_agent: active.to_string(),
                            output_device: None,
                        };
                        orchestrator.add_route(route);
                    }
                    let orchestrator = Arc::new(Mutex::new(orchestrator));
                    runtime::run_voice(&config, orchestrator, wav.as_deref())?;
                }
                "text" => {
                    let orchestrator = Arc::new(Mutex::new(orchestrator));
                    runtime::run_text(orchestrator)?;
                }
                other => anyhow::bail!("unknown mode: {other} (expected \"text\" or \"voice\")"),
            }
            state.transition(AppState::Stopping)?;
            state.transition(AppState::Stopped)?;
            tracing::info!("shutdown complete");
        }
        Commands::Status { config } => {
            let config = AppConfig::load(&config)?;
            let llm = OllamaClient::new(
                config.llm.host.clone(),
                Duration::from_secs(config.llm.timeout_secs),
            )?;
            println!("memory backend: {}", config.memory.backend);
            println!("stt backend:    {}", config.stt.backend);
            println!("max agents:     {}", config.orchestrator.max_agents);
            println!(
                "ollama:         {} ({})",
                config.llm.host,
                if llm.check_connection() {
                    "reachable"
                } else {
                    "unreachable"
                }
            );
        }
        Commands::Devices => {
            println!("Input devices:");
            for name in voxhive_audio::list_input_devices() {
                println!("  {name}");
            }
            println!("Output devices:");
            for name in voxhive_audio::list_output_devices() {
                println!("  {name}");
            }
        }
    }

    Ok(())
}

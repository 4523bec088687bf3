//! Pipeline wiring for the two input modes
//!
//! Voice mode runs capture (or a WAV file) into the segmenter; transcribed
//! utterances go through the shared orchestrator. Text mode is a plain
//! stdin loop over the same orchestrator, so both modes exercise identical
//! routing. The orchestrator sits behind a mutex because `route` is not
//! safe for concurrent invocation.

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use voxhive_audio::{frame_queue, CaptureThread, Playback, WavFileSource};
use voxhive_foundation::{ShutdownGuard, ShutdownHandler};
use voxhive_stt::{
    HttpTranscriber, NullTranscriber, SegmenterConfig, StreamingSegmenter, Transcriber,
};

use crate::config::{AppConfig, SttConfig};
use crate::orchestrator::Orchestrator;

const FRAME_QUEUE_WARN_DEPTH: usize = 256;

/// Picks the transcription backend from config. An unusable HTTP backend
/// degrades to the null engine with a warning rather than refusing to start.
pub fn make_transcriber(config: &SttConfig) -> Box<dyn Transcriber> {
    match config.backend.as_str() {
        "http" => {
            match HttpTranscriber::new(
                config.endpoint.clone(),
                Duration::from_secs(config.timeout_secs),
            ) {
                Ok(t) => Box::new(t),
                Err(e) => {
                    tracing::warn!("http transcriber unavailable: {}, using null engine", e);
                    Box::new(NullTranscriber)
                }
            }
        }
        "null" => Box::new(NullTranscriber),
        other => {
            tracing::warn!(backend = %other, "unknown stt backend, using null engine");
            Box::new(NullTranscriber)
        }
    }
}

fn handle_utterance(orchestrator: &Mutex<Orchestrator>, playback: &Playback, text: &str) {
    tracing::info!(text = %text, "utterance");
    let (response, audio) = {
        let mut orchestrator = orchestrator.lock();
        let response = match orchestrator.route(text) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("routing failed: {}", e);
                return;
            }
        };
        let audio = orchestrator.synthesize_active(&response);
        (response, audio)
    };

    println!("{response}");
    if let Some(audio) = audio {
        if let Err(e) = playback.play(&audio.samples, audio.sample_rate) {
            tracing::warn!("playback failed: {}", e);
        }
    }
}

/// Voice mode. With `wav_file` set, the file is chunked through the same
/// queue the microphone would feed; otherwise the capture thread runs until
/// Ctrl-C or an exit command.
pub fn run_voice(
    config: &AppConfig,
    orchestrator: Arc<Mutex<Orchestrator>>,
    wav_file: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let (tx, rx) = frame_queue(FRAME_QUEUE_WARN_DEPTH);

    let playback = Playback::new(None);
    let transcriber = make_transcriber(&config.stt);
    let segmenter_config = SegmenterConfig {
        buffer_duration: Duration::from_secs(config.stt.buffer_secs),
        sample_rate: config.audio.sample_rate,
        ..SegmenterConfig::default()
    };
    let on_text = {
        let orchestrator = Arc::clone(&orchestrator);
        move |text: &str| handle_utterance(&orchestrator, &playback, text)
    };
    let mut segmenter =
        StreamingSegmenter::new(rx, transcriber, segmenter_config, on_text).spawn()?;

    match wav_file {
        Some(path) => {
            let source = WavFileSource::new(path, config.audio.chunk_size);
            let frames = source.run(&tx)?;
            tracing::info!(frames, "wav file fed into pipeline");
            drop(tx);
            segmenter.stop();
        }
        None => {
            let mut capture = CaptureThread::spawn(config.audio.clone(), tx)?;
            tracing::info!("listening; press Ctrl-C to stop");

            let shutdown = ShutdownHandler::install();
            wait_for_stop(&shutdown, &orchestrator);

            capture.stop();
            segmenter.stop();
        }
    }

    orchestrator.lock().stop();
    Ok(())
}

fn wait_for_stop(shutdown: &ShutdownGuard, orchestrator: &Mutex<Orchestrator>) {
    loop {
        if shutdown.wait(Duration::from_millis(200)) {
            break;
        }
        if !orchestrator.lock().is_running() {
            break;
        }
    }
}

/// Text mode: a stdin REPL over the same routing path voice uses.
pub fn run_text(orchestrator: Arc<Mutex<Orchestrator>>) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("VoxHive text mode. Type 'help' for commands, 'exit' to quit.");
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = {
            let mut orchestrator = orchestrator.lock();
            match orchestrator.route(line) {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("routing failed: {}", e);
                    continue;
                }
            }
        };
        println!("{response}");

        if !orchestrator.lock().is_running() {
            break;
        }
    }

    orchestrator.lock().stop();
    Ok(())
}

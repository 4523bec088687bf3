//! Frame queue to orchestrator, end to end, with fake transcription and
//! inference backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use parking_lot::Mutex as PlMutex;
use voxhive_agent::{ChatMessage, LlmClient, LlmError, Persona, PersonaTemplate};
use voxhive_app::orchestrator::Orchestrator;
use voxhive_audio::{frame_queue, AudioFrame};
use voxhive_memory::MemoryStore;
use voxhive_stt::{Segment, SegmenterConfig, StreamingSegmenter, Transcriber, TranscriptionError};
use voxhive_tts::{NullSynthesizer, TtsManager};

struct FakeLlm;

impl LlmClient for FakeLlm {
    fn chat(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        Ok("acknowledged".to_string())
    }
}

/// Returns scripted utterances, one per flushed segment.
struct ScriptedTranscriber {
    script: Vec<&'static str>,
    cursor: AtomicUsize,
}

impl Transcriber for ScriptedTranscriber {
    fn transcribe(&mut self, _segment: &Segment) -> Result<String, TranscriptionError> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.get(i).copied().unwrap_or("").to_string())
    }
}

fn frames(n: usize) -> Vec<AudioFrame> {
    (0..n)
        .map(|_| AudioFrame::new(vec![400i16; 512], 16_000, 1))
        .collect()
}

#[test]
fn spoken_command_switches_the_active_agent() {
    let orchestrator = {
        let mut orch = Orchestrator::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FakeLlm),
            TtsManager::new(Box::new(NullSynthesizer)),
            10,
        );
        orch.add_agent(Persona::from_template("Alice", PersonaTemplate::Default))
            .unwrap();
        orch.add_agent(Persona::from_template("Bob", PersonaTemplate::Creative))
            .unwrap();
        Arc::new(PlMutex::new(orch))
    };

    let (tx, rx) = frame_queue(64);
    let responses: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let on_text = {
        let orchestrator = Arc::clone(&orchestrator);
        let responses = Arc::clone(&responses);
        move |text: &str| {
            let response = orchestrator.lock().route(text).unwrap();
            responses.lock().unwrap().push(response);
        }
    };

    let transcriber = ScriptedTranscriber {
        script: vec!["switch to steve bob"],
        cursor: AtomicUsize::new(0),
    };
    let mut segmenter = StreamingSegmenter::new(
        rx,
        Box::new(transcriber),
        SegmenterConfig::default(),
        on_text,
    )
    .spawn().unwrap();

    for frame in frames(3) {
        tx.send(frame);
    }
    segmenter.stop();

    let responses = responses.lock().unwrap();
    assert_eq!(responses.len(), 1);
    assert!(responses[0].starts_with("Switched to"));
    assert_eq!(orchestrator.lock().active_agent_name(), Some("Bob"));
}

#[test]
fn spoken_text_reaches_the_active_agent_and_logs_turns() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = {
        let mut orch = Orchestrator::new(
            store.clone(),
            Arc::new(FakeLlm),
            TtsManager::new(Box::new(NullSynthesizer)),
            10,
        );
        orch.add_agent(Persona::from_template("Alice", PersonaTemplate::Default))
            .unwrap();
        Arc::new(PlMutex::new(orch))
    };

    let (tx, rx) = frame_queue(64);
    let responses: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let on_text = {
        let orchestrator = Arc::clone(&orchestrator);
        let responses = Arc::clone(&responses);
        move |text: &str| {
            let response = orchestrator.lock().route(text).unwrap();
            responses.lock().unwrap().push(response);
        }
    };

    let transcriber = ScriptedTranscriber {
        script: vec!["hello there"],
        cursor: AtomicUsize::new(0),
    };
    let mut segmenter = StreamingSegmenter::new(
        rx,
        Box::new(transcriber),
        SegmenterConfig::default(),
        on_text,
    )
    .spawn().unwrap();

    for frame in frames(2) {
        tx.send(frame);
    }
    segmenter.stop();

    assert_eq!(responses.lock().unwrap().as_slice(), ["acknowledged"]);
    // user turn + assistant turn in the durable log
    use voxhive_memory::ConversationStore;
    let recent = store.recent_messages("Alice", 10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].content, "hello there");
    assert_eq!(recent[1].content, "acknowledged");
}

//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use sales_assistant::voice::{
    RecognitionEvent, SpeechRecognizer, SpeechResult, SpeechSynthesizer, Utterance, Voice,
};
use sales_assistant::{
    Assistant, AssistantEvent, Config, Error, EventReceiver, EventSender, LanguageModel,
    ModelSession, Result, Screen, event_channel,
};

/// Write a product CSV with `rows` data rows
pub fn product_csv(rows: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp csv");
    writeln!(file, "model,hp,price").unwrap();
    for i in 1..=rows {
        writeln!(file, "MF {i},{},{}", 30 + i, 500_000 + i * 1000).unwrap();
    }
    file.flush().unwrap();
    file
}

/// Everything written to a [`RecordingScreen`]
#[derive(Debug, Default)]
pub struct ScreenLog {
    pub statuses: Vec<String>,
    pub responses: Vec<String>,
    pub alerts: Vec<String>,
    pub recording: bool,
}

/// Screen that remembers what it was told
pub struct RecordingScreen(pub Arc<Mutex<ScreenLog>>);

impl Screen for RecordingScreen {
    fn set_status(&mut self, text: &str) {
        self.0.lock().unwrap().statuses.push(text.to_string());
    }

    fn set_response(&mut self, text: &str) {
        self.0.lock().unwrap().responses.push(text.to_string());
    }

    fn alert(&mut self, message: &str) {
        self.0.lock().unwrap().alerts.push(message.to_string());
    }

    fn set_recording(&mut self, recording: bool) {
        self.0.lock().unwrap().recording = recording;
    }
}

/// Recognizer that hears queued transcripts and records each start
pub struct FakeRecognizer {
    pub events: EventSender,
    pub transcripts: VecDeque<RecognitionEvent>,
    pub started: Arc<Mutex<Vec<String>>>,
    pub stopped: Arc<Mutex<usize>>,
}

impl SpeechRecognizer for FakeRecognizer {
    fn start(&mut self, locale: &str) -> Result<()> {
        self.started.lock().unwrap().push(locale.to_string());
        if let Some(event) = self.transcripts.pop_front() {
            self.events
                .send(AssistantEvent::Recognition(event))
                .map_err(|_| Error::Stt("closed".to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) {
        *self.stopped.lock().unwrap() += 1;
    }

    fn is_listening(&self) -> bool {
        false
    }
}

/// Synthesizer that keeps every queued utterance
pub struct RecordingSynthesizer {
    pub voices: Arc<Mutex<Vec<Voice>>>,
    pub spoken: Arc<Mutex<Vec<Utterance>>>,
    pub cancelled: Arc<Mutex<usize>>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().unwrap().clone()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.spoken.lock().unwrap().push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        *self.cancelled.lock().unwrap() += 1;
    }
}

/// What the fake model saw
#[derive(Debug, Default)]
pub struct ModelLog {
    pub system_prompts: Vec<String>,
    pub prompts: Vec<String>,
}

/// Scripted language model
pub struct FakeModel {
    pub available: bool,
    pub reply: std::result::Result<String, String>,
    pub log: Arc<Mutex<ModelLog>>,
}

impl FakeModel {
    pub fn answering(reply: &str) -> Self {
        Self {
            available: true,
            reply: Ok(reply.to_string()),
            log: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            available: true,
            reply: Err(message.to_string()),
            log: Arc::default(),
        }
    }

    pub fn absent() -> Self {
        Self {
            available: false,
            reply: Ok(String::new()),
            log: Arc::default(),
        }
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn create_session(&self, system_prompt: &str) -> Result<Box<dyn ModelSession>> {
        self.log
            .lock()
            .unwrap()
            .system_prompts
            .push(system_prompt.to_string());
        Ok(Box::new(FakeSession {
            reply: self.reply.clone(),
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeSession {
    reply: std::result::Result<String, String>,
    log: Arc<Mutex<ModelLog>>,
}

#[async_trait]
impl ModelSession for FakeSession {
    async fn prompt(&mut self, input: &str) -> Result<String> {
        self.log.lock().unwrap().prompts.push(input.to_string());
        self.reply.clone().map_err(Error::Inference)
    }
}

/// An assistant wired to fakes, plus handles to inspect them
pub struct Harness {
    pub assistant: Assistant,
    pub events: EventReceiver,
    pub sender: EventSender,
    pub screen: Arc<Mutex<ScreenLog>>,
    pub spoken: Arc<Mutex<Vec<Utterance>>>,
    pub voices: Arc<Mutex<Vec<Voice>>>,
    pub started: Arc<Mutex<Vec<String>>>,
    pub stopped: Arc<Mutex<usize>>,
    pub cancelled: Arc<Mutex<usize>>,
    pub model: Arc<Mutex<ModelLog>>,
}

impl Harness {
    pub fn new(model: FakeModel, voices: Vec<Voice>, transcripts: &[&str]) -> Self {
        Self::with_events(
            model,
            voices,
            transcripts
                .iter()
                .map(|t| RecognitionEvent::Result(vec![SpeechResult::single(*t)]))
                .collect(),
        )
    }

    pub fn with_events(
        model: FakeModel,
        voices: Vec<Voice>,
        recognitions: Vec<RecognitionEvent>,
    ) -> Self {
        let (sender, events) = event_channel();
        let screen = Arc::new(Mutex::new(ScreenLog::default()));
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let voices = Arc::new(Mutex::new(voices));
        let started = Arc::new(Mutex::new(Vec::new()));
        let stopped = Arc::new(Mutex::new(0));
        let cancelled = Arc::new(Mutex::new(0));
        let model_log = Arc::clone(&model.log);

        let assistant = Assistant::new(
            &Config::default(),
            Box::new(FakeRecognizer {
                events: sender.clone(),
                transcripts: recognitions.into(),
                started: Arc::clone(&started),
                stopped: Arc::clone(&stopped),
            }),
            Box::new(RecordingSynthesizer {
                voices: Arc::clone(&voices),
                spoken: Arc::clone(&spoken),
                cancelled: Arc::clone(&cancelled),
            }),
            Arc::new(model),
            Box::new(RecordingScreen(Arc::clone(&screen))),
        );

        Self {
            assistant,
            events,
            sender,
            screen,
            spoken,
            voices,
            started,
            stopped,
            cancelled,
            model: model_log,
        }
    }

    /// Handle every event queued so far
    pub async fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.assistant.handle(event).await;
        }
    }

    pub fn last_status(&self) -> Option<String> {
        self.screen.lock().unwrap().statuses.last().cloned()
    }

    pub fn last_response(&self) -> Option<String> {
        self.screen.lock().unwrap().responses.last().cloned()
    }
}

/// Voices as a browser on an Indian-English system might report them
pub fn indian_voices() -> Vec<Voice> {
    vec![
        Voice::new("Rishi", "en-IN", "rishi"),
        Voice::new("Lekha", "hi-IN", "lekha"),
        Voice::new("Vani", "ta-IN", "vani"),
    ]
}

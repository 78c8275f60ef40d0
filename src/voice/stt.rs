//! Speech-to-text (STT) input
//!
//! Recognition is single-shot and final-only: one `start` yields at most one
//! [`RecognitionEvent`], delivered on the assistant's event channel.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::assistant::{AssistantEvent, EventSender};
use crate::{Error, Result};

/// One candidate transcript for a result
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// One recognized segment with its ranked alternatives
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpeechResult {
    pub alternatives: Vec<SpeechAlternative>,
}

impl SpeechResult {
    /// Result with a single, fully confident alternative
    #[must_use]
    pub fn single(transcript: impl Into<String>) -> Self {
        Self {
            alternatives: vec![SpeechAlternative {
                transcript: transcript.into(),
                confidence: 1.0,
            }],
        }
    }
}

/// Outcome of one recognition session
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Final results, best first
    Result(Vec<SpeechResult>),
    /// Speech ended without a usable transcript
    NoMatch,
    /// Recognizer failed
    Error(String),
}

impl RecognitionEvent {
    /// Top alternative of the first result
    #[must_use]
    pub fn top_transcript(&self) -> Option<&str> {
        match self {
            Self::Result(results) => results
                .first()?
                .alternatives
                .first()
                .map(|a| a.transcript.as_str()),
            Self::NoMatch | Self::Error(_) => None,
        }
    }
}

/// A speech recognizer owned by the assistant
pub trait SpeechRecognizer: Send {
    /// Begin listening in the given locale
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer cannot start
    fn start(&mut self, locale: &str) -> Result<()>;

    /// Stop listening without delivering a result
    fn stop(&mut self);

    /// Whether a session is open and has not delivered its result yet
    fn is_listening(&self) -> bool;
}

/// Terminal stand-in for a microphone
///
/// While listening, the next line offered through the paired [`KeyboardMic`]
/// becomes the transcript.
pub struct KeyboardRecognizer {
    locale: Arc<Mutex<Option<String>>>,
    events: EventSender,
}

/// Input side of a [`KeyboardRecognizer`]
#[derive(Clone)]
pub struct KeyboardMic {
    locale: Arc<Mutex<Option<String>>>,
    events: EventSender,
}

impl KeyboardRecognizer {
    /// Create a recognizer and the handle that feeds it typed lines
    #[must_use]
    pub fn new(events: EventSender) -> (Self, KeyboardMic) {
        let locale = Arc::new(Mutex::new(None));
        let mic = KeyboardMic {
            locale: Arc::clone(&locale),
            events: events.clone(),
        };
        (Self { locale, events }, mic)
    }
}

impl SpeechRecognizer for KeyboardRecognizer {
    fn start(&mut self, locale: &str) -> Result<()> {
        if self.events.is_closed() {
            return Err(Error::Stt("event channel closed".to_string()));
        }
        let mut active = self
            .locale
            .lock()
            .map_err(|_| Error::Stt("recognizer state poisoned".to_string()))?;
        *active = Some(locale.to_string());
        tracing::debug!(locale, "keyboard recognizer listening");
        Ok(())
    }

    fn stop(&mut self) {
        if let Ok(mut active) = self.locale.lock() {
            *active = None;
        }
    }

    fn is_listening(&self) -> bool {
        self.locale.lock().is_ok_and(|active| active.is_some())
    }
}

impl KeyboardMic {
    /// Deliver a typed line as the transcript if the recognizer is listening
    ///
    /// Returns false when nothing was listening.
    pub fn offer(&self, line: &str) -> bool {
        let Ok(mut active) = self.locale.lock() else {
            return false;
        };
        let Some(locale) = active.take() else {
            return false;
        };

        let line = line.trim();
        let event = if line.is_empty() {
            RecognitionEvent::NoMatch
        } else {
            RecognitionEvent::Result(vec![SpeechResult::single(line)])
        };

        tracing::debug!(locale = %locale, "keyboard transcript captured");
        self.events.send(AssistantEvent::Recognition(event)).is_ok()
    }

    /// Whether a typed line would currently be taken as speech
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.locale.lock().is_ok_and(|active| active.is_some())
    }
}

/// Recognizer that answers each `start` with the next queued transcript
///
/// An empty queue produces [`RecognitionEvent::NoMatch`].
pub struct ScriptedRecognizer {
    transcripts: VecDeque<String>,
    events: EventSender,
    locales: Vec<String>,
}

impl ScriptedRecognizer {
    /// Create a recognizer that will "hear" the given transcripts in order
    #[must_use]
    pub fn new(events: EventSender, transcripts: impl IntoIterator<Item = String>) -> Self {
        Self {
            transcripts: transcripts.into_iter().collect(),
            events,
            locales: Vec::new(),
        }
    }

    /// Locales passed to each `start`, oldest first
    #[must_use]
    pub fn started_locales(&self) -> &[String] {
        &self.locales
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&mut self, locale: &str) -> Result<()> {
        self.locales.push(locale.to_string());

        let event = self.transcripts.pop_front().map_or(RecognitionEvent::NoMatch, |t| {
            RecognitionEvent::Result(vec![SpeechResult::single(t)])
        });

        self.events
            .send(AssistantEvent::Recognition(event))
            .map_err(|_| Error::Stt("event channel closed".to_string()))
    }

    fn stop(&mut self) {}

    fn is_listening(&self) -> bool {
        false
    }
}

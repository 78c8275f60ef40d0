//! Assistant controller
//!
//! Owns the session state and every collaborator, and processes one event at
//! a time from a single channel:
//!
//! ```text
//! Idle ──load──▶ Ready ──record──▶ Listening ──transcript──▶ Thinking ──answer──▶ Done
//!                  ▲                   │ no match                 │ failure        │
//!                  └───────────────────┘                          ▼                │
//!                                      Listening ◀──record── Error / Done ◀────────┘
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::context::CsvContext;
use crate::display::{Screen, text};
use crate::inference::{InferenceClient, LanguageModel};
use crate::language::lang_code;
use crate::persona::{PersonaKind, resolve_profile};
use crate::voice::{
    RecognitionEvent, SpeechRecognizer, SpeechSynthesizer, Utterance, VoiceCatalog,
};
use crate::{Error, Result};

/// Sending half of the assistant's event channel
pub type EventSender = mpsc::UnboundedSender<AssistantEvent>;

/// Receiving half of the assistant's event channel
pub type EventReceiver = mpsc::UnboundedReceiver<AssistantEvent>;

/// Create the assistant's event channel
#[must_use]
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Everything the assistant reacts to
#[derive(Debug)]
pub enum AssistantEvent {
    /// A CSV file was selected
    LoadCsv(PathBuf),
    /// The record control was pressed
    Record,
    /// The recognizer finished a session
    Recognition(RecognitionEvent),
    /// The synthesizer's voice list changed
    VoicesChanged,
    /// A language display name was selected
    SelectLanguage(String),
    /// A voice persona was selected
    SelectPersona(PersonaKind),
    /// Abandon the open recording and silence queued speech
    Stop,
    /// Stop the event loop
    Shutdown,
}

/// Where the current question/answer turn stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// No CSV loaded yet
    Idle,
    /// CSV loaded, waiting for a question
    Ready,
    /// Recognizer open
    Listening,
    /// Waiting on the model
    Thinking,
    /// Answer shown and queued for speech
    Done,
    /// Last turn failed
    Error,
}

impl TurnState {
    /// Whether a turn is in flight and a new recording must be refused
    ///
    /// Events are handled one at a time and an answer completes within a
    /// single event, so a record request arriving mid-answer waits in the
    /// channel and starts the next turn once the answer is done.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Listening | Self::Thinking)
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Listening => "listening",
            Self::Thinking => "thinking",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// User selections and the loaded CSV
#[derive(Debug, Clone)]
pub struct Session {
    context: Option<CsvContext>,
    language: String,
    persona: PersonaKind,
    context_rows: usize,
}

impl Session {
    /// Fresh session with the configured selections and no CSV
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            context: None,
            language: config.language.clone(),
            persona: config.persona,
            context_rows: config.context_rows,
        }
    }

    /// Loaded CSV, if any
    #[must_use]
    pub const fn context(&self) -> Option<&CsvContext> {
        self.context.as_ref()
    }

    /// Selected language display name
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}

/// The assistant: one CSV, one recognizer, one model, one synthesizer
pub struct Assistant {
    session: Session,
    voices: VoiceCatalog,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    inference: InferenceClient,
    screen: Box<dyn Screen>,
    product_line: String,
    state: TurnState,
}

impl Assistant {
    /// Wire an assistant from its collaborators
    #[must_use]
    pub fn new(
        config: &Config,
        recognizer: Box<dyn SpeechRecognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        model: Arc<dyn LanguageModel>,
        screen: Box<dyn Screen>,
    ) -> Self {
        let mut voices = VoiceCatalog::new();
        voices.replace(synthesizer.voices());

        Self {
            session: Session::new(config),
            voices,
            recognizer,
            synthesizer,
            inference: InferenceClient::new(model, config.assistant.clone()),
            screen,
            product_line: config.assistant.product_line.clone(),
            state: TurnState::Idle,
        }
    }

    /// Current turn state
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Session selections and loaded CSV
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Cached synthesizer voices
    #[must_use]
    pub const fn voices(&self) -> &VoiceCatalog {
        &self.voices
    }

    /// Process events until [`AssistantEvent::Shutdown`] or the channel closes
    pub async fn run(&mut self, mut events: EventReceiver) {
        tracing::info!("assistant event loop started");
        while let Some(event) = events.recv().await {
            if !self.handle(event).await {
                break;
            }
        }
        tracing::info!("assistant event loop stopped");
    }

    /// Process one event; returns false when the loop should stop
    pub async fn handle(&mut self, event: AssistantEvent) -> bool {
        tracing::trace!(?event, state = %self.state, "handling event");

        let outcome = match event {
            AssistantEvent::LoadCsv(path) => self.load_csv(path).await,
            AssistantEvent::Record => self.record(),
            AssistantEvent::Recognition(result) => {
                self.on_recognition(result).await;
                Ok(())
            }
            AssistantEvent::VoicesChanged => {
                self.refresh_voices();
                Ok(())
            }
            AssistantEvent::SelectLanguage(name) => {
                self.select_language(name);
                Ok(())
            }
            AssistantEvent::SelectPersona(kind) => {
                self.select_persona(kind);
                Ok(())
            }
            AssistantEvent::Stop => {
                self.cancel();
                Ok(())
            }
            AssistantEvent::Shutdown => return false,
        };

        if let Err(e) = outcome {
            tracing::debug!(error = %e, "event ended without completing");
        }
        true
    }

    /// Parse a CSV file and make it the grounding context
    ///
    /// A failed parse keeps the previous context.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub async fn load_csv(&mut self, path: PathBuf) -> Result<()> {
        self.screen.set_status(text::PARSING);

        let limit = self.session.context_rows;
        let parsed = tokio::task::spawn_blocking(move || CsvContext::from_path(&path, limit))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))
            .and_then(|result| result);

        match parsed {
            Ok(context) => {
                self.install_context(context);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "CSV load failed");
                self.screen.set_response(&format!("{}{e}", text::CSV_ERROR_PREFIX));
                self.screen.set_status(text::ERROR);
                Err(e)
            }
        }
    }

    /// Replace the grounding context with an already parsed CSV
    pub fn install_context(&mut self, context: CsvContext) {
        let total = context.total_rows();
        tracing::info!(total, kept = context.rows().len(), "CSV context replaced");

        self.session.context = Some(context);
        self.screen.set_status(&text::loaded(total));
        self.screen.set_response(&text::ready(&self.product_line));

        if matches!(self.state, TurnState::Idle | TurnState::Done | TurnState::Error) {
            self.state = TurnState::Ready;
        }
    }

    /// Start listening for a question
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] while a turn is in flight, [`Error::MissingContext`]
    /// (after alerting the user) when no CSV is loaded, or the recognizer's error
    pub fn record(&mut self) -> Result<()> {
        if self.state.is_busy() {
            tracing::warn!(state = %self.state, "record ignored, turn in progress");
            return Err(Error::Busy(self.state.to_string()));
        }

        if self.session.context.is_none() {
            self.screen.alert(text::MISSING_CONTEXT);
            return Err(Error::MissingContext);
        }

        let locale = lang_code(&self.session.language);
        self.recognizer.start(locale)?;
        self.screen.set_recording(true);
        self.screen.set_status(text::LISTENING);
        self.state = TurnState::Listening;

        tracing::debug!(locale, "listening");
        Ok(())
    }

    /// Handle the recognizer's single result for the open session
    pub async fn on_recognition(&mut self, event: RecognitionEvent) {
        if self.state != TurnState::Listening {
            tracing::debug!(state = %self.state, "ignoring recognition event outside a recording");
            return;
        }

        self.screen.set_recording(false);

        let Some(transcript) = event.top_transcript().map(ToString::to_string) else {
            match &event {
                RecognitionEvent::Error(message) => {
                    tracing::warn!(error = %message, "speech recognition failed");
                }
                _ => tracing::warn!("no speech recognized"),
            }
            self.state = TurnState::Ready;
            return;
        };

        self.screen.set_status(&text::query(&transcript));
        self.ask(&transcript).await;
    }

    /// Answer a question from the loaded CSV and speak the answer
    ///
    /// Every failure ends the turn in [`TurnState::Error`].
    pub async fn ask(&mut self, query: &str) {
        self.state = TurnState::Thinking;

        let language = self.session.language.clone();
        let lang = lang_code(&language);

        let Some(context) = self.session.context.as_ref() else {
            self.screen.alert(text::MISSING_CONTEXT);
            self.state = TurnState::Error;
            return;
        };

        if let Err(e) = self.inference.check_available().await {
            tracing::debug!(error = %e, "turn ended before inference");
            self.screen.set_response(text::MODEL_MISSING);
            self.state = TurnState::Error;
            return;
        }

        self.screen.set_status(text::THINKING);

        let answered = self.inference.answer(query, context, &language).await;
        match answered {
            Ok(answer) => {
                self.screen.set_response(&answer);
                self.speak(&answer, lang);
                self.screen.set_status(text::DONE);
                self.state = TurnState::Done;
            }
            Err(e) => {
                tracing::warn!(error = %e, "inference failed");
                self.screen.set_response(&format!("{}{e}", text::AI_ERROR_PREFIX));
                self.screen.set_status(text::ERROR);
                self.state = TurnState::Error;
            }
        }
    }

    /// Queue text for speech with the selected persona
    pub fn speak(&mut self, text: &str, lang: &str) {
        let profile = resolve_profile(self.session.persona, lang, self.voices.voices());
        tracing::debug!(
            persona = %self.session.persona,
            voice = profile.voice.as_ref().map(|v| v.name.as_str()),
            lang,
            "queueing answer for speech"
        );

        let utterance = Utterance::new(text).styled(profile, lang);
        if let Err(e) = self.synthesizer.speak(utterance) {
            tracing::warn!(error = %e, "failed to queue speech");
        }
    }

    /// Pull the synthesizer's current voice list into the cache
    pub fn refresh_voices(&mut self) {
        self.voices.replace(self.synthesizer.voices());
    }

    /// Select the answer language by display name
    pub fn select_language(&mut self, name: String) {
        tracing::info!(language = %name, code = lang_code(&name), "language selected");
        self.session.language = name;
    }

    /// Select the voice persona
    pub fn select_persona(&mut self, kind: PersonaKind) {
        tracing::info!(persona = %kind, "persona selected");
        self.session.persona = kind;
    }

    /// Wait for queued speech to finish playing
    pub async fn finish_speaking(&mut self) {
        self.synthesizer.drain().await;
    }

    /// Abandon an open recording and any queued speech
    ///
    /// A recognition result that arrives afterwards is ignored.
    pub fn cancel(&mut self) {
        if self.state == TurnState::Listening {
            tracing::info!(recognizer_open = self.recognizer.is_listening(), "recording abandoned");
            self.recognizer.stop();
            self.screen.set_recording(false);
            self.state = if self.session.context.is_some() {
                TurnState::Ready
            } else {
                TurnState::Idle
            };
        }
        self.synthesizer.cancel();
    }
}

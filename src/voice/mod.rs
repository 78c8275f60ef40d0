//! Voice processing module
//!
//! Speech input and output are collaborators behind traits so the assistant
//! loop never touches a platform API directly. The voice list is cached here
//! and replaced wholesale whenever the synthesizer reports a change.

mod espeak;
mod stt;
mod tts;

pub use espeak::EspeakSynthesizer;
pub use stt::{
    KeyboardMic, KeyboardRecognizer, RecognitionEvent, ScriptedRecognizer, SpeechAlternative,
    SpeechRecognizer, SpeechResult,
};
pub use tts::{SilentSynthesizer, SpeechSynthesizer, Utterance};

/// A synthesis voice offered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Display name
    pub name: String,

    /// BCP 47 locale tag (e.g. "hi-IN")
    pub lang: String,

    /// Synthesizer-specific identifier used to select the voice
    pub id: String,
}

impl Voice {
    /// Create a voice entry
    #[must_use]
    pub fn new(name: impl Into<String>, lang: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            id: id.into(),
        }
    }
}

/// Cached list of available voices
#[derive(Debug, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
    generation: u64,
}

impl VoiceCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached list with the latest one reported by the platform
    pub fn replace(&mut self, voices: Vec<Voice>) {
        self.generation += 1;
        tracing::debug!(
            count = voices.len(),
            generation = self.generation,
            "voice list refreshed"
        );
        self.voices = voices;
    }

    /// Cached voices, in platform order
    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Number of refreshes seen so far
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the platform has reported any voices yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

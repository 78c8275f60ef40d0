//! Text-to-speech (TTS) output
//!
//! Synthesizers own a FIFO of utterances. `speak` enqueues and returns;
//! consecutive requests play back to back rather than interrupting.

use async_trait::async_trait;

use crate::Result;
use crate::persona::VoiceProfile;
use crate::voice::Voice;

/// Text plus the voice settings it should be spoken with
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` lets the synthesizer pick from `lang`
    pub voice: Option<Voice>,
    pub pitch: f32,
    pub rate: f32,
    /// BCP 47 locale tag
    pub lang: String,
}

impl Utterance {
    /// Utterance with platform-default voice, pitch and rate
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            pitch: 1.0,
            rate: 1.0,
            lang: String::new(),
        }
    }

    /// Apply a resolved persona profile and locale
    #[must_use]
    pub fn styled(mut self, profile: VoiceProfile, lang: &str) -> Self {
        self.voice = profile.voice;
        self.pitch = profile.pitch;
        self.rate = profile.rate;
        self.lang = lang.to_string();
        self
    }
}

/// A speech synthesizer owned by the assistant
#[async_trait]
pub trait SpeechSynthesizer: Send {
    /// Voices currently known to the synthesizer
    fn voices(&self) -> Vec<Voice>;

    /// Queue an utterance for playback
    ///
    /// # Errors
    ///
    /// Returns error if the synthesizer is no longer accepting work
    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    /// Drop every utterance that has not started playing yet
    fn cancel(&mut self);

    /// Wait until everything queued so far has been played
    async fn drain(&mut self) {}
}

/// Synthesizer that logs instead of speaking (speech disabled)
#[derive(Debug, Default)]
pub struct SilentSynthesizer {
    spoken: usize,
}

impl SilentSynthesizer {
    /// Create a silent synthesizer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of utterances accepted so far
    #[must_use]
    pub const fn spoken(&self) -> usize {
        self.spoken
    }
}

#[async_trait]
impl SpeechSynthesizer for SilentSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.spoken += 1;
        tracing::info!(
            lang = %utterance.lang,
            pitch = utterance.pitch,
            rate = utterance.rate,
            chars = utterance.text.len(),
            "speech disabled, skipping utterance"
        );
        Ok(())
    }

    fn cancel(&mut self) {}
}

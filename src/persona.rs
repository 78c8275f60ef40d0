//! Voice personas
//!
//! A persona is a named pitch/rate styling applied to synthesized answers.
//! Resolution against the current voice list is a pure lookup so it can be
//! re-run on every speak request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::voice::Voice;

/// Speech styling selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum PersonaKind {
    MaleBass,
    #[default]
    MaleBaritone,
    FemaleContralto,
    FemaleMezzo,
    /// Any label outside the selector; platform pitch and rate
    Neutral,
}

impl PersonaKind {
    /// Named personas, in selector order
    pub const ALL: [Self; 4] = [
        Self::MaleBass,
        Self::MaleBaritone,
        Self::FemaleContralto,
        Self::FemaleMezzo,
    ];

    /// Parse a selector label, mapping unknown labels to [`PersonaKind::Neutral`]
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "male-bass" => Self::MaleBass,
            "male-baritone" => Self::MaleBaritone,
            "female-contralto" => Self::FemaleContralto,
            "female-mezzo" => Self::FemaleMezzo,
            _ => Self::Neutral,
        }
    }

    /// Selector label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MaleBass => "male-bass",
            Self::MaleBaritone => "male-baritone",
            Self::FemaleContralto => "female-contralto",
            Self::FemaleMezzo => "female-mezzo",
            Self::Neutral => "neutral",
        }
    }

    /// Pitch multiplier (1.0 = platform default)
    #[must_use]
    pub const fn pitch(self) -> f32 {
        match self {
            Self::MaleBass => 0.5,
            Self::MaleBaritone => 0.8,
            Self::FemaleContralto => 0.85,
            Self::FemaleMezzo => 1.2,
            Self::Neutral => 1.0,
        }
    }

    /// Speaking rate multiplier (1.0 = platform default)
    #[must_use]
    pub const fn rate(self) -> f32 {
        match self {
            Self::MaleBass => 0.85,
            Self::FemaleContralto => 0.9,
            Self::MaleBaritone | Self::FemaleMezzo | Self::Neutral => 1.0,
        }
    }
}

impl From<&str> for PersonaKind {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<String> for PersonaKind {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<PersonaKind> for String {
    fn from(kind: PersonaKind) -> Self {
        kind.label().to_string()
    }
}

impl fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Synthesis settings derived for one speak request
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceProfile {
    /// Chosen voice; `None` leaves the choice to the synthesizer
    pub voice: Option<Voice>,
    pub pitch: f32,
    pub rate: f32,
}

/// Resolve a persona against the available voices
///
/// Picks the first voice whose locale starts with `lang_code`, then the first
/// voice of any locale, then no voice at all.
#[must_use]
pub fn resolve_profile(kind: PersonaKind, lang_code: &str, voices: &[Voice]) -> VoiceProfile {
    let voice = voices
        .iter()
        .find(|v| v.lang.starts_with(lang_code))
        .or_else(|| voices.first())
        .cloned();

    VoiceProfile {
        voice,
        pitch: kind.pitch(),
        rate: kind.rate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str) -> Voice {
        Voice::new(name, lang, name)
    }

    #[test]
    fn named_personas_have_fixed_styling() {
        let table = [
            ("male-bass", 0.5, 0.85),
            ("male-baritone", 0.8, 1.0),
            ("female-contralto", 0.85, 0.9),
            ("female-mezzo", 1.2, 1.0),
        ];

        for (label, pitch, rate) in table {
            let kind = PersonaKind::from_label(label);
            assert_eq!(kind.label(), label);
            assert!((kind.pitch() - pitch).abs() < f32::EPSILON, "{label} pitch");
            assert!((kind.rate() - rate).abs() < f32::EPSILON, "{label} rate");
        }
    }

    #[test]
    fn unknown_label_is_neutral() {
        let kind = PersonaKind::from_label("robot");
        assert_eq!(kind, PersonaKind::Neutral);
        assert!((kind.pitch() - 1.0).abs() < f32::EPSILON);
        assert!((kind.rate() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn prefers_voice_matching_language() {
        let voices = [voice("Samantha", "en-US"), voice("Lekha", "hi-IN")];
        let profile = resolve_profile(PersonaKind::MaleBass, "hi-IN", &voices);

        assert_eq!(profile.voice.unwrap().name, "Lekha");
    }

    #[test]
    fn falls_back_to_first_voice() {
        let voices = [voice("Samantha", "en-US"), voice("Thomas", "fr-FR")];
        let profile = resolve_profile(PersonaKind::FemaleMezzo, "ta-IN", &voices);

        assert_eq!(profile.voice.unwrap().name, "Samantha");
    }

    #[test]
    fn no_voices_means_platform_default() {
        let profile = resolve_profile(PersonaKind::MaleBaritone, "en-IN", &[]);

        assert!(profile.voice.is_none());
        assert!((profile.pitch - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn deserializes_from_label() {
        let kind: PersonaKind = serde_json::from_str(r#""female-contralto""#).unwrap();
        assert_eq!(kind, PersonaKind::FemaleContralto);

        let unknown: PersonaKind = serde_json::from_str(r#""tenor""#).unwrap();
        assert_eq!(unknown, PersonaKind::Neutral);
    }
}

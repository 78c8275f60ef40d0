//! Language selection
//!
//! Display names map through a fixed table to BCP 47 locale tags. The display
//! name is what the model is told to answer in; the tag drives the recognizer,
//! the synthesizer and voice filtering.

use std::fmt;

/// Locale used for any display name outside the table
pub const DEFAULT_LANG_CODE: &str = "en-IN";

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Hindi,
    Tamil,
    Telugu,
    Marathi,
}

impl Language {
    /// All supported languages, in selector order
    pub const ALL: [Self; 5] = [
        Self::English,
        Self::Hindi,
        Self::Tamil,
        Self::Telugu,
        Self::Marathi,
    ];

    /// Look up a language by its display name (exact match)
    #[must_use]
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.display_name() == name)
    }

    /// Human-readable name shown in the selector
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Marathi => "Marathi",
        }
    }

    /// BCP 47 locale tag
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en-IN",
            Self::Hindi => "hi-IN",
            Self::Tamil => "ta-IN",
            Self::Telugu => "te-IN",
            Self::Marathi => "mr-IN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Map a display name to its locale tag, falling back to [`DEFAULT_LANG_CODE`]
#[must_use]
pub fn lang_code(display_name: &str) -> &'static str {
    Language::from_display_name(display_name).map_or(DEFAULT_LANG_CODE, Language::code)
}

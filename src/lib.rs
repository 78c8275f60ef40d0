//! Sales Assistant - voice Q&A over a product CSV with an on-device model
//!
//! This library provides the pieces of the assistant:
//! - CSV grounding context (bounded, serialized for the prompt)
//! - Language table and voice personas
//! - Speech input and output behind owned collaborator traits
//! - Grounded inference against a local model runtime
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Screen                           │
//! │   Status  │  Response  │  Alerts  │  Recording      │
//! └────────────────────┬────────────────────────────────┘
//!                      │ events
//! ┌────────────────────▼────────────────────────────────┐
//! │                   Assistant                          │
//! │   Session (CSV, language, persona)  │  Voice cache  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              On-device collaborators                 │
//! │   Recognizer  │  Local model  │  Synthesizer        │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod assistant;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod inference;
pub mod language;
pub mod persona;
pub mod prompt;
pub mod voice;

pub use assistant::{
    Assistant, AssistantEvent, EventReceiver, EventSender, Session, TurnState, event_channel,
};
pub use config::Config;
pub use context::{CsvContext, DEFAULT_CONTEXT_ROWS, Row};
pub use display::{ConsoleScreen, Screen};
pub use error::{Error, Result};
pub use inference::{InferenceClient, LanguageModel, LocalModel, ModelSession};
pub use language::{DEFAULT_LANG_CODE, Language, lang_code};
pub use persona::{PersonaKind, VoiceProfile, resolve_profile};

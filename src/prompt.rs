//! System instruction for grounded answers

use crate::config::AssistantConfig;

/// Build the system instruction for one question
///
/// The CSV text is embedded verbatim. The model is told to answer only from
/// it, in `language` (a display name such as "Hindi"), and in a tone pitched
/// at the configured audience.
#[must_use]
pub fn build_system_prompt(assistant: &AssistantConfig, csv_text: &str, language: &str) -> String {
    format!(
        "You are an expert {name}.\n\
         Analyze this CSV data: {csv_text}.\n\
         Answer the user's question based ONLY on this data.\n\
         Crucial: You MUST respond in {language} language only.\n\
         Keep the answer technical yet easy for {audience} to understand.",
        name = assistant.name,
        audience = assistant.audience,
    )
}

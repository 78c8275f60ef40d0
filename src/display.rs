//! User-facing text surfaces
//!
//! The assistant writes to two plain-text regions (status and response),
//! raises blocking alerts, and toggles a recording indicator.

use std::io::Write;

/// Literal status and response texts
pub mod text {
    pub const PARSING: &str = "Status: Parsing CSV...";
    pub const LISTENING: &str = "Status: Listening...";
    pub const THINKING: &str = "Status: Local AI is thinking...";
    pub const DONE: &str = "Status: Done (Zero-Cloud Inference)";
    pub const ERROR: &str = "Status: Error";

    pub const MISSING_CONTEXT: &str = "Please upload the Sales CSV first!";
    pub const MODEL_MISSING: &str =
        "Error: On-device model not detected. Ensure the local model runtime is running.";
    pub const AI_ERROR_PREFIX: &str = "AI Error: ";
    pub const CSV_ERROR_PREFIX: &str = "CSV Error: ";

    /// Status after a CSV load; `total` counts every parsed row
    #[must_use]
    pub fn loaded(total: usize) -> String {
        format!("Status: {total} Models Loaded (Offline)")
    }

    /// Status echoing the recognized question
    #[must_use]
    pub fn query(transcript: &str) -> String {
        format!("Query: \"{transcript}\"")
    }

    /// Response text once a CSV is ready to be questioned
    #[must_use]
    pub fn ready(product_line: &str) -> String {
        format!("Ready. Ask a question about {product_line} models.")
    }
}

/// Where the assistant shows progress and answers
pub trait Screen: Send {
    /// Replace the status line
    fn set_status(&mut self, text: &str);

    /// Replace the response area
    fn set_response(&mut self, text: &str);

    /// Show a message the user must acknowledge
    fn alert(&mut self, message: &str);

    /// Toggle the recording indicator
    fn set_recording(&mut self, recording: bool);
}

/// Terminal screen
#[derive(Debug, Default)]
pub struct ConsoleScreen {
    recording: bool,
}

impl ConsoleScreen {
    /// Create a console screen
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Screen for ConsoleScreen {
    fn set_status(&mut self, text: &str) {
        println!("{text}");
    }

    fn set_response(&mut self, text: &str) {
        println!("\n{text}\n");
    }

    fn alert(&mut self, message: &str) {
        eprintln!("[!] {message}");
    }

    fn set_recording(&mut self, recording: bool) {
        if recording && !self.recording {
            print!("[rec] ");
            std::io::stdout().flush().ok();
        }
        self.recording = recording;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dynamic_texts() {
        assert_eq!(text::loaded(30), "Status: 30 Models Loaded (Offline)");
        assert_eq!(
            text::query("what is the price?"),
            "Query: \"what is the price?\""
        );
        assert_eq!(
            text::ready("Massey Ferguson"),
            "Ready. Ask a question about Massey Ferguson models."
        );
    }
}

//! On-device speech through the `espeak-ng` binary

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use crate::assistant::{AssistantEvent, EventSender};
use crate::voice::{SpeechSynthesizer, Utterance, Voice};
use crate::{Error, Result};

/// Binaries tried, in order, when none is configured
const CANDIDATE_BINARIES: [&str; 2] = ["espeak-ng", "espeak"];

/// espeak pitch at multiplier 1.0 (range 0-99)
const BASE_PITCH: f32 = 50.0;

/// espeak words per minute at multiplier 1.0
const BASE_WPM: f32 = 175.0;

enum Job {
    Speak { utterance: Utterance, generation: u64 },
    Barrier(oneshot::Sender<()>),
}

/// Speaks utterances one at a time through `espeak-ng`
pub struct EspeakSynthesizer {
    voices: Arc<Mutex<Vec<Voice>>>,
    queue: mpsc::UnboundedSender<Job>,
    generation: Arc<AtomicU64>,
}

impl EspeakSynthesizer {
    /// Find the synthesizer binary
    ///
    /// # Errors
    ///
    /// Returns error if neither the configured binary nor a default one is on PATH
    pub fn locate(configured: Option<&str>) -> Result<PathBuf> {
        if let Some(bin) = configured {
            return which::which(bin)
                .map_err(|e| Error::Tts(format!("synthesizer {bin} not found: {e}")));
        }

        CANDIDATE_BINARIES
            .iter()
            .find_map(|bin| which::which(bin).ok())
            .ok_or_else(|| Error::Tts("espeak-ng not found on PATH".to_string()))
    }

    /// Start the playback worker and load the voice list in the background
    ///
    /// Sends [`AssistantEvent::VoicesChanged`] once the list is available.
    #[must_use]
    pub fn spawn(binary: PathBuf, events: EventSender) -> Self {
        let voices = Arc::new(Mutex::new(Vec::new()));
        let generation = Arc::new(AtomicU64::new(0));
        let (queue, jobs) = mpsc::unbounded_channel();

        tokio::spawn(load_voices(binary.clone(), Arc::clone(&voices), events));
        tokio::spawn(playback_worker(binary, jobs, Arc::clone(&generation)));

        Self {
            voices,
            queue,
            generation,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    fn voices(&self) -> Vec<Voice> {
        self.voices.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.queue
            .send(Job::Speak {
                utterance,
                generation,
            })
            .map_err(|_| Error::Tts("playback worker stopped".to_string()))
    }

    fn cancel(&mut self) {
        let cancelled = self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(generation = cancelled + 1, "speech queue cancelled");
    }

    async fn drain(&mut self) {
        let (tx, rx) = oneshot::channel();
        if self.queue.send(Job::Barrier(tx)).is_ok() {
            rx.await.ok();
        }
    }
}

async fn load_voices(binary: PathBuf, voices: Arc<Mutex<Vec<Voice>>>, events: EventSender) {
    let output = match Command::new(&binary).arg("--voices").output().await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::warn!(status = %output.status, "voice listing failed");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to run synthesizer for voice listing");
            return;
        }
    };

    let parsed = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
    tracing::info!(count = parsed.len(), "synthesizer voices loaded");

    if let Ok(mut cached) = voices.lock() {
        *cached = parsed;
    }
    events.send(AssistantEvent::VoicesChanged).ok();
}

async fn playback_worker(
    binary: PathBuf,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    generation: Arc<AtomicU64>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Speak {
                utterance,
                generation: queued_at,
            } => {
                if queued_at != generation.load(Ordering::SeqCst) {
                    tracing::debug!("skipping cancelled utterance");
                    continue;
                }
                if let Err(e) = speak_once(&binary, &utterance).await {
                    tracing::warn!(error = %e, "speech synthesis failed");
                }
            }
            Job::Barrier(done) => {
                done.send(()).ok();
            }
        }
    }
}

async fn speak_once(binary: &Path, utterance: &Utterance) -> Result<()> {
    let args = command_args(utterance);
    tracing::debug!(?args, chars = utterance.text.len(), "speaking");

    let mut child = Command::new(binary)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(utterance.text.as_bytes()).await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Tts(format!(
            "{} exited with {}: {}",
            binary.display(),
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Build the espeak arguments for an utterance
fn command_args(utterance: &Utterance) -> Vec<String> {
    let mut args = vec!["--stdin".to_string()];

    if let Some(voice) = select_voice(utterance) {
        args.push("-v".to_string());
        args.push(voice);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pitch = (utterance.pitch * BASE_PITCH).round().clamp(0.0, 99.0) as u32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let wpm = (utterance.rate * BASE_WPM).round().clamp(80.0, 450.0) as u32;

    args.extend([
        "-p".to_string(),
        pitch.to_string(),
        "-s".to_string(),
        wpm.to_string(),
    ]);
    args
}

/// Pick the espeak voice for an utterance
///
/// A chosen voice wins unless it speaks a different language than the
/// utterance, in which case the utterance's primary language subtag is used.
fn select_voice(utterance: &Utterance) -> Option<String> {
    let lang = primary_subtag(&utterance.lang);

    match (&utterance.voice, lang) {
        (Some(voice), Some(lang)) if primary_subtag(&voice.lang) != Some(lang) => {
            Some(lang.to_string())
        }
        (Some(voice), _) => Some(voice.id.clone()),
        (None, lang) => lang.map(ToString::to_string),
    }
}

fn primary_subtag(tag: &str) -> Option<&str> {
    tag.split('-').next().filter(|s| !s.is_empty())
}

/// Parse `espeak-ng --voices` output
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  hi              --/M      Hindi              inc/hi
/// ```
fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let lang = fields.get(1)?;
            let name = fields.get(3)?;
            Some(Voice::new(name.replace('_', " "), normalize_tag(lang), *lang))
        })
        .collect()
}

/// Uppercase a two-letter region subtag ("en-us" -> "en-US")
fn normalize_tag(tag: &str) -> String {
    tag.split('-')
        .enumerate()
        .map(|(i, part)| {
            if i == 1 && part.len() == 2 {
                part.to_uppercase()
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

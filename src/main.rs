use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use sales_assistant::voice::{
    EspeakSynthesizer, KeyboardMic, KeyboardRecognizer, ScriptedRecognizer, SilentSynthesizer,
    SpeechSynthesizer,
};
use sales_assistant::{
    Assistant, AssistantEvent, Config, ConsoleScreen, EventSender, Language, LocalModel,
    PersonaKind, TurnState, event_channel,
};

/// Sales Assistant - ask spoken questions about a product CSV, answered offline
#[derive(Parser)]
#[command(name = "sales-assistant", version, about)]
struct Cli {
    /// Answer language (English, Hindi, Tamil, Telugu, Marathi)
    #[arg(short, long, env = "SALES_ASSISTANT_LANGUAGE")]
    language: Option<String>,

    /// Voice persona (male-bass, male-baritone, female-contralto, female-mezzo)
    #[arg(short, long, env = "SALES_ASSISTANT_PERSONA")]
    persona: Option<String>,

    /// Base URL of the local OpenAI-compatible model runtime
    #[arg(long, env = "SALES_ASSISTANT_MODEL_URL")]
    model_url: Option<String>,

    /// Print answers without speaking them
    #[arg(long)]
    no_speech: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session: load a CSV, then :record and type your question
    Chat {
        /// CSV file to load at start
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Answer one question about a CSV and speak the answer
    Ask {
        /// CSV file to question
        #[arg(long)]
        csv: PathBuf,
        /// The question, as it would have been spoken
        question: String,
    },
    /// List the synthesizer's voices
    Voices,
    /// List voice personas and supported languages
    Personas,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,sales_assistant=info",
        1 => "info,sales_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;
    if let Some(language) = cli.language {
        config.language = language;
    }
    if let Some(persona) = cli.persona.as_deref() {
        config.persona = PersonaKind::from_label(persona);
    }
    if let Some(url) = cli.model_url {
        config.model.base_url = url;
    }
    if cli.no_speech {
        config.speech.enabled = false;
    }
    config.validate()?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Command::Chat { csv } => chat(&config, csv).await.map(|()| ExitCode::SUCCESS),
        Command::Ask { csv, question } => ask(&config, csv, question).await,
        Command::Voices => list_voices(&config).await.map(|()| ExitCode::SUCCESS),
        Command::Personas => {
            list_personas();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Interactive session driven by typed commands
async fn chat(config: &Config, csv: Option<PathBuf>) -> anyhow::Result<()> {
    let (events, receiver) = event_channel();
    let (recognizer, mic) = KeyboardRecognizer::new(events.clone());

    let mut assistant = Assistant::new(
        config,
        Box::new(recognizer),
        build_synthesizer(config, events.clone()),
        Arc::new(LocalModel::new(&config.model)?),
        Box::new(ConsoleScreen::new()),
    );

    if let Some(path) = csv {
        events.send(AssistantEvent::LoadCsv(path))?;
    }

    print_help();
    tokio::spawn(read_commands(events, mic));

    assistant.run(receiver).await;
    assistant.finish_speaking().await;
    Ok(())
}

/// One turn end to end
async fn ask(config: &Config, csv: PathBuf, question: String) -> anyhow::Result<ExitCode> {
    let (events, mut receiver) = event_channel();
    let recognizer = ScriptedRecognizer::new(events.clone(), [question]);

    let mut assistant = Assistant::new(
        config,
        Box::new(recognizer),
        build_synthesizer(config, events.clone()),
        Arc::new(LocalModel::new(&config.model)?),
        Box::new(ConsoleScreen::new()),
    );

    if assistant.load_csv(csv).await.is_err() {
        return Ok(ExitCode::FAILURE);
    }
    assistant.record()?;

    while let Ok(event) = receiver.try_recv() {
        assistant.handle(event).await;
    }
    assistant.finish_speaking().await;

    Ok(if assistant.state() == TurnState::Done {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn list_voices(config: &Config) -> anyhow::Result<()> {
    let binary = EspeakSynthesizer::locate(config.speech.synthesizer.as_deref())?;
    let (events, mut receiver) = event_channel();
    let synthesizer = EspeakSynthesizer::spawn(binary, events);

    let announced = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = receiver.recv().await {
            if matches!(event, AssistantEvent::VoicesChanged) {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    if !announced {
        anyhow::bail!("synthesizer did not report any voices");
    }

    for voice in synthesizer.voices() {
        println!("{:<12} {}", voice.lang, voice.name);
    }
    Ok(())
}

fn list_personas() {
    println!("Personas:");
    for kind in PersonaKind::ALL {
        println!(
            "  {:<18} pitch {:.2}  rate {:.2}",
            kind.label(),
            kind.pitch(),
            kind.rate()
        );
    }

    println!("\nLanguages:");
    for lang in Language::ALL {
        println!("  {:<18} {}", lang.display_name(), lang.code());
    }
}

fn build_synthesizer(config: &Config, events: EventSender) -> Box<dyn SpeechSynthesizer> {
    if !config.speech.enabled {
        tracing::info!("speech output disabled");
        return Box::new(SilentSynthesizer::new());
    }

    match EspeakSynthesizer::locate(config.speech.synthesizer.as_deref()) {
        Ok(binary) => {
            tracing::debug!(binary = %binary.display(), "using espeak synthesizer");
            Box::new(EspeakSynthesizer::spawn(binary, events))
        }
        Err(e) => {
            tracing::warn!(error = %e, "no synthesizer available, answers will not be spoken");
            Box::new(SilentSynthesizer::new())
        }
    }
}

/// Typed console input
#[derive(Debug)]
enum Input {
    Event(AssistantEvent),
    Speech(String),
    Help,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Speech(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, a)| (n, a.trim()));

    match (name, arg) {
        ("record" | "r", _) => Input::Event(AssistantEvent::Record),
        ("load", path) if !path.is_empty() => {
            Input::Event(AssistantEvent::LoadCsv(PathBuf::from(path)))
        }
        ("lang", name) if !name.is_empty() => {
            Input::Event(AssistantEvent::SelectLanguage(name.to_string()))
        }
        ("persona", label) if !label.is_empty() => {
            Input::Event(AssistantEvent::SelectPersona(PersonaKind::from_label(label)))
        }
        ("stop" | "s", _) => Input::Event(AssistantEvent::Stop),
        ("quit" | "q", _) => Input::Event(AssistantEvent::Shutdown),
        ("help" | "h", _) => Input::Help,
        _ => Input::Unknown(line.to_string()),
    }
}

async fn read_commands(events: EventSender, mic: KeyboardMic) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                break;
            }
        };

        match parse_input(&line) {
            Input::Event(event) => {
                let quit = matches!(event, AssistantEvent::Shutdown);
                if events.send(event).is_err() || quit {
                    return;
                }
            }
            Input::Speech(text) => {
                if !mic.offer(&text) && !text.is_empty() {
                    println!("Not listening. Type :record first.");
                }
            }
            Input::Help => print_help(),
            Input::Unknown(line) => println!("Unknown command: {line}"),
        }
    }

    events.send(AssistantEvent::Shutdown).ok();
}

fn print_help() {
    println!(
        "Commands: :record  :load <file.csv>  :lang <English|Hindi|Tamil|Telugu|Marathi>  \
         :persona <male-bass|male-baritone|female-contralto|female-mezzo>  :stop  :help  :quit\n\
         After :record, type your question as if speaking it."
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_speech() {
        assert!(matches!(
            parse_input(":record"),
            Input::Event(AssistantEvent::Record)
        ));
        assert!(matches!(
            parse_input(":lang Hindi"),
            Input::Event(AssistantEvent::SelectLanguage(ref l)) if l == "Hindi"
        ));
        assert!(matches!(
            parse_input(":persona male-bass"),
            Input::Event(AssistantEvent::SelectPersona(PersonaKind::MaleBass))
        ));
        assert!(matches!(
            parse_input(":load data/models.csv"),
            Input::Event(AssistantEvent::LoadCsv(ref p)) if p == &PathBuf::from("data/models.csv")
        ));
        assert!(matches!(
            parse_input(":stop"),
            Input::Event(AssistantEvent::Stop)
        ));
        assert!(matches!(parse_input(":lang"), Input::Unknown(_)));
        assert!(matches!(
            parse_input("  which tractor has 4WD? "),
            Input::Speech(ref s) if s == "which tractor has 4WD?"
        ));
    }
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ladle_voice::speech::{
    CpalSink, ElevenLabs, EspeakLocal, OutputOptions, Recognizer, RecognizerEvent,
    SpeechInputController, SpeechOutputController, debounced,
};
use ladle_voice::{
    CommandDispatcher, Config, ConversationTracker, EchoDispatcher, Lexicon, parse,
};

/// Ladle - voice interaction layer for recipe discovery
#[derive(Parser)]
#[command(name = "ladle", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "LADLE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a transcript and print the resulting command as JSON
    Parse {
        /// Transcript text, e.g. "quick vegetarian dinner"
        text: String,
    },
    /// Suggest ingredient pairings from the lexicon
    Suggest {
        /// Ingredients already on hand
        ingredients: Vec<String>,
    },
    /// Speak text through the output controller
    Say {
        /// Text to speak
        text: String,
    },
    /// Interactive session: stdin lines are treated as finalized utterances
    Run,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,ladle_voice=info",
        1 => "info,ladle_voice=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Parse { text } => {
            let command = parse(&text);
            println!("{}", serde_json::to_string_pretty(&command)?);
            Ok(())
        }
        Command::Suggest { ingredients } => {
            let lexicon = Lexicon::builtin();
            let canonical: Vec<String> = ingredients
                .iter()
                .filter_map(|name| lexicon.canonicalize(name))
                .map(ToString::to_string)
                .collect();

            if canonical.is_empty() {
                println!("No known ingredients given. Try: ladle suggest chicken rice");
                return Ok(());
            }

            for suggestion in lexicon.suggest_pairings(&canonical) {
                println!("{suggestion}");
            }
            Ok(())
        }
        Command::Say { text } => {
            let output = build_output(&config)?;
            output.speak(&text).await?;
            Ok(())
        }
        Command::Run => run_session(config).await,
    }
}

/// Wire the output controller from configuration
fn build_output(config: &Config) -> anyhow::Result<SpeechOutputController> {
    let cloud = ElevenLabs::new(
        config.elevenlabs_api_key.clone(),
        config.voice.model.clone(),
        config.voice.settings,
    );
    let local = EspeakLocal::new(
        config.local.program.clone(),
        config.local.rate,
        config.local.pitch,
        config.local.volume,
    );
    let sink = CpalSink::new()?;

    Ok(SpeechOutputController::new(
        Arc::new(cloud),
        Arc::new(local),
        Arc::new(sink),
        OutputOptions {
            voice_id: config.voice.voice_id.clone(),
            language: Some(config.language.clone()),
            prefer_cloud: config.prefer_cloud,
            cache_entries: config.cache_entries,
        },
    ))
}

/// Interactive loop: stdin → debounce → parse → context → dispatch → speak
async fn run_session(config: Config) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel(32);
    let (debounce, mut transcripts) = debounced(config.debounce);

    let recognizer = Arc::new(StdinRecognizer::new(event_tx));
    let input = SpeechInputController::new(
        Arc::clone(&recognizer) as Arc<dyn Recognizer>,
        event_rx,
        debounce,
        config.language.clone(),
    );

    let output = Arc::new(build_output(&config)?);
    let mut tracker = ConversationTracker::new(config.context_ttl);
    let dispatcher = EchoDispatcher;

    input.start_listening().await?;
    tracing::info!("session started, type an utterance and press enter (ctrl-c to quit)");

    loop {
        tokio::select! {
            transcript = transcripts.recv() => {
                let Some(transcript) = transcript else { break };

                let command = parse(&transcript);
                tracker.merge(&command);

                match dispatcher.dispatch(command).await {
                    Ok(reply) => {
                        println!("{reply}");
                        if let Err(e) = output.speak(&reply).await {
                            tracing::warn!(error = %e, "speech output failed");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "dispatch failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    output.stop();
    input.stop_listening().await?;
    tracker.clear();
    Ok(())
}

/// Recognizer that reads stdin lines as finalized utterances
///
/// Lets the whole pipeline run without a microphone; each line is emitted as
/// one final transcript chunk with full confidence.
struct StdinRecognizer {
    events: mpsc::Sender<RecognizerEvent>,
    reader: std::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl StdinRecognizer {
    fn new(events: mpsc::Sender<RecognizerEvent>) -> Self {
        Self {
            events,
            reader: std::sync::Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for StdinRecognizer {
    async fn start(&self, locale: &str) -> ladle_voice::Result<()> {
        let events = self.events.clone();
        tracing::debug!(%locale, "stdin recognizer started");

        let handle = tokio::spawn(async move {
            use tokio::io::AsyncBufReadExt;

            let _ = events.send(RecognizerEvent::Started).await;
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

            while let Ok(Some(line)) = lines.next_line().await {
                let text = line.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                let event = RecognizerEvent::Transcript {
                    text,
                    confidence: 1.0,
                    is_final: true,
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }

            let _ = events.send(RecognizerEvent::Ended).await;
        });

        if let Ok(mut reader) = self.reader.lock() {
            if let Some(previous) = reader.replace(handle) {
                previous.abort();
            }
        }

        Ok(())
    }

    async fn stop(&self) -> ladle_voice::Result<()> {
        if let Ok(mut reader) = self.reader.lock() {
            if let Some(handle) = reader.take() {
                handle.abort();
            }
        }
        Ok(())
    }
}

use anyhow::{bail, Context, Result};
use parla::audio::{read_wav, write_bytes};
use parla::{Agent, AgentConfig, SessionId, TurnStatus};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: parla [--out DIR] <config.toml> <turn.wav | text>...";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parla=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1).peekable();
    let mut out_dir = PathBuf::from(".");
    if args.peek().map(String::as_str) == Some("--out") {
        args.next();
        out_dir = args.next().map(PathBuf::from).context(USAGE)?;
    }

    let config_path = args.next().context(USAGE)?;
    let inputs: Vec<String> = args.collect();
    if inputs.is_empty() {
        bail!(USAGE);
    }

    let config = AgentConfig::load(&config_path)?;
    let agent = Agent::from_config(&config)?;
    let session = SessionId::generate();

    info!(session = %session, turns = inputs.len(), "Starting parla");

    for (index, input) in inputs.iter().enumerate() {
        let result = if is_wav(input) {
            let audio = read_wav(input).with_context(|| format!("reading {}", input))?;
            agent.handle_turn(&session, &audio).await
        } else {
            agent.handle_text(&session, input).await
        };

        println!("[{}] {}", index + 1, result.status);
        if let Some(transcript) = &result.transcript {
            println!("  you:   {}", transcript);
        }
        if let Some(reply) = &result.reply_text {
            println!("  parla: {}", reply);
        }
        for failure in &result.llm_failures {
            println!("  fallback: {}", failure);
        }
        println!("  {}", result.timings.summary());

        if let Some(audio) = &result.reply_audio {
            let path = out_dir.join(format!("reply-{}.{}", index + 1, audio.format));
            write_bytes(&path, &audio.bytes)?;
            println!("  audio: {}", path.display());
        }

        if result.status == TurnStatus::LlmUnavailable {
            warn!(turn = index + 1, "Assistant unavailable for this turn");
        }
    }

    agent.end_session(&session);
    Ok(())
}

fn is_wav(input: &str) -> bool {
    let path = Path::new(input);
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        && path.is_file()
}

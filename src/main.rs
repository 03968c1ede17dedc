//! LawGPT chat - terminal front-end
//!
//! Reads questions line by line, sends them through the chat runtime and
//! prints each answer as plain text or as titled section blocks.

use lawgpt_chat::backend::{create_backend, AskApiBackend};
use lawgpt_chat::config::{BackendContract, ChatConfig};
use lawgpt_chat::dispatcher::{BannerLevel, ChatSnapshot};
use lawgpt_chat::exchange::{Exchange, ExchangeStatus};
use lawgpt_chat::runtime::{ChatError, ChatHandle, ChatRuntime};
use lawgpt_chat::sections::{Classifier, DecodedAnswer, SectionCategory, SectionDecoder};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so answers on stdout stay readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lawgpt_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env();
    tracing::info!(
        contract = ?config.contract,
        base_url = %config.base_url,
        timeout_secs = ?config.request_timeout.map(|t| t.as_secs()),
        policy = ?config.submit_policy,
        "Configuration loaded"
    );

    if config.contract == BackendContract::Ask {
        match AskApiBackend::new(config.base_url.clone()).health().await {
            Ok(health) if health.is_ok() => {
                tracing::info!(service = ?health.service, "Backend is healthy");
            }
            Ok(health) => tracing::warn!(status = %health.status, "Backend reports unhealthy"),
            Err(e) => tracing::warn!(error = %e, "Backend health check failed"),
        }
    }

    let decoder = SectionDecoder::new(config.separator_width, Classifier::default());
    let handle = ChatRuntime::spawn(&config, create_backend(&config));
    tracing::info!(session_id = %handle.session_id(), "Session started");

    println!("LawGPT - ask a legal question. Commands: /reset, /upload <path>, /quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Quit => break,
            Input::Reset => {
                handle.reset().await?;
                println!("Conversation cleared.");
            }
            Input::Upload(path) => upload(&handle, Path::new(path)).await?,
            Input::Question(text) => ask(&handle, &decoder, text).await?,
        }
    }

    Ok(())
}

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Reset,
    Upload(&'a str),
    Question(&'a str),
}

impl<'a> Input<'a> {
    /// Commands are the first word only; anything else is a question
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));
        match word {
            "/quit" | "/exit" => Self::Quit,
            "/reset" => Self::Reset,
            "/upload" => Self::Upload(rest),
            _ => Self::Question(line),
        }
    }
}

async fn ask(handle: &ChatHandle, decoder: &SectionDecoder, text: &str) -> Result<(), ChatError> {
    let id = match handle.submit(text).await {
        Ok(Some(id)) => id,
        Ok(None) => return Ok(()),
        Err(ChatError::Rejected(e)) => {
            println!("! {e}");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!("… thinking");
    if let Some(exchange) = handle.wait_for_exchange(id).await? {
        print_exchange(&exchange, decoder);
    }
    print_banner(&handle.snapshot());
    Ok(())
}

async fn upload(handle: &ChatHandle, path: &Path) -> Result<(), ChatError> {
    match handle.upload(path).await {
        Ok(()) => {
            println!("… uploading {}", path.display());
            let snapshot = handle.wait_idle().await?;
            print_banner(&snapshot);
            Ok(())
        }
        Err(ChatError::Rejected(e)) => {
            println!("! {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn print_exchange(exchange: &Exchange, decoder: &SectionDecoder) {
    let Some(answer) = exchange.answer() else {
        return;
    };
    if exchange.status() == ExchangeStatus::Failed {
        println!("{answer}");
        return;
    }

    match decoder.decode_answer(answer) {
        DecodedAnswer::Plain { text } => println!("{text}"),
        DecodedAnswer::Structured { sections } => {
            for section in sections {
                let icon = section.category.map_or("conclusion", SectionCategory::icon);
                match section.label() {
                    Some(label) => println!("[{icon}] {}  ({label})", section.title),
                    None => println!("[{icon}] {}", section.title),
                }
                if !section.body.is_empty() {
                    println!("{}", section.body);
                }
                println!();
            }
        }
    }
}

fn print_banner(snapshot: &ChatSnapshot) {
    if let Some(banner) = &snapshot.banner {
        let prefix = match banner.level {
            BannerLevel::Info => "i",
            BannerLevel::Error => "!",
        };
        println!("{prefix} {}", banner.message);
    }
}

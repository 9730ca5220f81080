use academy_assistant::HttpAssistant;
use academy_assistant::config::{AssistantConfig, load_state};
use academy_assistant::context::state::ApplicationStateView;
use academy_assistant::render::{DisplaySegment, render_chat_message};
use academy_assistant::session::{ChatSession, SessionError};
use academy_assistant::types::{ChatMessage, Role};
use anyhow::Context;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;

/// Defaults compiled into the binary
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

fn load_dotenv() {
    // A local .env wins over the bundled defaults
    if dotenvy::dotenv().is_ok() {
        return;
    }
    load_bundled_config();
}

fn load_bundled_config() {
    for line in BUNDLED_CONFIG.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();
            // Only set if not already set (allow env override)
            if std::env::var(key).is_err() {
                // SAFETY: called at startup before the runtime spawns any threads
                unsafe {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

fn configure_logging() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);

    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

fn print_message(message: &ChatMessage) {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    match format_message_timestamp(message.created_at) {
        Some(ts) => println!("[{ts}] {who}:"),
        None => println!("{who}:"),
    }
    for keyed in render_chat_message(message) {
        match keyed.segment {
            DisplaySegment::Text { lines } => {
                for line in lines {
                    println!("  {line}");
                }
            }
            DisplaySegment::Code { language, source } => {
                println!("  ┌─ {language} [{}]", keyed.key);
                for line in source.lines() {
                    println!("  │ {line}");
                }
                println!("  └─");
            }
        }
    }
    println!();
}

enum Command<'a> {
    Quit,
    Clear,
    Route(&'a str),
    Say(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    match trimmed {
        "/quit" | "/exit" => Command::Quit,
        "/clear" => Command::Clear,
        _ => match trimmed.strip_prefix("/route ") {
            Some(route) => Command::Route(route.trim()),
            None => Command::Say(trimmed),
        },
    }
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    configure_logging();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let config = AssistantConfig::from_env()?;
    let state = match &config.state_file {
        Some(path) => load_state(path)
            .await
            .with_context(|| format!("failed to load state snapshot {}", path.display()))?,
        None => ApplicationStateView::default(),
    };
    let mut route = config.route.clone();

    let mut session = ChatSession::new(HttpAssistant::new(
        config.endpoint.clone(),
        config.access_token.clone(),
    ));
    session.start().await;
    session.messages().iter().for_each(print_message);

    println!("route: {route}  (/route <path>, /clear, /quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Clear => {
                session.clear().await;
                session.messages().iter().for_each(print_message);
            }
            Command::Route(next) => {
                route = next.to_string();
                println!("route: {route}");
            }
            Command::Say(text) => {
                let before = session.messages().len();
                match session.send(text, &route, &state).await {
                    Ok(()) => session.messages()[before..].iter().for_each(print_message),
                    Err(SessionError::Empty) => {}
                    Err(err) => eprintln!("not sent: {err}"),
                }
            }
        }
    }

    Ok(())
}

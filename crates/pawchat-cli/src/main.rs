//! # pawchat
//!
//! Terminal front-end for PawChat direct messages.
//!
//! - `pawchat chat <handle>` opens a conversation, prints history and every
//!   new message as it arrives, and sends each line typed on stdin
//! - `pawchat dialogs` lists your conversations

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use pawchat_client::{
    init_tracing, load_dialogs, ChatError, ClientConfig, ConversationEvent, ConversationView,
    Draft, HttpChatApi, StaticUser, ViewSettings,
};
use pawchat_shared::constants::APP_NAME;
use pawchat_shared::{Handle, Message, MessageId, PeerId};

#[derive(Debug, Parser)]
#[command(name = "pawchat", author, version, about = "PawChat direct messages in your terminal")]
struct Cli {
    /// Backend base URL. Overrides PAWCHAT_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session token sent as a bearer credential. Overrides PAWCHAT_SESSION_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Your own numeric user id, used to tell your messages apart.
    #[arg(long, env = "PAWCHAT_USER_ID", global = true)]
    user_id: Option<u64>,

    /// Poll interval in milliseconds. Overrides PAWCHAT_POLL_INTERVAL_MS.
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open a conversation with a user.
    Chat {
        /// The user's handle, with or without a leading @.
        handle: String,
    },
    /// List your conversations.
    Dialogs,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(token) = &self.token {
            config.session_token = Some(token.clone());
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms.max(
                pawchat_shared::constants::MIN_POLL_INTERVAL_MS,
            ));
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");

    let cli = Cli::parse();
    let config = cli.client_config();
    info!(?config, "Loaded configuration");

    let api = Arc::new(HttpChatApi::new(&config).context("Invalid client configuration")?);
    let user = StaticUser(cli.user_id.map(PeerId));

    match cli.command {
        Command::Chat { ref handle } => {
            let handle = Handle::parse(handle).context("Invalid handle")?;
            run_chat(api, user, handle, ViewSettings::from(&config)).await
        }
        Command::Dialogs => run_dialogs(api.as_ref()).await,
    }
}

async fn run_dialogs(api: &HttpChatApi) -> Result<()> {
    let dialogs = load_dialogs(api).await.context("Failed to load dialogs")?;
    if dialogs.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }
    for dialog in dialogs {
        let when = dialog
            .last_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("@{:<20} {:<16} {}", dialog.peer_handle, when, dialog.preview(60));
    }
    Ok(())
}

async fn run_chat(
    api: Arc<HttpChatApi>,
    user: StaticUser,
    handle: Handle,
    settings: ViewSettings,
) -> Result<()> {
    let mut view = ConversationView::new(api, Arc::new(user), handle, settings);
    let mut events = view.subscribe();

    match view.open().await {
        Ok(peer) => println!("{APP_NAME}: chatting with {} (id {})", peer.handle, peer.peer_id),
        Err(ChatError::NotFound(name)) => {
            println!("Conversation unavailable: no user @{name}");
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to open conversation"),
    }

    let mut shown: HashSet<MessageId> = HashSet::new();
    for message in view.messages() {
        print_message(&view, &message, &mut shown);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut draft = Draft::default();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(ConversationEvent::Appended { messages, .. }) => {
                    for message in &messages {
                        print_message(&view, message, &mut shown);
                    }
                }
                Ok(ConversationEvent::Seeded { .. }) => {}
                Ok(ConversationEvent::Closed) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed conversation events, reprinting buffer");
                    for message in view.messages() {
                        print_message(&view, &message, &mut shown);
                    }
                }
            },
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                // An empty line retries a draft that failed to send.
                if !line.trim().is_empty() {
                    draft.set(line);
                } else if draft.is_blank() {
                    continue;
                }
                if let Err(e) = view.send(&mut draft).await {
                    eprintln!("{}", send_failure_notice(&e));
                    // Keep the draft for a retry only after network failures.
                    if !e.is_transient() {
                        draft.clear();
                    }
                }
            }
        }
    }

    view.close();
    Ok(())
}

fn send_failure_notice(e: &ChatError) -> String {
    if e.is_transient() {
        format!("Not sent ({e}). Press Enter to retry.")
    } else {
        format!("Not sent ({e}).")
    }
}

fn print_message(view: &ConversationView, message: &Message, shown: &mut HashSet<MessageId>) {
    if !shown.insert(message.id) {
        return;
    }
    let author = if view.is_mine(message) {
        "you".to_string()
    } else {
        view.handle().to_string()
    };
    println!(
        "[{}] {}: {}",
        message.created_at.format("%H:%M"),
        author,
        message.text
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawchat_client::TransportError;

    #[test]
    fn test_retry_offered_only_for_transient_failures() {
        let transient = ChatError::Transient(TransportError::UnexpectedStatus {
            status: 503,
            body: String::new(),
        });
        assert!(send_failure_notice(&transient).contains("retry"));

        let too_long = ChatError::TooLong { len: 4_001, max: 4_000 };
        assert!(!send_failure_notice(&too_long).contains("retry"));
        assert!(!send_failure_notice(&ChatError::Closed).contains("retry"));
    }
}

//! # pawchat-client
//!
//! Keeps a direct-message conversation current against the PawChat REST
//! backend without a push channel.
//!
//! Opening a [`ConversationView`] resolves the peer's handle, seeds the
//! buffer with the latest history page, then polls for newer messages on a
//! fixed interval. Sends are appended as soon as the server confirms them.
//! The backend is reached only through the [`ChatApi`] trait, and the
//! current user's identity is injected through [`CurrentUser`].

pub mod api;
pub mod buffer;
pub mod config;
pub mod dialogs;
pub mod events;
pub mod history;
pub mod http;
pub mod identity;
pub mod poller;
pub mod sender;
pub mod view;

mod error;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use api::ChatApi;
pub use buffer::{ConversationBuffer, SharedBuffer};
pub use config::ClientConfig;
pub use dialogs::load_dialogs;
pub use error::{ChatError, Result, TransportError};
pub use events::{AppendSource, ConversationEvent};
pub use history::load_history;
pub use http::HttpChatApi;
pub use identity::{resolve_peer, CurrentUser, StaticUser};
pub use poller::{PollState, Poller};
pub use sender::{validate_text, Draft};
pub use view::{ConversationView, ViewSettings};

/// Install the global tracing subscriber. `RUST_LOG` wins over
/// `default_filter`. Logs go to stderr so they never mix with chat output.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init();
}

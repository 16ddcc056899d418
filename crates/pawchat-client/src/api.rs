//! The boundary between the conversation core and the chat backend.
//!
//! Everything the core needs from the network goes through [`ChatApi`], so a
//! conversation view can be driven by the real HTTP client
//! ([`crate::http::HttpChatApi`]) or by an in-memory stand-in in tests.

use async_trait::async_trait;

use pawchat_shared::{DialogSummary, Handle, HistoryPage, Message, MessageId, PeerId};

use crate::error::Result;

/// Authenticated access to the chat backend.
///
/// Implementations own the session credential; callers never see it.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Map a handle to the peer's numeric id.
    ///
    /// Fails with [`crate::ChatError::NotFound`] when nobody owns the handle.
    async fn resolve_handle(&self, handle: &Handle) -> Result<PeerId>;

    /// Fetch one page of the conversation with `peer`, oldest first.
    async fn fetch_history(&self, peer: PeerId, page: u32, size: u32) -> Result<HistoryPage>;

    /// Fetch every message of the conversation with an id greater than `cursor`,
    /// in increasing id order. May be empty.
    async fn fetch_after(&self, peer: PeerId, cursor: MessageId) -> Result<Vec<Message>>;

    /// Submit a new message and return it as stored by the server.
    async fn send_message(&self, peer: PeerId, text: &str) -> Result<Message>;

    /// Mark the peer's messages to us as read.
    async fn mark_read(&self, peer: PeerId) -> Result<()>;

    /// List the authenticated user's conversations, most recent first.
    async fn list_dialogs(&self) -> Result<Vec<DialogSummary>>;
}

//! Outbound sender.
//!
//! A send validates locally, posts the text, and appends the server's copy
//! of the message straight into the buffer so the author sees it without
//! waiting for a poll tick. The draft is only cleared once the server has
//! accepted the message.

use tracing::{info, warn};

use pawchat_shared::constants::MAX_MESSAGE_CHARS;
use pawchat_shared::{Message, PeerId};

use crate::api::ChatApi;
use crate::buffer::SharedBuffer;
use crate::error::{ChatError, Result};
use crate::events::AppendSource;

/// Text being composed for a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Client-side checks run before anything touches the network.
pub fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ChatError::EmptyText);
    }
    let len = text.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(ChatError::TooLong {
            len,
            max: MAX_MESSAGE_CHARS,
        });
    }
    Ok(())
}

/// Post `text` to `peer` and append the confirmed message to `buffer`.
///
/// If the buffer was closed while the request was in flight the message is
/// still returned (the server has it) but not appended.
pub async fn send_text(
    api: &dyn ChatApi,
    peer: PeerId,
    buffer: &SharedBuffer,
    text: &str,
) -> Result<Message> {
    validate_text(text)?;
    if !buffer.is_live() {
        return Err(ChatError::Closed);
    }

    let message = match api.send_message(peer, text).await {
        Ok(message) => message,
        Err(e) => {
            warn!(peer = %peer, error = %e, "Send failed");
            return Err(e);
        }
    };

    buffer.append(vec![message.clone()], AppendSource::Send);
    info!(peer = %peer, msg_id = %message.id, "Message sent");
    Ok(message)
}

/// Send the draft's text. The draft is cleared on success and left as is on
/// any failure so the user can retry.
pub async fn send_draft(
    api: &dyn ChatApi,
    peer: PeerId,
    buffer: &SharedBuffer,
    draft: &mut Draft,
) -> Result<Message> {
    let message = send_text(api, peer, buffer, draft.text()).await?;
    draft.clear();
    Ok(message)
}

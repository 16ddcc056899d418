use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::HandleError;

// Peer identity = numeric user id assigned by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned message id, strictly increasing within a conversation.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Cursor used when nothing is known yet.
    pub const ZERO: MessageId = MessageId(0);
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable peer name (the backend's username).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Parse user input into a handle. A single leading `@` is accepted and
    /// dropped, so `@alice` and `alice` are the same handle.
    pub fn parse(input: &str) -> Result<Self, HandleError> {
        let trimmed = input.trim();
        let name = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if name.is_empty() {
            return Err(HandleError::Empty);
        }
        if let Some(c) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(HandleError::InvalidChar(c));
        }
        // URL path handling would collapse these instead of encoding them.
        if name == "." || name == ".." {
            return Err(HandleError::DotSegment(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A conversation counterpart whose handle has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub handle: Handle,
    pub peer_id: PeerId,
}

/// A direct message as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: PeerId,
    #[serde(default)]
    pub recipient_id: Option<PeerId>,
    pub text: String,
    /// Server-local timestamp, sent without an offset.
    pub created_at: NaiveDateTime,
    /// Whether the backend considers the authenticated user the author.
    #[serde(default)]
    pub mine: bool,
}

/// One page of conversation history, oldest message first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub content: Vec<Message>,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub last_page: bool,
}

/// Read-only summary of one conversation, as shown in a dialog list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialogSummary {
    pub peer_id: PeerId,
    #[serde(rename = "peerUsername")]
    pub peer_handle: String,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub last_at: Option<NaiveDateTime>,
}

impl DialogSummary {
    /// Last message cut to at most `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.last_message.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}…")
        } else {
            head
        }
    }
}

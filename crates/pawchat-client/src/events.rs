use tokio::sync::broadcast;
use tracing::trace;

use pawchat_shared::Message;

/// Which component appended messages to a conversation buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendSource {
    Poll,
    Send,
}

/// Changes to a conversation, broadcast to every subscriber of the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    /// The buffer was replaced by the initial history page.
    Seeded { count: usize },
    /// New messages were added, ordered by id.
    Appended {
        source: AppendSource,
        messages: Vec<Message>,
    },
    /// The view was torn down; no further events follow.
    Closed,
}

pub fn emit_event(tx: &broadcast::Sender<ConversationEvent>, event: ConversationEvent) {
    if tx.send(event).is_err() {
        trace!("No subscribers for conversation event");
    }
}

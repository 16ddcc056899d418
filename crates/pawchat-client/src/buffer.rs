//! In-memory message list for one conversation.
//!
//! [`ConversationBuffer`] keeps messages ordered by id with no duplicates.
//! Its last id is the poll cursor, so the cursor can never drift from what
//! is actually held. [`SharedBuffer`] wraps it with the liveness token and
//! event channel of the owning view; every mutation goes through it.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pawchat_shared::constants::EVENT_CHANNEL_CAPACITY;
use pawchat_shared::{Message, MessageId};

use crate::events::{emit_event, AppendSource, ConversationEvent};

/// Ordered, de-duplicated list of messages.
#[derive(Debug, Clone, Default)]
pub struct ConversationBuffer {
    messages: Vec<Message>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with an initial page.
    pub fn seed(&mut self, page: Vec<Message>) {
        self.messages = page;
        self.messages.sort_by_key(|m| m.id);
        self.messages.dedup_by_key(|m| m.id);
    }

    /// Add messages, returning the ones that were not already present,
    /// ordered by id.
    ///
    /// Ids above the current last id are pushed; older ids are inserted in
    /// place, so arrival order does not matter.
    pub fn append<I>(&mut self, messages: I) -> Vec<Message>
    where
        I: IntoIterator<Item = Message>,
    {
        let mut added = Vec::new();
        for msg in messages {
            if self.insert(&msg) {
                added.push(msg);
            }
        }
        added.sort_by_key(|m| m.id);
        added
    }

    fn insert(&mut self, msg: &Message) -> bool {
        match self.messages.last() {
            Some(last) if msg.id <= last.id => {
                match self.messages.binary_search_by_key(&msg.id, |m| m.id) {
                    Ok(_) => false,
                    Err(pos) => {
                        self.messages.insert(pos, msg.clone());
                        true
                    }
                }
            }
            _ => {
                self.messages.push(msg.clone());
                true
            }
        }
    }

    /// Highest id held, or [`MessageId::ZERO`] when empty.
    pub fn last_id(&self) -> MessageId {
        self.messages.last().map(|m| m.id).unwrap_or(MessageId::ZERO)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.messages.binary_search_by_key(&id, |m| m.id).is_ok()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A view's buffer together with its liveness token and event channel.
pub struct SharedBuffer {
    inner: Mutex<ConversationBuffer>,
    live: CancellationToken,
    events: broadcast::Sender<ConversationEvent>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(ConversationBuffer::new()),
            live: CancellationToken::new(),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConversationBuffer> {
        // Every write leaves the list sorted, so a poisoned guard is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Token cancelled when the owning view is torn down.
    pub fn liveness(&self) -> &CancellationToken {
        &self.live
    }

    pub fn is_live(&self) -> bool {
        !self.live.is_cancelled()
    }

    // Liveness is checked and events are emitted while the lock is held, so
    // nothing can slip in between a concurrent `close` and its `Closed` event.
    pub fn seed(&self, page: Vec<Message>) -> bool {
        let mut buf = self.lock();
        if !self.is_live() {
            return false;
        }
        buf.seed(page);
        emit_event(&self.events, ConversationEvent::Seeded { count: buf.len() });
        true
    }

    /// Append to a live buffer. Returns the number of messages added; always
    /// zero once the view has been closed.
    pub fn append(&self, messages: Vec<Message>, source: AppendSource) -> usize {
        let mut buf = self.lock();
        if !self.is_live() {
            debug!(count = messages.len(), ?source, "Discarding messages for closed conversation");
            return 0;
        }
        let added = buf.append(messages);
        let count = added.len();
        if count > 0 {
            emit_event(
                &self.events,
                ConversationEvent::Appended {
                    source,
                    messages: added,
                },
            );
        }
        count
    }

    /// Current poll cursor.
    pub fn cursor(&self) -> MessageId {
        self.lock().last_id()
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().messages().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    /// Mark the buffer dead. Later seeds and appends are dropped.
    pub fn close(&self) {
        let _buf = self.lock();
        if self.is_live() {
            self.live.cancel();
            emit_event(&self.events, ConversationEvent::Closed);
        }
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

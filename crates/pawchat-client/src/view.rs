//! One open conversation.
//!
//! A [`ConversationView`] owns everything tied to talking with one peer: the
//! resolved [`Peer`], the message buffer, and the poll timer. It is built
//! per peer and never reused; switching peers goes through
//! [`ConversationView::retarget`], which tears the old view down first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use pawchat_shared::{Handle, Message, MessageId, Peer, PeerId};

use crate::api::ChatApi;
use crate::buffer::SharedBuffer;
use crate::config::ClientConfig;
use crate::error::{ChatError, Result};
use crate::events::ConversationEvent;
use crate::history::load_history;
use crate::identity::{resolve_peer, CurrentUser};
use crate::poller::{PollState, Poller};
use crate::sender::{self, Draft};

/// The subset of [`ClientConfig`] a view needs.
#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    pub poll_interval: Duration,
    pub history_page_size: u32,
    pub mark_read_on_open: bool,
}

impl From<&ClientConfig> for ViewSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            history_page_size: config.history_page_size,
            mark_read_on_open: config.mark_read_on_open,
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

/// A conversation with a single peer.
pub struct ConversationView {
    /// Authenticated backend access, shared with the poll task.
    api: Arc<dyn ChatApi>,

    /// Provider of our own identity.
    current_user: Arc<dyn CurrentUser>,

    /// Handle the view was opened for.
    handle: Handle,

    /// `None` until [`ConversationView::open`] resolves the handle.
    peer: Option<Peer>,

    /// Messages shown in this view. Discarded with the view.
    buffer: Arc<SharedBuffer>,

    /// Running poll task, once opened.
    poller: Option<Poller>,

    settings: ViewSettings,
    closed: bool,
}

impl ConversationView {
    pub fn new(
        api: Arc<dyn ChatApi>,
        current_user: Arc<dyn CurrentUser>,
        handle: Handle,
        settings: ViewSettings,
    ) -> Self {
        Self {
            api,
            current_user,
            handle,
            peer: None,
            buffer: Arc::new(SharedBuffer::new()),
            poller: None,
            settings,
            closed: false,
        }
    }

    /// Resolve the peer, load history and start polling.
    ///
    /// On failure the view stays idle and `open` may be called again. The
    /// resolved peer is cached, so a retry after a history failure does not
    /// resolve again. Calling `open` on an already open view is a no-op.
    pub async fn open(&mut self) -> Result<&Peer> {
        if self.closed {
            return Err(ChatError::Closed);
        }
        if self.poller.is_some() {
            return self.peer.as_ref().ok_or(ChatError::Closed);
        }

        let peer = match self.peer.take() {
            Some(peer) => peer,
            None => resolve_peer(self.api.as_ref(), &self.handle).await?,
        };

        if self.current_user.user_id() == Some(peer.peer_id) {
            warn!(peer = %peer.peer_id, "Refusing to open a conversation with ourselves");
            return Err(ChatError::SelfConversation);
        }
        let peer = self.peer.insert(peer).clone();

        let history =
            load_history(self.api.as_ref(), &peer, self.settings.history_page_size).await?;
        if !self.buffer.seed(history) {
            return Err(ChatError::Closed);
        }

        if self.settings.mark_read_on_open {
            if let Err(e) = self.api.mark_read(peer.peer_id).await {
                warn!(peer = %peer.peer_id, error = %e, "Failed to mark conversation read");
            }
        }

        self.poller = Some(Poller::spawn(
            self.api.clone(),
            peer.peer_id,
            self.buffer.clone(),
            self.settings.poll_interval,
        ));

        info!(
            handle = %self.handle,
            peer = %peer.peer_id,
            messages = self.buffer.len(),
            "Conversation opened"
        );
        self.peer.as_ref().ok_or(ChatError::Closed)
    }

    /// Send a draft. Cleared on success, untouched on failure.
    pub async fn send(&self, draft: &mut Draft) -> Result<Message> {
        sender::validate_text(draft.text())?;
        let peer = self.require_peer()?;
        sender::send_draft(self.api.as_ref(), peer, &self.buffer, draft).await
    }

    /// Send raw text.
    pub async fn send_text(&self, text: &str) -> Result<Message> {
        sender::validate_text(text)?;
        let peer = self.require_peer()?;
        sender::send_text(self.api.as_ref(), peer, &self.buffer, text).await
    }

    fn require_peer(&self) -> Result<PeerId> {
        if self.closed {
            return Err(ChatError::Closed);
        }
        match (&self.peer, &self.poller) {
            (Some(peer), Some(_)) => Ok(peer.peer_id),
            _ => Err(ChatError::Closed),
        }
    }

    /// Stop polling and drop any result that lands afterwards. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.buffer.close();
        info!(handle = %self.handle, "Conversation closed");
    }

    /// Tear this view down and build a fresh, idle one for another peer.
    pub fn retarget(mut self, handle: Handle) -> ConversationView {
        self.close();
        ConversationView::new(
            self.api.clone(),
            self.current_user.clone(),
            handle,
            self.settings,
        )
    }

    pub fn state(&self) -> PollState {
        if self.closed {
            PollState::Stopped
        } else if self.poller.is_some() {
            PollState::Polling
        } else {
            PollState::Idle
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn peer(&self) -> Option<&Peer> {
        self.peer.as_ref()
    }

    /// Snapshot of the buffer, ordered by id.
    pub fn messages(&self) -> Vec<Message> {
        self.buffer.snapshot()
    }

    /// Id the next poll tick will ask to read after.
    pub fn cursor(&self) -> MessageId {
        self.buffer.cursor()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.buffer.subscribe()
    }

    /// Whether we wrote `message`. Falls back to the server's flag while our
    /// own identity is unknown.
    pub fn is_mine(&self, message: &Message) -> bool {
        match self.current_user.user_id() {
            Some(me) => message.sender_id == me,
            None => message.mine,
        }
    }
}

impl Drop for ConversationView {
    fn drop(&mut self) {
        self.close();
    }
}

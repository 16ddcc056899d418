// In-memory ChatApi used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use pawchat_shared::{DialogSummary, Handle, HistoryPage, Message, MessageId, PeerId};

use crate::api::ChatApi;
use crate::error::{ChatError, Result, TransportError};

pub fn msg(id: u64) -> Message {
    msg_from(id, PeerId(7), &format!("message {id}"))
}

pub fn msg_from(id: u64, sender: PeerId, text: &str) -> Message {
    let created_at = NaiveDate::from_ymd_opt(2025, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
        + chrono::Duration::seconds(id as i64);
    Message {
        id: MessageId(id),
        sender_id: sender,
        recipient_id: None,
        text: text.to_string(),
        created_at,
        mine: false,
    }
}

pub fn transient(status: u16) -> ChatError {
    ChatError::Transient(TransportError::UnexpectedStatus {
        status,
        body: String::new(),
    })
}

/// Scripted backend. Poll and send responses are consumed in order; when a
/// script runs dry polls return nothing and sends echo a fresh message.
#[derive(Default)]
pub struct FakeApi {
    pub handles: Mutex<HashMap<String, PeerId>>,
    pub history: Mutex<Vec<Message>>,
    pub history_failures: AtomicUsize,
    pub polls: Mutex<VecDeque<std::result::Result<Vec<Message>, u16>>>,
    pub sends: Mutex<VecDeque<std::result::Result<Message, u16>>>,
    pub dialogs: Mutex<Vec<DialogSummary>>,
    pub latency: Mutex<Option<Duration>>,

    pub resolve_calls: AtomicUsize,
    pub history_calls: Mutex<Vec<(PeerId, u32, u32)>>,
    pub poll_cursors: Mutex<Vec<(PeerId, MessageId)>>,
    pub sent_texts: Mutex<Vec<String>>,
    pub mark_read_calls: AtomicUsize,
    next_id: AtomicU64,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.next_id.store(1_000, Ordering::SeqCst);
        api
    }

    pub fn with_handle(self, handle: &str, id: u64) -> Self {
        self.handles.lock().unwrap().insert(handle.into(), PeerId(id));
        self
    }

    pub fn with_history(self, messages: Vec<Message>) -> Self {
        *self.history.lock().unwrap() = messages;
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    pub fn push_poll(&self, result: std::result::Result<Vec<Message>, u16>) {
        self.polls.lock().unwrap().push_back(result);
    }

    pub fn push_send(&self, result: std::result::Result<Message, u16>) {
        self.sends.lock().unwrap().push_back(result);
    }

    pub fn cursors(&self) -> Vec<MessageId> {
        self.poll_cursors.lock().unwrap().iter().map(|(_, c)| *c).collect()
    }

    pub fn poll_count(&self) -> usize {
        self.poll_cursors.lock().unwrap().len()
    }

    pub fn network_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
            + self.history_calls.lock().unwrap().len()
            + self.poll_count()
            + self.sent_texts.lock().unwrap().len()
            + self.mark_read_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn resolve_handle(&self, handle: &Handle) -> Result<PeerId> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        let found = self.handles.lock().unwrap().get(handle.as_str()).copied();
        found.ok_or_else(|| ChatError::NotFound(handle.as_str().to_string()))
    }

    async fn fetch_history(&self, peer: PeerId, page: u32, size: u32) -> Result<HistoryPage> {
        self.history_calls.lock().unwrap().push((peer, page, size));
        self.delay().await;
        let failures = self.history_failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.history_failures.store(failures - 1, Ordering::SeqCst);
            return Err(transient(503));
        }
        Ok(HistoryPage {
            content: self.history.lock().unwrap().clone(),
            ..HistoryPage::default()
        })
    }

    async fn fetch_after(&self, peer: PeerId, cursor: MessageId) -> Result<Vec<Message>> {
        self.poll_cursors.lock().unwrap().push((peer, cursor));
        self.delay().await;
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(Ok(messages)) => Ok(messages),
            Some(Err(status)) => Err(transient(status)),
            None => Ok(Vec::new()),
        }
    }

    async fn send_message(&self, _peer: PeerId, text: &str) -> Result<Message> {
        self.sent_texts.lock().unwrap().push(text.to_string());
        self.delay().await;
        let next = self.sends.lock().unwrap().pop_front();
        match next {
            Some(Ok(message)) => Ok(message),
            Some(Err(status)) => Err(transient(status)),
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                Ok(msg_from(id, PeerId(1), text))
            }
        }
    }

    async fn mark_read(&self, _peer: PeerId) -> Result<()> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_dialogs(&self) -> Result<Vec<DialogSummary>> {
        Ok(self.dialogs.lock().unwrap().clone())
    }
}

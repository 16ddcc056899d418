use tracing::info;

use pawchat_shared::constants::MAX_HISTORY_PAGE_SIZE;
use pawchat_shared::{Message, Peer};

use crate::api::ChatApi;
use crate::error::Result;

/// Fetch the first history page for `peer`, oldest message first.
///
/// Taking a [`Peer`] rather than a raw id means this cannot run before the
/// handle is resolved.
pub async fn load_history(api: &dyn ChatApi, peer: &Peer, page_size: u32) -> Result<Vec<Message>> {
    let size = page_size.clamp(1, MAX_HISTORY_PAGE_SIZE);
    let page = api.fetch_history(peer.peer_id, 0, size).await?;

    let mut messages = page.content;
    messages.sort_by_key(|m| m.id);

    info!(
        peer = %peer.peer_id,
        count = messages.len(),
        total = page.total_elements,
        "History loaded"
    );
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{msg, FakeApi};
    use pawchat_shared::{Handle, MessageId, PeerId};

    fn alice() -> Peer {
        Peer {
            handle: Handle::parse("alice").unwrap(),
            peer_id: PeerId(7),
        }
    }

    #[tokio::test]
    async fn test_loads_first_page_oldest_first() {
        let api = FakeApi::new().with_history(vec![msg(2), msg(1)]);

        let messages = load_history(&api, &alice(), 50).await.unwrap();
        assert_eq!(
            messages.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![MessageId(1), MessageId(2)]
        );
        assert_eq!(*api.history_calls.lock().unwrap(), vec![(PeerId(7), 0, 50)]);
    }

    #[tokio::test]
    async fn test_page_size_is_clamped() {
        let api = FakeApi::new();
        load_history(&api, &alice(), 0).await.unwrap();
        load_history(&api, &alice(), 10_000).await.unwrap();

        let calls = api.history_calls.lock().unwrap().clone();
        assert_eq!(calls[0].2, 1);
        assert_eq!(calls[1].2, MAX_HISTORY_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let api = FakeApi::new();
        api.history_failures
            .store(1, std::sync::atomic::Ordering::SeqCst);

        let err = load_history(&api, &alice(), 50).await.unwrap_err();
        assert!(err.is_transient());
    }
}

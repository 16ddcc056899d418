//! Who we are and who we are talking to.
//!
//! [`CurrentUser`] is injected into every conversation view instead of being
//! read from process-wide state. [`resolve_peer`] turns a handle into a
//! [`Peer`] once per conversation open.

use tracing::{debug, info};

use pawchat_shared::{Handle, Peer, PeerId};

use crate::api::ChatApi;
use crate::error::{ChatError, Result};

/// Provider of the authenticated user's identity.
pub trait CurrentUser: Send + Sync {
    /// `None` while the identity is not known yet.
    fn user_id(&self) -> Option<PeerId>;
}

/// Fixed identity, known up front.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticUser(pub Option<PeerId>);

impl StaticUser {
    pub fn known(id: PeerId) -> Self {
        Self(Some(id))
    }

    pub fn unknown() -> Self {
        Self(None)
    }
}

impl CurrentUser for StaticUser {
    fn user_id(&self) -> Option<PeerId> {
        self.0
    }
}

/// Resolve `handle` to a peer. No retry; a missing handle is
/// [`ChatError::NotFound`], anything else that goes wrong is transient.
pub async fn resolve_peer(api: &dyn ChatApi, handle: &Handle) -> Result<Peer> {
    debug!(handle = %handle, "Resolving peer");
    match api.resolve_handle(handle).await {
        Ok(peer_id) => {
            info!(handle = %handle, peer = %peer_id, "Peer resolved");
            Ok(Peer {
                handle: handle.clone(),
                peer_id,
            })
        }
        Err(ChatError::NotFound(name)) => {
            info!(handle = %handle, "Conversation unavailable: no such user");
            Err(ChatError::NotFound(name))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn test_resolve_known_handle() {
        let api = FakeApi::new().with_handle("alice", 7);
        let handle = Handle::parse("@alice").unwrap();

        let peer = resolve_peer(&api, &handle).await.unwrap();
        assert_eq!(peer.peer_id, PeerId(7));
        assert_eq!(peer.handle, handle);
    }

    #[tokio::test]
    async fn test_resolve_unknown_handle_is_not_found() {
        let api = FakeApi::new();
        let handle = Handle::parse("ghost").unwrap();

        let err = resolve_peer(&api, &handle).await.unwrap_err();
        assert!(matches!(err, ChatError::NotFound(ref name) if name == "ghost"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_static_user() {
        assert_eq!(StaticUser::known(PeerId(3)).user_id(), Some(PeerId(3)));
        assert_eq!(StaticUser::unknown().user_id(), None);
    }
}

// Domain types shared by the pawchat client library and its front-ends.

pub mod constants;
pub mod error;
pub mod types;

pub use error::HandleError;
pub use types::{DialogSummary, Handle, HistoryPage, Message, MessageId, Peer, PeerId};

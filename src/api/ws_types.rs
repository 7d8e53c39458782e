use serde::Serialize;

use crate::models::Wager;
use crate::staging::SyncStatus;

/// Messages pushed to WebSocket clients. Every message belongs to one
/// identity and is only delivered to sockets opened under that identity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    /// Sent after every mutation, load, flush and discard so clients can
    /// show how many changes are still unsaved.
    #[serde(rename = "sync_status")]
    SyncStatus(SyncStatus),

    #[serde(rename = "wager_update")]
    WagerUpdate {
        identity: Option<String>,
        wager: Wager,
    },
}

impl WsMessage {
    /// Owner of the message; `None` is the default ledger.
    pub fn identity(&self) -> Option<&str> {
        match self {
            WsMessage::SyncStatus(status) => status.identity.as_deref(),
            WsMessage::WagerUpdate { identity, .. } => identity.as_deref(),
        }
    }

    pub fn visible_to(&self, identity: Option<&str>) -> bool {
        self.identity() == identity
    }
}

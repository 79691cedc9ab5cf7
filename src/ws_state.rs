//! Live-sync connection state
//!
//! Shared between the feed clients and the header display.

/// State of the candle feed connection.
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum SyncState {
    Connecting,
    /// Subscribed and receiving changes.
    Live,
    Offline,
    Error(String),
}

impl SyncState {
    #[allow(dead_code)]
    pub fn is_live(&self) -> bool {
        matches!(self, SyncState::Live)
    }
}

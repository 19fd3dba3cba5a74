//! Session notifications for UI listeners.
//!
//! When the backend rejects the session (HTTP 401) or no token can be
//! resolved, the client emits [`SessionEvent::Expired`] so the UI can sign
//! the user out. Emission is fire-and-forget: it never affects the outcome of
//! the call that triggered it, and it is a no-op when nobody listens.

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Broadcast channel capacity. Listeners that fall further behind see
/// `RecvError::Lagged` and should just treat it as "session expired".
pub const SESSION_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session is gone; the UI should kick the user out.
    Expired,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::Expired => write!(f, "EVENT_KICK_OUT"),
        }
    }
}

/// Cheaply clonable handle to the session event channel.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Send `event` to every current subscriber. Returns how many received it.
    pub fn emit(&self, event: SessionEvent) -> usize {
        tracing::debug!(%event, "session event");
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Subscribe as a `Stream`.
    pub fn stream(&self) -> BroadcastStream<SessionEvent> {
        BroadcastStream::new(self.tx.subscribe())
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

use log::debug;
use tokio::sync::broadcast;

use super::errors::DriverError;

pub const CONNECTION_READY: &str = "database.connection.ready";
pub const CONNECTION_ERROR: &str = "database.connection.error";

/// A driver lifecycle event, republished under the connection's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Ready { connection: String },
    Error { connection: String, err: DriverError },
}

impl ConnectionEvent {
    /// The event name, e.g. `database.connection.ready`.
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionEvent::Ready { .. } => CONNECTION_READY,
            ConnectionEvent::Error { .. } => CONNECTION_ERROR,
        }
    }

    pub fn connection(&self) -> &str {
        match self {
            ConnectionEvent::Ready { connection } => connection,
            ConnectionEvent::Error { connection, .. } => connection,
        }
    }
}

/// Receives connection events.
///
/// Delivery is best-effort: `fire` has no way to report failure and nothing in
/// the registry depends on it succeeding. Implementations may be called from
/// driver threads or tasks, and also synchronously from inside
/// `ConnectionRegistry::connect` while it holds the registry lock (a driver may
/// replay an outcome on subscribe). `fire` must therefore never call the
/// registry, not even lookups like `connection`; hand the event off instead.
pub trait EventSink: Send + Sync {
    fn fire(&self, event: ConnectionEvent);
}

impl<F> EventSink for F
where
    F: Fn(ConnectionEvent) + Send + Sync,
{
    fn fire(&self, event: ConnectionEvent) {
        self(event)
    }
}

/// Fans events out to every subscriber via a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ConnectionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    /// A `capacity` of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for EventBus {
    fn fire(&self, event: ConnectionEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            debug!("No subscribers for '{}', event dropped", name);
        }
    }
}

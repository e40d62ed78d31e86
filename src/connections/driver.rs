use std::sync::Arc;

use super::errors::DriverError;

/// Lifecycle notifications a driver handle may emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Ready,
    Error(DriverError),
}

/// Callback registered on a handle through `DriverHandle::subscribe`.
pub type DriverListener = Arc<dyn Fn(DriverEvent) + Send + Sync>;

/// A trait representing a database driver (MongoDB, an in-memory fake, etc.).
///
/// `open` must return without waiting for the server: establishing the link
/// happens in the background and its outcome is reported through the handle's
/// events. An `Err` is only for requests the driver can reject up front.
pub trait Driver: Send + Sync + 'static {
    type Handle: DriverHandle;

    fn open(&self, uri: &str) -> Result<Self::Handle, DriverError>;
}

/// An open link to one database, as handed out by a `Driver`.
pub trait DriverHandle: Send + Sync + 'static {
    /// The driver's own collection object.
    type Collection;

    fn collection(&self, name: &str) -> Self::Collection;

    fn close(&self);

    /// Registers a listener for `ready` / `error` notifications.
    /// Drivers without lifecycle events keep the default, which drops it.
    fn subscribe(&self, listener: DriverListener) {
        let _ = listener;
    }
}

use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use super::config::ConnectionConfig;
use super::driver::{Driver, DriverEvent, DriverHandle};
use super::errors::DriverError;
use super::events::{ConnectionEvent, EventSink};

/// One named link to a database, wrapping the driver's handle.
///
/// Connections are created by `ConnectionRegistry::connect` and shared out as
/// `Arc<Connection<_>>`. Calling `disconnect` on a shared reference closes the
/// handle the registry still holds, so prefer `ConnectionRegistry::disconnect`.
pub struct Connection<H: DriverHandle> {
    name: String,
    handle: H,
}

impl<H: DriverHandle> Connection<H> {
    /// Opens a handle for `config` through `driver`.
    ///
    /// When `events` is given, the handle's `ready` / `error` notifications are
    /// republished there as `database.connection.*` events tagged with `name`.
    pub fn open<D>(
        driver: &D,
        name: impl Into<String>,
        config: &ConnectionConfig,
        events: Option<Arc<dyn EventSink>>,
    ) -> Result<Self, DriverError>
    where
        D: Driver<Handle = H>,
    {
        let name = name.into();
        let uri = config.to_uri();
        // The URI may carry a password; log the database only.
        debug!("Opening connection '{}' to database '{}'", name, config.database_name);
        let handle = driver.open(&uri)?;

        if let Some(sink) = events {
            let connection = name.clone();
            handle.subscribe(Arc::new(move |event: DriverEvent| {
                let event = match event {
                    DriverEvent::Ready => ConnectionEvent::Ready {
                        connection: connection.clone(),
                    },
                    DriverEvent::Error(err) => ConnectionEvent::Error {
                        connection: connection.clone(),
                        err,
                    },
                };
                sink.fire(event);
            }));
        }

        info!("Connection '{}' opened.", name);
        Ok(Self { name, handle })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw driver handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn collection(&self, name: &str) -> H::Collection {
        self.handle.collection(name)
    }

    /// Closes the driver handle.
    ///
    /// The connection must not be used afterwards; a second call does whatever
    /// the driver does on a double close.
    pub fn disconnect(&self) -> &Self {
        self.handle.close();
        info!("Connection '{}' closed.", self.name);
        self
    }
}

impl<H: DriverHandle> fmt::Debug for Connection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

use crate::connections::config::ConnectionConfig;
use crate::connections::connection::Connection;
use crate::connections::driver::{Driver, DriverHandle};
use crate::connections::events::EventSink;
use crate::core::errors::DatabaseError;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type SharedConnection<D> = Arc<Connection<<D as Driver>::Handle>>;

struct RegistryState<H: DriverHandle> {
    connections: HashMap<String, Arc<Connection<H>>>,
    // Names in insertion order.
    order: Vec<String>,
    // Empty when no default is set; otherwise always a key of `connections`.
    default_connection: String,
}

impl<H: DriverHandle> RegistryState<H> {
    /// An empty or missing `name` falls back to the default connection.
    fn resolve(&self, name: Option<&str>) -> String {
        match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.default_connection.clone(),
        }
    }

    fn get(&self, name: &str) -> Result<&Arc<Connection<H>>, DatabaseError> {
        self.connections
            .get(name)
            .ok_or_else(|| DatabaseError::UnknownConnection(name.to_string()))
    }

    fn remove(&mut self, name: &str) -> Option<Arc<Connection<H>>> {
        let conn = self.connections.remove(name)?;
        self.order.retain(|n| n != name);
        if self.default_connection == name {
            self.default_connection.clear();
        }
        Some(conn)
    }
}

/// Directory of named database connections with one optional default.
///
/// The map of connections and the default name sit behind a single `RwLock`,
/// so `connect`, `disconnect` and `set_default_connection` each run their
/// check-then-update atomically while lookups can proceed in parallel.
/// Cloning the registry only bumps a reference count; every clone sees the
/// same connections.
///
/// None of the operations wait on the network. The driver returns a handle
/// immediately and reports readiness or failure later through the optional
/// `EventSink`.
pub struct ConnectionRegistry<D: Driver> {
    driver: Arc<D>,
    events: Option<Arc<dyn EventSink>>,
    inner: Arc<RwLock<RegistryState<D::Handle>>>,
}

impl<D: Driver> Clone for ConnectionRegistry<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            events: self.events.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: Driver> fmt::Debug for ConnectionRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.read();
        f.debug_struct("ConnectionRegistry")
            .field("connections", &state.order)
            .field("default_connection", &state.default_connection)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> ConnectionRegistry<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver: Arc::new(driver),
            events: None,
            inner: Arc::new(RwLock::new(RegistryState {
                connections: HashMap::new(),
                order: Vec::new(),
                default_connection: String::new(),
            })),
        }
    }

    /// Creates a registry whose connections republish driver lifecycle
    /// events to `events`.
    pub fn with_events(driver: D, events: Arc<dyn EventSink>) -> Self {
        Self {
            events: Some(events),
            ..Self::new(driver)
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Opens a connection and registers it under `name`.
    ///
    /// The first connection of an empty registry always becomes the default,
    /// whatever `make_default` says.
    pub fn connect(
        &self,
        name: &str,
        config: &ConnectionConfig,
        make_default: bool,
    ) -> Result<&Self, DatabaseError> {
        let mut state = self.inner.write();
        if state.connections.contains_key(name) {
            warn!("Connection '{}' is already defined.", name);
            return Err(DatabaseError::DuplicateConnection(name.to_string()));
        }

        let make_default = make_default || state.connections.is_empty();
        let conn = Connection::open(&*self.driver, name, config, self.events.clone())?;

        state.connections.insert(name.to_string(), Arc::new(conn));
        state.order.push(name.to_string());
        if make_default {
            debug!("'{}' is now the default connection", name);
            state.default_connection = name.to_string();
        }

        info!("Registered connection '{}'.", name);
        Ok(self)
    }

    /// Closes and unregisters a connection; `None` or `""` means the default.
    ///
    /// Removing the default connection leaves the registry without a default.
    pub fn disconnect(&self, name: Option<&str>) -> Result<&Self, DatabaseError> {
        let mut state = self.inner.write();
        let name = state.resolve(name);
        state.get(&name)?;

        if let Some(conn) = state.remove(&name) {
            conn.disconnect();
        }
        info!("Unregistered connection '{}'.", name);
        Ok(self)
    }

    /// Disconnects every registered connection in insertion order.
    pub fn disconnect_all(&self) -> &Self {
        let mut state = self.inner.write();
        let names = std::mem::take(&mut state.order);
        for name in names {
            if let Some(conn) = state.connections.remove(&name) {
                conn.disconnect();
            }
        }
        state.default_connection.clear();
        info!("All connections closed.");
        self
    }

    /// Looks up a connection; `None` or `""` means the default.
    pub fn connection(&self, name: Option<&str>) -> Result<SharedConnection<D>, DatabaseError> {
        let state = self.inner.read();
        let name = state.resolve(name);
        state.get(&name).cloned()
    }

    /// Fetches `collection` from the named (or default) connection.
    pub fn collection(
        &self,
        collection: &str,
        connection: Option<&str>,
    ) -> Result<<D::Handle as DriverHandle>::Collection, DatabaseError> {
        let state = self.inner.read();
        let name = state.resolve(connection);
        Ok(state.get(&name)?.collection(collection))
    }

    /// Name of the default connection, empty when none is set.
    pub fn default_connection(&self) -> String {
        self.inner.read().default_connection.clone()
    }

    /// Sets the default connection; `""` clears it.
    pub fn set_default_connection(&self, name: &str) -> Result<(), DatabaseError> {
        let mut state = self.inner.write();
        if !name.is_empty() {
            state.get(name)?;
        }
        state.default_connection = name.to_string();
        Ok(())
    }

    /// Registered names in insertion order.
    pub fn connections(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().connections.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.read().connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().connections.is_empty()
    }
}

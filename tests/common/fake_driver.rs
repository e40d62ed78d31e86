//! A deterministic **in‑process stand‑in** for a database driver.
//!
//! * **From the test’s perspective**
//!   * Every `open` is recorded; grab the matching `FakeRemote` with
//!     `driver.remote(i)` or `driver.remote_for(uri)`.
//!   * Push lifecycle events into a handle with `remote.emit(DriverEvent::Ready)`.
//!   * Count how often the registry closed the handle with `remote.closes()`.
//!
//! It lets integration tests exercise the real registry without a server.

use entity_database::{Driver, DriverError, DriverEvent, DriverHandle};
use entity_database::connections::DriverListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What `FakeHandle::collection` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCollection {
    pub uri: String,
    pub name: String,
}

/// Test-side view of one opened handle.
#[derive(Clone)]
pub struct FakeRemote {
    pub uri: String,
    closes: Arc<AtomicUsize>,
    listeners: Arc<Mutex<Vec<DriverListener>>>,
}

impl FakeRemote {
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Deliver `event` to every listener, as a real driver would from its
    /// background machinery.
    pub fn emit(&self, event: DriverEvent) {
        let listeners = self.listeners.lock().unwrap().clone();
        for listener in listeners {
            listener(event.clone());
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeDriver {
    remotes: Arc<Mutex<Vec<FakeRemote>>>,
    reject: Arc<Mutex<Option<DriverError>>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `open` fail with `err`.
    pub fn reject_with(&self, err: DriverError) {
        *self.reject.lock().unwrap() = Some(err);
    }

    pub fn opened(&self) -> usize {
        self.remotes.lock().unwrap().len()
    }

    pub fn remote(&self, index: usize) -> FakeRemote {
        self.remotes.lock().unwrap()[index].clone()
    }

    pub fn remote_for(&self, uri: &str) -> Option<FakeRemote> {
        self.remotes
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.uri == uri)
            .cloned()
    }
}

impl Driver for FakeDriver {
    type Handle = FakeHandle;

    fn open(&self, uri: &str) -> Result<FakeHandle, DriverError> {
        if let Some(err) = self.reject.lock().unwrap().clone() {
            return Err(err);
        }
        let remote = FakeRemote {
            uri: uri.to_string(),
            closes: Arc::new(AtomicUsize::new(0)),
            listeners: Arc::new(Mutex::new(Vec::new())),
        };
        self.remotes.lock().unwrap().push(remote.clone());
        Ok(FakeHandle { remote })
    }
}

pub struct FakeHandle {
    remote: FakeRemote,
}

impl DriverHandle for FakeHandle {
    type Collection = FakeCollection;

    fn collection(&self, name: &str) -> FakeCollection {
        FakeCollection {
            uri: self.remote.uri.clone(),
            name: name.to_string(),
        }
    }

    fn close(&self) {
        self.remote.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn subscribe(&self, listener: DriverListener) {
        self.remote.listeners.lock().unwrap().push(listener);
    }
}

use crate::connections::{
    driver::{Driver, DriverEvent, DriverHandle, DriverListener},
    errors::DriverError,
};
use log::{debug, error, info};
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, Credential, ServerAddress},
    Client, Collection, Database,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Driver backed by the official `mongodb` crate.
///
/// `open` only builds the client; the server is contacted by a background
/// `ping` whose outcome is reported as a `ready` or `error` event. Must be
/// used from inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct MongoDriver {
    timeout: Duration,
}

impl Default for MongoDriver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl MongoDriver {
    /// `timeout` bounds server selection, socket connect and the readiness ping.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Turns `[user[:pass]@]host[:port]/database` into client options.
    fn client_options(&self, uri: &str) -> Result<(ClientOptions, String), DriverError> {
        let url = url::Url::parse(&format!("mongodb://{}", uri))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DriverError::InvalidUri(format!("missing host in '{}'", uri)))?
            .to_string();
        let database = decode(url.path().trim_start_matches('/'))?;
        if database.is_empty() {
            return Err(DriverError::InvalidUri(format!(
                "missing database name in '{}'",
                uri
            )));
        }

        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host,
            port: url.port(),
        }];
        options.connect_timeout = Some(self.timeout);
        options.server_selection_timeout = Some(self.timeout);

        if !url.username().is_empty() {
            let mut credential = Credential::default();
            credential.username = Some(decode(url.username())?);
            credential.password = url.password().map(decode).transpose()?;
            options.credential = Some(credential);
        }

        Ok((options, database))
    }
}

// `url` hands back user info and path percent-encoded; the server wants the raw text.
fn decode(part: &str) -> Result<String, DriverError> {
    urlencoding::decode(part)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| DriverError::InvalidUri(e.to_string()))
}

impl Driver for MongoDriver {
    type Handle = MongoHandle;

    fn open(&self, uri: &str) -> Result<MongoHandle, DriverError> {
        let runtime = Handle::try_current()
            .map_err(|e| DriverError::Unavailable(format!("no tokio runtime: {}", e)))?;
        let (options, database_name) = self.client_options(uri)?;
        let client = Client::with_options(options)?;
        let database = client.database(&database_name);
        let lifecycle = Arc::new(Mutex::new(Lifecycle::default()));

        let ping_db = database.clone();
        let ping_lifecycle = Arc::clone(&lifecycle);
        let timeout = self.timeout;
        runtime.spawn(async move {
            let outcome =
                match tokio::time::timeout(timeout, ping_db.run_command(doc! { "ping": 1 })).await
                {
                    Ok(Ok(_)) => {
                        info!("MongoDB database '{}' is ready.", ping_db.name());
                        DriverEvent::Ready
                    }
                    Ok(Err(e)) => {
                        error!("MongoDB database '{}' failed: {}", ping_db.name(), e);
                        DriverEvent::Error(e.into())
                    }
                    Err(_) => {
                        error!(
                            "MongoDB database '{}' did not answer within {:?}",
                            ping_db.name(),
                            timeout
                        );
                        DriverEvent::Error(DriverError::Other(format!(
                            "ping timed out after {:?}",
                            timeout
                        )))
                    }
                };
            Lifecycle::settle(&ping_lifecycle, outcome);
        });

        Ok(MongoHandle {
            client,
            database,
            runtime,
            lifecycle,
        })
    }
}

/// Readiness outcome plus the listeners waiting for it.
#[derive(Default)]
struct Lifecycle {
    outcome: Option<DriverEvent>,
    listeners: Vec<DriverListener>,
}

impl Lifecycle {
    fn settle(lifecycle: &Mutex<Lifecycle>, outcome: DriverEvent) {
        // Listeners run outside the lock so they may subscribe again.
        let listeners = {
            let mut state = lifecycle.lock();
            state.outcome = Some(outcome.clone());
            state.listeners.clone()
        };
        for listener in listeners {
            listener(outcome.clone());
        }
    }
}

/// An open MongoDB client scoped to one database.
pub struct MongoHandle {
    client: Client,
    database: Database,
    runtime: Handle,
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl MongoHandle {
    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl DriverHandle for MongoHandle {
    type Collection = Collection<Document>;

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    fn close(&self) {
        let client = self.client.clone();
        let name = self.database.name().to_string();
        self.runtime.spawn(async move {
            client.shutdown().await;
            debug!("MongoDB client for '{}' shut down.", name);
        });
    }

    /// A listener added after the ping finished gets the recorded outcome
    /// straight away.
    fn subscribe(&self, listener: DriverListener) {
        let settled = {
            let mut state = self.lifecycle.lock();
            state.listeners.push(Arc::clone(&listener));
            state.outcome.clone()
        };
        if let Some(outcome) = settled {
            listener(outcome);
        }
    }
}

use clap::{Parser, Subcommand};
use log::info;
use std::fmt::{self, Display};
use std::io;

use crate::connections::config::{ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};
use crate::core::errors::DatabaseError;
use crate::storage::{Profile, ProfileStore};

/// Errors surfaced by the command-line front end.
#[derive(Debug)]
pub enum CliError {
    Io(io::Error),
    Database(DatabaseError),
    Other(String),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<DatabaseError> for CliError {
    fn from(err: DatabaseError) -> Self {
        CliError::Database(err)
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Database(e) => write!(f, "Database error: {}", e),
            CliError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "entity-db", version, subcommand_required = true)]
pub struct Args {
    /// Profile directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub profiles: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the connection URI for the given parameters
    Uri {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Manage saved connection profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Connect every saved profile and report which ones answer
    #[cfg(feature = "mongo")]
    Check {
        /// Seconds to wait for each server
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Create or overwrite a profile
    Save {
        /// Profile name, used as the connection name
        #[arg(long)]
        name: String,
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Register this profile as the default connection
        #[arg(long)]
        default: bool,
    },
    /// List saved profiles
    List,
    /// Delete a profile
    Delete {
        #[arg(long)]
        name: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct ConnectionArgs {
    /// Database name
    #[arg(long)]
    pub database: String,
    /// User name
    #[arg(long)]
    pub user: Option<String>,
    /// Password (only used together with --user)
    #[arg(long)]
    pub pass: Option<String>,
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,
    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl From<ConnectionArgs> for ConnectionConfig {
    fn from(args: ConnectionArgs) -> Self {
        ConnectionConfig {
            database_name: args.database,
            user: args.user,
            pass: args.pass,
            host: args.host,
            port: Some(args.port),
        }
    }
}

pub async fn run_cli(args: Args) -> Result<(), CliError> {
    let store = match args.profiles {
        Some(dir) => ProfileStore::with_dir(dir)?,
        None => ProfileStore::new()?,
    };

    match args.command {
        Command::Uri { connection } => {
            println!("{}", ConnectionConfig::from(connection).to_uri());
        }
        Command::Profile { action } => run_profile_action(&store, action)?,
        #[cfg(feature = "mongo")]
        Command::Check { timeout_secs } => {
            let report =
                check::run_check(&store, std::time::Duration::from_secs(timeout_secs)).await?;
            for (name, status) in &report.statuses {
                println!("{:<20} {}", name, status);
            }
            println!("default connection: '{}'", report.default_connection);
        }
    }
    Ok(())
}

fn run_profile_action(store: &ProfileStore, action: ProfileAction) -> Result<(), CliError> {
    match action {
        ProfileAction::Save {
            name,
            connection,
            default,
        } => {
            let mut profile = Profile::new(name, connection.into());
            profile.default = default;
            store.save(&profile)?;
            info!("Saved profile '{}' in {:?}", profile.name, store.dir());
        }
        ProfileAction::List => {
            for profile in store.list()? {
                let marker = if profile.default { "*" } else { " " };
                println!(
                    "{} {:<20} {}",
                    marker,
                    profile.name,
                    redacted_uri(&profile.config)
                );
            }
        }
        ProfileAction::Delete { name } => {
            if !store.delete(&name)? {
                return Err(CliError::Other(format!("No profile named '{}'", name)));
            }
            info!("Deleted profile '{}'", name);
        }
    }
    Ok(())
}

/// The profile's URI with the password masked.
fn redacted_uri(config: &ConnectionConfig) -> String {
    let mut config = config.clone();
    if config.pass.as_deref().is_some_and(|p| !p.is_empty()) {
        config.pass = Some("****".into());
    }
    config.to_uri()
}

#[cfg(feature = "mongo")]
mod check {
    use std::collections::HashMap;
    use std::fmt::{self, Display};
    use std::sync::Arc;
    use std::time::Duration;

    use log::{info, warn};
    use tokio::sync::broadcast::error::RecvError;

    use super::CliError;
    use crate::connections::events::{ConnectionEvent, EventBus};
    use crate::connections::mongo::MongoDriver;
    use crate::core::registry::ConnectionRegistry;
    use crate::storage::ProfileStore;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum CheckStatus {
        Ready,
        Error(String),
        NoAnswer,
    }

    impl Display for CheckStatus {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CheckStatus::Ready => write!(f, "ready"),
                CheckStatus::Error(msg) => write!(f, "error: {}", msg),
                CheckStatus::NoAnswer => write!(f, "no answer"),
            }
        }
    }

    /// One status per saved profile, in profile order.
    #[derive(Debug, Default)]
    pub struct CheckReport {
        pub statuses: Vec<(String, CheckStatus)>,
        pub default_connection: String,
    }

    /// Registers every saved profile, waits for one ready/error event per
    /// connection, then disconnects them all. A profile the driver rejects
    /// is reported as an error and the others are still checked.
    pub async fn run_check(store: &ProfileStore, timeout: Duration) -> Result<CheckReport, CliError> {
        let profiles = store.list()?;
        if profiles.is_empty() {
            info!("No saved profiles in {:?}", store.dir());
            return Ok(CheckReport::default());
        }

        // Subscribe before connecting so no event is missed.
        let bus = EventBus::default();
        let mut events = bus.subscribe();
        let registry = ConnectionRegistry::with_events(MongoDriver::new(timeout), Arc::new(bus));

        let mut statuses: HashMap<String, CheckStatus> = HashMap::new();
        for profile in &profiles {
            let status = match registry.connect(&profile.name, &profile.config, profile.default) {
                Ok(_) => CheckStatus::NoAnswer,
                Err(e) => {
                    warn!("Could not open '{}': {}", profile.name, e);
                    CheckStatus::Error(e.to_string())
                }
            };
            statuses.insert(profile.name.clone(), status);
        }

        let mut pending = registry.len();
        let deadline = tokio::time::Instant::now() + timeout + Duration::from_secs(1);
        while pending > 0 {
            match tokio::time::timeout_at(deadline, events.recv()).await {
                Ok(Ok(event)) => {
                    let Some(status) = statuses.get_mut(event.connection()) else {
                        continue;
                    };
                    if *status != CheckStatus::NoAnswer {
                        continue;
                    }
                    *status = match event {
                        ConnectionEvent::Ready { .. } => CheckStatus::Ready,
                        ConnectionEvent::Error { err, .. } => CheckStatus::Error(err.to_string()),
                    };
                    pending -= 1;
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    warn!("Missed {} connection events", skipped);
                }
                Ok(Err(RecvError::Closed)) | Err(_) => break,
            }
        }

        let default_connection = registry.default_connection();
        registry.disconnect_all();

        let statuses = profiles
            .into_iter()
            .filter_map(|p| statuses.remove(&p.name).map(|status| (p.name, status)))
            .collect();
        Ok(CheckReport {
            statuses,
            default_connection,
        })
    }
}

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 27017;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> Option<u16> {
    Some(DEFAULT_PORT)
}

/// Parameters for one database connection.
///
/// JSON looks like:
/// `{ "databaseName":"app", "user":"admin", "pass":"secret", "host":"db", "port":27017 }`
///
/// Only used to derive a connection URI; the registry does not keep it around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub database_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: Option<u16>,
}

impl ConnectionConfig {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            user: None,
            pass: None,
            host: default_host(),
            port: default_port(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// `None` drops the port from the URI entirely.
    pub fn with_port(mut self, port: impl Into<Option<u16>>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, pass: Option<String>) -> Self {
        self.user = Some(user.into());
        self.pass = pass;
        self
    }

    /// Builds the connection string handed to the driver: `[user[:pass]@]host[:port]/database`.
    ///
    /// Values are concatenated as-is. Nothing is percent-encoded, so callers must
    /// not pass user names or passwords containing `@`, `:` or `/`.
    pub fn to_uri(&self) -> String {
        let mut uri = String::new();

        if let Some(user) = present(&self.user) {
            uri.push_str(user);
            if let Some(pass) = present(&self.pass) {
                uri.push(':');
                uri.push_str(pass);
            }
            uri.push('@');
        }

        if self.host.is_empty() {
            uri.push_str(DEFAULT_HOST);
        } else {
            uri.push_str(&self.host);
        }

        if let Some(port) = self.port {
            uri.push(':');
            uri.push_str(&port.to_string());
        }

        uri.push('/');
        uri.push_str(&self.database_name);
        uri
    }
}

// Empty strings count as missing.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

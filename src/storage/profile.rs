use serde::{Deserialize, Serialize};

use crate::connections::config::ConnectionConfig;

/// A user-named connection preset.
///
/// The config is flattened, so JSON looks like:
/// `{ "name":"main", "databaseName":"app", "host":"db", "port":27017, "default":true }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(flatten)]
    pub config: ConnectionConfig,
    /// Register this profile as the default connection.
    #[serde(default)]
    pub default: bool,
}

impl Profile {
    pub fn new(name: impl Into<String>, config: ConnectionConfig) -> Self {
        Self {
            name: name.into(),
            config,
            default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

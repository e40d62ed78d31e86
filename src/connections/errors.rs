use std::fmt::{self, Display};

/// Errors reported by a database driver.
///
/// Raised synchronously by `Driver::open` or carried asynchronously inside
/// `DriverEvent::Error`. The variants only hold strings so the error can be
/// cloned into every event subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    InvalidUri(String),
    Unavailable(String),
    Other(String),
}

/// Convert from url::ParseError.
#[cfg(feature = "mongo")]
impl From<url::ParseError> for DriverError {
    fn from(err: url::ParseError) -> Self {
        DriverError::InvalidUri(err.to_string())
    }
}

/// Convert from mongodb::error::Error.
/// Without this, `?` won't work on the client calls inside the mongo driver.
#[cfg(feature = "mongo")]
impl From<mongodb::error::Error> for DriverError {
    fn from(err: mongodb::error::Error) -> Self {
        DriverError::Other(err.to_string())
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::InvalidUri(msg) => write!(f, "Invalid connection URI: {}", msg),
            DriverError::Unavailable(msg) => write!(f, "Driver unavailable: {}", msg),
            DriverError::Other(msg) => write!(f, "Driver error: {}", msg),
        }
    }
}

impl std::error::Error for DriverError {}

use std::fmt::{self, Display};

use crate::connections::errors::DriverError;

/// A central error enum for registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// `connect` was called with a name that is already registered.
    DuplicateConnection(String),
    /// The referenced connection name is not registered.
    UnknownConnection(String),
    /// The driver refused to open a handle.
    Driver(DriverError),
}

impl DatabaseError {
    /// The connection name the error refers to, if any.
    pub fn connection_name(&self) -> Option<&str> {
        match self {
            DatabaseError::DuplicateConnection(name) | DatabaseError::UnknownConnection(name) => {
                Some(name)
            }
            DatabaseError::Driver(_) => None,
        }
    }
}

/// Convert from DriverError.
impl From<DriverError> for DatabaseError {
    fn from(err: DriverError) -> Self {
        DatabaseError::Driver(err)
    }
}

impl Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::DuplicateConnection(name) => {
                write!(f, "Connection '{}' is already defined", name)
            }
            DatabaseError::UnknownConnection(name) => {
                write!(f, "Connection '{}' is not defined", name)
            }
            DatabaseError::Driver(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatabaseError::Driver(e) => Some(e),
            _ => None,
        }
    }
}

pub mod config;
pub mod connection;
pub mod driver;
pub mod errors;
pub mod events;
#[cfg(feature = "mongo")]
pub mod mongo;

// Re-export the modules here for easy import elsewhere.
pub use config::*;
pub use connection::*;
pub use driver::*;
pub use errors::*;
pub use events::*;

pub mod connections;
pub mod core;
pub mod storage;
pub mod ui;
pub mod utils;

// re‑export ergonomic entry points
pub use connections::{
    Connection, ConnectionConfig, ConnectionEvent, Driver, DriverError, DriverEvent,
    DriverHandle, EventBus, EventSink,
};
pub use core::{ConnectionRegistry, DatabaseError};
pub use storage::{Profile, ProfileStore};

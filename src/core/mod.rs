pub mod errors;
pub mod registry;

// Re-export the modules here for easy import elsewhere.
pub use errors::*;
pub use registry::*;

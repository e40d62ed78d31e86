pub mod profile;
pub mod store;

pub use profile::Profile;
pub use store::ProfileStore;

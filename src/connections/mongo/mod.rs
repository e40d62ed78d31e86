pub mod mongo_driver;

pub use mongo_driver::{MongoDriver, MongoHandle};

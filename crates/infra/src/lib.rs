//! Infrastructure layer: configuration and the document store.

pub mod config;
pub mod store;

pub use config::{Settings, StoreBackend};
pub use store::{ForumStore, InMemoryStore, MongoStore, SharedStore, StoreError, StoreResult};

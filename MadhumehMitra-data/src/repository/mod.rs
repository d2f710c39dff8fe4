// Repository module structure
pub mod errors;
mod in_memory;
mod kv;
mod log_store;
mod preferences;
mod retention;
#[cfg(feature = "sqlite")]
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryStorage;
pub use kv::KeyValueStore;
pub use log_store::{GuestLogStore, LogStoreTrait, ProfileLogStore};
pub use preferences::PreferencesRepository;
pub use retention::{insert_with_retention, MAX_STORED_LOGS};
#[cfg(feature = "sqlite")]
pub use storage::DatabaseStorage;

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use log_store::tests;

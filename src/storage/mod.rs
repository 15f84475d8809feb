//! Document store, SQLite backend, and client-side local storage

pub mod db;
pub mod document;
pub mod local;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool, SqliteStore};
pub use document::{DocumentStore, MemoryStore};
pub use local::{FileStorage, LocalStorage, MemoryStorage};

//! Record storage underneath the repository.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use schema::SCHEMA;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::models::Patient;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed date/time column: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed record storage.
///
/// Implementations hold records by `id` and know nothing about search,
/// ordering, or pagination; those semantics live in the repository so every
/// store behaves identically.
pub trait PatientStore {
    /// Add a record. The caller guarantees the id is fresh.
    fn insert(&mut self, patient: Patient) -> StoreResult<()>;

    /// Fetch a record by id.
    fn get(&self, id: &str) -> StoreResult<Option<Patient>>;

    /// Overwrite the record with the same id. False when no such record.
    fn replace(&mut self, patient: Patient) -> StoreResult<bool>;

    /// Remove a record by id. False when no such record.
    fn remove(&mut self, id: &str) -> StoreResult<bool>;

    /// Snapshot of every stored record, in no particular order.
    fn all(&self) -> StoreResult<Vec<Patient>>;
}

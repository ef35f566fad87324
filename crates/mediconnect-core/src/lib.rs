//! MediConnect core library.
//!
//! Patient-record management for clinic administration: the data model,
//! identifier normalization, the form-layer validation contract, and a
//! repository offering listing with search and pagination, lookup,
//! creation, sparse merge updates, and deletion over a pluggable record
//! store.
//!
//! # Architecture
//!
//! ```text
//! UI / forms ──▶ validate ──▶ PatientRepository ──▶ PatientStore
//!                                   │               (memory | sqlite)
//!                                   └─▶ normalize (digits-only canon)
//! ```
//!
//! The repository owns all query semantics (creation-time ordering, search
//! matching, page slicing); stores are dumb keyed-record holders, so the
//! in-memory stand-in and the SQLite client behave identically and a real
//! backend slots in behind the same trait.
//!
//! # Modules
//!
//! - [`models`]: domain types ([`Patient`], [`NewPatient`],
//!   [`PatientUpdate`], [`Patch`])
//! - [`normalize`]: digits-only and empty-trimming helpers
//! - [`validate`]: the form contract the repository trusts
//! - [`store`]: record storage
//! - [`repository`]: the patient repository

pub mod models;
pub mod normalize;
pub mod repository;
pub mod store;
pub mod validate;

pub use models::{NewPatient, Patch, Patient, PatientUpdate};
pub use repository::{
    ListQuery, PatientPage, PatientRepository, RepoResult, RepositoryError,
};
pub use store::{MemoryStore, PatientStore, SqliteStore, StoreError, StoreResult};
pub use validate::{validate_new, validate_update, ValidationError};

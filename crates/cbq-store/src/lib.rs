//! Data Query Interface for cbioquery.
//!
//! The dispatcher talks to a [`MutationStore`]; implementations exist for
//! PostgreSQL, an in-memory dataset loaded from cBioPortal flat files, and
//! a scripted mock for tests.

pub mod dataset;
pub mod error;
pub mod memory;
pub mod mock;
pub mod postgres;
pub mod store;

pub use dataset::DatasetError;
pub use error::{StoreError, StoreResult};
pub use memory::{Dataset, MemoryStore};
pub use mock::MockStore;
pub use postgres::PgStore;
pub use store::{DEFAULT_LEAST_N, MutationStore, effective_least_n};

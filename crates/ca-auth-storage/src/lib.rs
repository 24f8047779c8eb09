//! # ca-auth-storage
//!
//! Document store abstraction for ca-auth account records.
//!
//! Provides the `DocumentStore` interface (key lookup, conflict-signalling
//! create, equality search, database/index provisioning) with a CouchDB
//! HTTP implementation and an in-memory implementation.

#![warn(clippy::all)]

pub mod backend;
pub mod couchdb_impl;
pub mod databases;
pub mod errors;
pub mod memory_impl;
pub mod traits;

pub use backend::DocumentBackend;
pub use couchdb_impl::{CouchDbConfig, CouchDbStore};
pub use databases::*;
pub use errors::{Result, StorageError};
pub use memory_impl::InMemoryStore;
pub use traits::{DocumentStore, SearchRequest};

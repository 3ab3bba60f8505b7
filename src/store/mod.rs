//! Persistence layer: libSQL-backed storage for the clinic schema.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

#[cfg(test)]
pub(crate) mod fixtures;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, Listing, Page};

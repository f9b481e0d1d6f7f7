//! SQLite backend for the clan genealogy store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Besides the [`ClanStore`] accessors it
//! owns the schema (including the FTS5 projection and its triggers) and the
//! transactional bulk loader.
//!
//! [`ClanStore`]: clan_core::store::ClanStore

mod encode;
mod load;
mod schema;
mod store;
mod write;

pub mod error;

pub use error::{Error, Result};
pub use schema::SchemaReport;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;

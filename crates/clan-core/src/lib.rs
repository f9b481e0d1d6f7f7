//! Core types and trait definitions for the clan genealogy store.
//!
//! This crate is deliberately free of file-format and database dependencies.
//! The import codec, the SQLite backend and the binary all depend on it.

pub mod error;
pub mod id;
pub mod load;
pub mod media;
pub mod member;
pub mod record;
pub mod resolve;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
pub use id::MemberId;

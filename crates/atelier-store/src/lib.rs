//! Atelier - Metadata Store
//!
//! A single-file SQLite metadata database plus blob files on disk, giving
//! analysis projects a cache store, a result store with public/private
//! visibility and optional at-rest encryption, and a data provenance
//! registry. Blobs are hash-verified on every read.

pub mod blob;
pub mod cache;
pub mod crypto;
pub mod data;
pub mod db;
pub mod error;
pub mod results;
pub mod txn;

pub use blob::*;
pub use cache::*;
pub use crypto::*;
pub use data::*;
pub use db::*;
pub use error::*;
pub use results::*;
pub use txn::*;

//! songlake-file - Filesystem-backed song store.
//!
//! Songs are stored one JSON document per file. Queries are translated into
//! a document filter (`$and`, `$or`, `$nor`, `$exists`, `$in`) and evaluated
//! against each stored document.

mod document;
pub mod filter;
mod id;
mod store;

pub use store::FileStore;

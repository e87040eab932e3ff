//! Core traits for storage backends.

mod store;

pub use store::SongStore;

//! Song store trait.

use async_trait::async_trait;

use crate::Result;
use crate::query::Predicate;
use crate::types::{NewSong, Song, SongId, TagUpdate};

/// A durable record store backing the catalog.
///
/// Each method is one round trip. Implementations translate [`Predicate`]
/// into their native query form and own ordering, durability and
/// per-document update atomicity.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Persist a batch of songs, assigning each an identifier.
    ///
    /// Returns the identifiers in input order.
    async fn insert_many(&self, songs: Vec<NewSong>) -> Result<Vec<SongId>>;

    /// Find every song matching the predicate.
    ///
    /// The order must be deterministic for an unchanged set of songs.
    async fn find(&self, predicate: &Predicate) -> Result<Vec<Song>>;

    /// Apply a tag update to one song atomically.
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if no song has the id.
    async fn update_fields(&self, id: &SongId, update: &TagUpdate) -> Result<()>;
}

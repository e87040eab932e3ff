//! In-memory song store.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::Result;
use crate::error::Error;
use crate::query::Predicate;
use crate::traits::SongStore;
use crate::types::{NewSong, SONG_ID_LEN, Song, SongId, TagUpdate};

/// A [`SongStore`] held in process memory.
///
/// Songs are kept in insertion order, which is the order `find` returns.
/// Nothing survives the process; intended for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    songs: RwLock<Vec<Song>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_id(&self) -> SongId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut bytes = [0u8; SONG_ID_LEN];
        bytes[SONG_ID_LEN - 8..].copy_from_slice(&n.to_be_bytes());
        SongId::from_bytes(bytes)
    }
}

#[async_trait]
impl SongStore for MemoryStore {
    #[instrument(skip(self, songs), fields(count = songs.len()))]
    async fn insert_many(&self, songs: Vec<NewSong>) -> Result<Vec<SongId>> {
        let mut stored = self.songs.write().await;
        let mut ids = Vec::with_capacity(songs.len());

        for song in songs {
            let id = self.generate_id();
            ids.push(id.clone());
            stored.push(song.into_song(id));
        }

        debug!("Inserted songs");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn find(&self, predicate: &Predicate) -> Result<Vec<Song>> {
        let stored = self.songs.read().await;
        let found: Vec<Song> = stored
            .iter()
            .filter(|s| predicate.matches(s))
            .cloned()
            .collect();

        debug!(found = found.len(), "Found songs");
        Ok(found)
    }

    #[instrument(skip(self, update), fields(%id))]
    async fn update_fields(&self, id: &SongId, update: &TagUpdate) -> Result<()> {
        let mut stored = self.songs.write().await;
        let song = stored
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| Error::NotFound { id: id.to_string() })?;

        update.apply(&mut song.tags);

        debug!("Updated song tags");
        Ok(())
    }
}

//! Catalog service.
//!
//! [`Catalog`] is the entry point for every catalog operation. It validates
//! requests, builds predicates, makes exactly one store round trip and
//! shapes the result. It holds nothing but the store handle, so one value
//! can serve concurrent callers.

use std::collections::BTreeSet;

use tracing::{debug, error, info, instrument};

use crate::Result;
use crate::error::InvalidArgumentError;
use crate::page::{Page, PageRequest};
use crate::query::Selector;
use crate::traits::SongStore;
use crate::types::{NewSong, Song, SongId, TagUpdate, Tags, validate_stored_tags};

/// A lookup: which songs, and which page of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
    /// Which songs to select.
    pub selector: Selector,
    /// Offset into the ordered result set.
    pub page_token: i64,
    /// Maximum songs to return, zero for all remaining.
    pub page_size: i64,
}

impl LookupRequest {
    /// Request the first page of the given selection, unbounded.
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            page_token: 0,
            page_size: 0,
        }
    }

    /// Set the page token and size.
    pub fn with_page(mut self, page_token: i64, page_size: i64) -> Self {
        self.page_token = page_token;
        self.page_size = page_size;
        self
    }
}

/// The catalog service.
#[derive(Debug, Clone)]
pub struct Catalog<S> {
    store: S,
}

impl<S: SongStore> Catalog<S> {
    /// Create a catalog over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a batch of songs in one store call.
    ///
    /// Every song is validated before anything is written. If the store
    /// fails, the whole call fails and no ids are returned; whether any
    /// songs were written is up to the store.
    #[instrument(skip(self, songs), fields(count = songs.len()))]
    pub async fn ingest(&self, songs: Vec<NewSong>) -> Result<Vec<SongId>> {
        for (index, song) in songs.iter().enumerate() {
            song.validate(index)?;
        }

        if songs.is_empty() {
            debug!("Empty ingest batch");
            return Ok(Vec::new());
        }

        let ids = self.store.insert_many(songs).await.inspect_err(|e| {
            error!(error = %e, "Failed to add songs");
        })?;

        info!(count = ids.len(), "Added songs");
        Ok(ids)
    }

    /// Find songs and return one page of them.
    #[instrument(skip(self, request), fields(page_token = request.page_token, page_size = request.page_size))]
    pub async fn lookup(&self, request: LookupRequest) -> Result<Page<Song>> {
        let page = PageRequest::new(request.page_token, request.page_size)?;
        let predicate = request.selector.build()?;
        debug!(?predicate, "Built predicate");

        let songs = self.store.find(&predicate).await.inspect_err(|e| {
            error!(error = %e, "Failed to find songs");
        })?;

        let total = songs.len();
        let page = page.apply(songs);
        debug!(
            total,
            returned = page.items.len(),
            next_token = page.next_token,
            "Paged songs"
        );
        Ok(page)
    }

    /// Merge tags into a song, overwriting existing values.
    #[instrument(skip(self, tags), fields(%id, count = tags.len()))]
    pub async fn add_tags(&self, id: &str, tags: Tags) -> Result<()> {
        let id = SongId::new(id)?;
        validate_stored_tags(&tags)?;

        self.store
            .update_fields(&id, &TagUpdate::set(tags))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to add tags"))?;

        debug!("Added tags");
        Ok(())
    }

    /// Remove tags from a song by name.
    ///
    /// Names the song does not carry are ignored. Callers holding a
    /// name-to-value map pass its keys; the values carry no meaning here.
    #[instrument(skip(self, names), fields(%id))]
    pub async fn remove_tags<I, K>(&self, id: &str, names: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let id = SongId::new(id)?;
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.iter().any(String::is_empty) {
            return Err(InvalidArgumentError::EmptyTagName.into());
        }

        self.store
            .update_fields(&id, &TagUpdate::unset(names))
            .await
            .inspect_err(|e| error!(error = %e, "Failed to remove tags"))?;

        debug!("Removed tags");
        Ok(())
    }
}

//! songlake-core - Core types, query builder and catalog service.
//!
//! Songs are media file records with free-form tags. A [`Catalog`] ingests
//! them, finds them by id or tag predicate with offset pagination, and
//! merges or removes their tags. Storage is behind the [`SongStore`] trait.
//!
//! # Example
//!
//! ```
//! use songlake_core::query::{Combinator, Selector, TagFilter};
//! use songlake_core::{Catalog, LookupRequest, MemoryStore, NewSong};
//!
//! # async fn example() -> Result<(), songlake_core::Error> {
//! let catalog = Catalog::new(MemoryStore::new());
//! catalog
//!     .ingest(vec![NewSong::new("gs://songs/a.mp3").with_tag("genre", "rock")])
//!     .await?;
//!
//! let filter = TagFilter::new(Combinator::All).with_tag("genre", "rock");
//! let page = catalog
//!     .lookup(LookupRequest::new(Selector::Tags(filter)).with_page(0, 10))
//!     .await?;
//!
//! assert_eq!(page.items.len(), 1);
//! assert_eq!(page.next_token, 1);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod memory;
pub mod page;
pub mod query;
pub mod traits;
pub mod types;

pub use catalog::{Catalog, LookupRequest};
pub use error::{Error, InvalidArgumentError};
pub use memory::MemoryStore;
pub use page::{Page, PageRequest};
pub use query::{Combinator, Predicate, Selector, TagClause, TagFilter};
pub use traits::SongStore;
pub use types::{NewSong, Song, SongId, TagUpdate, Tags};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

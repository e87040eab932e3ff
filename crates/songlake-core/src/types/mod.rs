//! Core catalog types.
//!
//! These types enforce catalog invariants at construction time,
//! so a malformed identifier never reaches the store.

mod song;
mod song_id;

pub(crate) use song::validate_stored_tags;
pub use song::{NewSong, Song, TagUpdate, Tags};
pub use song_id::{SONG_ID_LEN, SongId};

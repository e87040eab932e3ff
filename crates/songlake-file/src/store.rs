//! Filesystem song store.
//!
//! ## Directory Structure
//!
//! ```text
//! $ROOT/
//! └── <database>/
//!     ├── songs/
//!     │   └── <id>.json
//!     └── songs.lock
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use tracing::{Span, debug, instrument, warn};

use songlake_core::error::{Error, InvalidArgumentError};
use songlake_core::query::Predicate;
use songlake_core::traits::SongStore;
use songlake_core::{NewSong, Result, Song, SongId, TagUpdate};

use crate::document::SongDocument;
use crate::filter;
use crate::id::IdGenerator;

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(20);

fn map_io(operation: &'static str) -> impl Fn(std::io::Error) -> Error {
    move |err| Error::unavailable(operation, format!("IO error: {}", err))
}

/// Held while writing. Dropping it releases the lock.
struct WriteLock(File);

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = self.0.unlock() {
            warn!(error = %e, "Failed to release store lock");
        }
    }
}

/// Filesystem-backed song store.
///
/// Writers serialize on an exclusive lock file per database, so each
/// document update is atomic with respect to other writers, including
/// other processes. Documents are replaced by rename, so readers never see
/// a partial write and take no lock.
///
/// A batch insert writes its documents one at a time under a single lock.
/// If a write fails part way, songs already written stay stored and the
/// call returns the error without their ids.
///
/// Waiting for the lock is async and stops when the call is dropped. File
/// work runs on the blocking pool and always finishes once started.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    database: String,
    ids: Arc<IdGenerator>,
}

impl FileStore {
    /// Open the named database under a root directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error for an unusable database name and
    /// an unavailable error if the directories cannot be created.
    #[instrument(skip(root), fields(path = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>, database: &str) -> Result<Self> {
        if database.is_empty()
            || database.starts_with('.')
            || database.contains(['/', '\\'])
        {
            return Err(InvalidArgumentError::Other {
                message: format!("invalid database name '{}'", database),
            }
            .into());
        }

        let store = Self {
            root: root.as_ref().to_path_buf(),
            database: database.to_string(),
            ids: Arc::new(IdGenerator::new()),
        };

        fs::create_dir_all(store.songs_dir()).map_err(map_io("open"))?;
        debug!("Opened song store");

        Ok(store)
    }

    /// Get the database directory.
    fn database_dir(&self) -> PathBuf {
        self.root.join(&self.database)
    }

    /// Get the songs directory.
    fn songs_dir(&self) -> PathBuf {
        self.database_dir().join("songs")
    }

    /// Get the path for a specific song.
    fn song_path(&self, id: &SongId) -> PathBuf {
        self.songs_dir().join(format!("{}.json", id))
    }

    /// Get the write lock file path.
    fn lock_path(&self) -> PathBuf {
        self.database_dir().join("songs.lock")
    }

    /// Wait for the write lock.
    ///
    /// The lock is polled rather than waited on in the kernel, so dropping
    /// the returned future stops the wait.
    async fn lock(&self, operation: &'static str) -> Result<WriteLock> {
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(map_io(operation))?;

        let contended = fs2::lock_contended_error().raw_os_error();
        let mut waited = false;
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => return Ok(WriteLock(lock_file)),
                Err(e) if e.raw_os_error() == contended => {
                    if !waited {
                        debug!("Waiting for store lock");
                        waited = true;
                    }
                    tokio::time::sleep(LOCK_POLL_INTERVAL).await;
                }
                Err(e) => return Err(map_io(operation)(e)),
            }
        }
    }

    fn write_document(&self, operation: &'static str, doc: &SongDocument) -> Result<()> {
        let path = self.song_path(&doc.id);
        let content =
            serde_json::to_string_pretty(doc).map_err(|e| Error::internal(operation, e))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(map_io(operation))?;
        fs::rename(&temp_path, &path).map_err(map_io(operation))?;

        Ok(())
    }

    fn read_value(&self, operation: &'static str, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(map_io(operation))?;
        serde_json::from_str(&content).map_err(|e| {
            Error::internal(operation, format!("corrupt document {}: {}", path.display(), e))
        })
    }

    fn decode(operation: &'static str, value: Value) -> Result<SongDocument> {
        serde_json::from_value(value).map_err(|e| Error::internal(operation, e))
    }

    fn write_songs(&self, songs: Vec<NewSong>) -> Result<Vec<SongId>> {
        const OP: &str = "insert_many";
        let mut ids = Vec::with_capacity(songs.len());
        for song in songs {
            let id = self.ids.next_id();
            if self.song_path(&id).exists() {
                return Err(Error::internal(OP, format!("id {} already stored", id)));
            }

            let doc = SongDocument::from(song.into_song(id.clone()));
            self.write_document(OP, &doc)?;
            debug!(%id, "Inserted song");
            ids.push(id);
        }
        Ok(ids)
    }

    fn scan(&self, query: &Value) -> Result<Vec<Song>> {
        const OP: &str = "find";
        let dir = self.songs_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<_> = fs::read_dir(&dir)
            .map_err(map_io(OP))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();

        // File names are ids, so this is id order.
        entries.sort();

        let mut songs: Vec<Song> = Vec::new();
        for path in entries {
            let value = self.read_value(OP, &path)?;
            if filter::matches(query, &value) {
                songs.push(Self::decode(OP, value)?.into());
            }
        }
        Ok(songs)
    }

    fn rewrite_tags(&self, id: &SongId, update: &TagUpdate) -> Result<()> {
        const OP: &str = "update_fields";
        let path = self.song_path(id);
        if !path.exists() {
            return Err(Error::NotFound { id: id.to_string() });
        }

        let mut doc = Self::decode(OP, self.read_value(OP, &path)?)?;
        update.apply(&mut doc.tags);
        self.write_document(OP, &doc)
    }
}

/// Run blocking file work off the async runtime, inside the caller's span.
///
/// If the caller is dropped the work still runs to completion, so a held
/// [`WriteLock`] is always released.
async fn run_blocking<T, F>(operation: &'static str, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let span = Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|e| Error::internal(operation, e))?
}

#[async_trait]
impl SongStore for FileStore {
    #[instrument(skip(self, songs), fields(database = %self.database, count = songs.len()))]
    async fn insert_many(&self, songs: Vec<NewSong>) -> Result<Vec<SongId>> {
        const OP: &str = "insert_many";
        let lock = self.lock(OP).await?;
        let store = self.clone();

        run_blocking(OP, move || {
            let _lock = lock;
            store.write_songs(songs)
        })
        .await
    }

    #[instrument(skip(self, predicate), fields(database = %self.database))]
    async fn find(&self, predicate: &Predicate) -> Result<Vec<Song>> {
        const OP: &str = "find";
        let query = filter::to_filter(predicate);
        debug!(%query, "Finding songs");

        let store = self.clone();
        let songs = run_blocking(OP, move || store.scan(&query)).await?;

        debug!(found = songs.len(), "Found songs");
        Ok(songs)
    }

    #[instrument(skip(self, update), fields(database = %self.database, %id))]
    async fn update_fields(&self, id: &SongId, update: &TagUpdate) -> Result<()> {
        const OP: &str = "update_fields";
        let lock = self.lock(OP).await?;
        let store = self.clone();
        let (id, changes) = (id.clone(), update.clone());

        run_blocking(OP, move || {
            let _lock = lock;
            store.rewrite_tags(&id, &changes)
        })
        .await?;

        debug!(
            set = update.set.len(),
            unset = update.unset.len(),
            "Updated song tags"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use songlake_core::query::{Combinator, Selector, TagFilter};
    use songlake_core::{Catalog, LookupRequest, Tags};
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FileStore) {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path(), "test").unwrap();
        (tmp, store)
    }

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn open_rejects_bad_database_names() {
        let tmp = TempDir::new().unwrap();
        for name in ["", "..", "a/b", ".hidden"] {
            assert!(FileStore::open(tmp.path(), name).is_err(), "{name}");
        }
    }

    #[test]
    fn databases_are_separate_directories() {
        let tmp = TempDir::new().unwrap();
        FileStore::open(tmp.path(), "prod").unwrap();
        FileStore::open(tmp.path(), "test").unwrap();

        assert!(tmp.path().join("prod").join("songs").is_dir());
        assert!(tmp.path().join("test").join("songs").is_dir());
    }

    #[tokio::test]
    async fn insert_and_find_all() {
        let (_tmp, store) = create_test_store();

        let ids = store
            .insert_many(vec![
                NewSong::new("gs://test-songs/a.mp3")
                    .with_name("SuperPop Song")
                    .with_mime_type("audio/mpeg"),
                NewSong::new("gs://test-songs/b.mp3").with_tag("genre", "rock"),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let songs = store.find(&Predicate::MatchAll).await.unwrap();
        let found: Vec<_> = songs.iter().map(|s| s.id.clone()).collect();
        assert_eq!(found, ids);
        assert_eq!(songs[0].name.as_deref(), Some("SuperPop Song"));
        assert_eq!(songs[0].mime_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(songs[1].tag("genre"), Some("rock"));
    }

    #[tokio::test]
    async fn find_by_tags_and_ids() {
        let (_tmp, store) = create_test_store();
        let ids = store
            .insert_many(vec![
                NewSong::new("gs://a.mp3").with_tag("genre", "rock"),
                NewSong::new("gs://b.mp3").with_tag("genre", "jazz"),
                NewSong::new("gs://c.mp3"),
            ])
            .await
            .unwrap();

        let predicate = Selector::Tags(TagFilter::new(Combinator::None).with_tag("genre", "*"))
            .build()
            .unwrap();
        let songs = store.find(&predicate).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, ids[2]);

        let predicate = Selector::Ids(vec![ids[1].to_string()]).build().unwrap();
        let songs = store.find(&predicate).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].uri, "gs://b.mp3");
    }

    #[tokio::test]
    async fn update_sets_and_unsets() {
        let (_tmp, store) = create_test_store();
        let ids = store
            .insert_many(vec![NewSong::new("gs://a.mp3").with_tag("heavyness", "light")])
            .await
            .unwrap();

        store
            .update_fields(&ids[0], &TagUpdate::set(tags(&[("heavyness", "heavy")])))
            .await
            .unwrap();
        let songs = store.find(&Predicate::MatchAll).await.unwrap();
        assert_eq!(songs[0].tag("heavyness"), Some("heavy"));

        store
            .update_fields(
                &ids[0],
                &TagUpdate::unset(["heavyness".to_string(), "missing".to_string()].into()),
            )
            .await
            .unwrap();
        let songs = store.find(&Predicate::MatchAll).await.unwrap();
        assert!(songs[0].tags.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let (_tmp, store) = create_test_store();
        let id = SongId::new("602b29014accf1b3f3d462d0").unwrap();

        let err = store
            .update_fields(&id, &TagUpdate::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    fn hold_lock(tmp: &TempDir) -> File {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(tmp.path().join("test").join("songs.lock"))
            .unwrap();
        file.lock_exclusive().unwrap();
        file
    }

    #[tokio::test]
    async fn lock_wait_is_abandoned_on_timeout() {
        let (tmp, store) = create_test_store();
        let ids = store
            .insert_many(vec![NewSong::new("gs://a.mp3")])
            .await
            .unwrap();

        let held = hold_lock(&tmp);
        let started = std::time::Instant::now();
        let update = TagUpdate::set(tags(&[("genre", "rock")]));
        let result =
            tokio::time::timeout(Duration::from_millis(200), store.update_fields(&ids[0], &update))
                .await;
        assert!(result.is_err(), "update should still be waiting for the lock");
        assert!(started.elapsed() < Duration::from_secs(2));

        let songs = store.find(&Predicate::MatchAll).await.unwrap();
        assert!(songs[0].tags.is_empty());

        drop(held);
        store.update_fields(&ids[0], &update).await.unwrap();
        let songs = store.find(&Predicate::MatchAll).await.unwrap();
        assert_eq!(songs[0].tag("genre"), Some("rock"));
    }

    #[tokio::test]
    async fn reads_do_not_wait_for_the_lock() {
        let (tmp, store) = create_test_store();
        store
            .insert_many(vec![NewSong::new("gs://a.mp3")])
            .await
            .unwrap();

        let _held = hold_lock(&tmp);
        let songs = tokio::time::timeout(Duration::from_secs(2), store.find(&Predicate::MatchAll))
            .await
            .expect("find should not take the lock")
            .unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_document_is_internal() {
        let (tmp, store) = create_test_store();
        fs::write(
            tmp.path().join("test").join("songs").join("602b29014accf1b3f3d462d0.json"),
            "{not json",
        )
        .unwrap();

        let err = store.find(&Predicate::MatchAll).await.unwrap_err();
        assert_eq!(err.code(), "Internal");
    }

    #[tokio::test]
    async fn songs_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let ids = FileStore::open(tmp.path(), "test")
            .unwrap()
            .insert_many(vec![NewSong::new("gs://a.mp3")])
            .await
            .unwrap();

        let reopened = FileStore::open(tmp.path(), "test").unwrap();
        let songs = reopened.find(&Predicate::MatchAll).await.unwrap();
        assert_eq!(songs[0].id, ids[0]);
    }

    #[tokio::test]
    async fn catalog_scenario_over_files() {
        let (_tmp, store) = create_test_store();
        let catalog = Catalog::new(store);

        let ids = catalog
            .ingest(vec![
                NewSong::new("gs://test-songs/song.mp3").with_tag("genre", "Hip Hop"),
                NewSong::new("gs://test-songs/other.mp3"),
            ])
            .await
            .unwrap();

        let request = LookupRequest::new(Selector::Tags(
            TagFilter::new(Combinator::All).with_tag("genre", "Hip Hop"),
        ))
        .with_page(0, 10);
        let page = catalog.lookup(request).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, ids[0]);
        assert_eq!(page.next_token, 1);

        catalog.remove_tags(ids[0].as_str(), ["genre"]).await.unwrap();
        let page = catalog
            .lookup(LookupRequest::new(Selector::Tags(
                TagFilter::new(Combinator::All).with_tag("genre", "*"),
            )))
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }
}

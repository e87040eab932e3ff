//! On-disk song document.

use serde::{Deserialize, Serialize};

use songlake_core::{Song, SongId, Tags};

/// A song as written to disk.
///
/// The shape mirrors a document database record: the identifier lives in
/// `_id` and empty optional fields are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SongDocument {
    #[serde(rename = "_id")]
    pub id: SongId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl From<Song> for SongDocument {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            name: song.name,
            uri: song.uri,
            mime_type: song.mime_type,
            tags: song.tags,
        }
    }
}

impl From<SongDocument> for Song {
    fn from(doc: SongDocument) -> Self {
        Song {
            id: doc.id,
            name: doc.name,
            uri: doc.uri,
            mime_type: doc.mime_type,
            tags: doc.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use songlake_core::NewSong;

    #[test]
    fn document_uses_underscore_id() {
        let song = NewSong::new("gs://songs/a.mp3")
            .with_name("Rock Song")
            .into_song(SongId::new("60330f9e6fdbdb246a93b7a6").unwrap());

        let value = serde_json::to_value(SongDocument::from(song)).unwrap();
        assert_eq!(
            value,
            json!({
                "_id": "60330f9e6fdbdb246a93b7a6",
                "name": "Rock Song",
                "uri": "gs://songs/a.mp3"
            })
        );
    }

    #[test]
    fn document_without_tags_reads_empty() {
        let doc: SongDocument = serde_json::from_value(json!({
            "_id": "60330f9e6fdbdb246a93b7a6",
            "uri": "gs://songs/a.mp3"
        }))
        .unwrap();
        assert!(Song::from(doc).tags.is_empty());
    }
}

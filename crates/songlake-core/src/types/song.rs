//! Song records.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::InvalidArgumentError;
use crate::query::EXISTS_WILDCARD;

use super::SongId;

/// Free-form tags attached to a song.
pub type Tags = BTreeMap<String, String>;

/// A song as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Identifier assigned by the store.
    pub id: SongId,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Location of the media payload.
    pub uri: String,

    /// Content type of the media payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Tags used for filtering.
    #[serde(default)]
    pub tags: Tags,
}

impl Song {
    /// Returns the value of a tag, if present.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// A song offered for ingestion.
///
/// There is no `id` field: identifiers are assigned by the store, and a
/// serialized input that carries one is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSong {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Location of the media payload. Required.
    pub uri: String,

    /// Content type of the media payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Initial tags.
    #[serde(default)]
    pub tags: Tags,
}

impl NewSong {
    /// Create a song with only a uri.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the content type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Attach the identifier assigned by the store.
    pub fn into_song(self, id: SongId) -> Song {
        Song {
            id,
            name: self.name,
            uri: self.uri,
            mime_type: self.mime_type,
            tags: self.tags,
        }
    }

    /// Check the song is fit for storage. `index` is its position in the batch.
    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(InvalidArgumentError::MissingUri { index }.into());
        }
        validate_stored_tags(&self.tags)
    }
}

/// Field-level changes to a song's tags.
///
/// Applied by the store as one atomic document update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUpdate {
    /// Tags to insert or overwrite.
    pub set: Tags,
    /// Tag names to delete. Names that are absent are ignored.
    pub unset: BTreeSet<String>,
}

impl TagUpdate {
    /// An update that sets the given tags.
    pub fn set(tags: Tags) -> Self {
        Self {
            set: tags,
            unset: BTreeSet::new(),
        }
    }

    /// An update that removes the given tag names.
    pub fn unset(names: BTreeSet<String>) -> Self {
        Self {
            set: Tags::new(),
            unset: names,
        }
    }

    /// Apply the update to a tag map.
    pub fn apply(&self, tags: &mut Tags) {
        for (name, value) in &self.set {
            tags.insert(name.clone(), value.clone());
        }
        for name in &self.unset {
            tags.remove(name);
        }
    }
}

/// Tags written to the store need real names and must not hold the wildcard.
pub(crate) fn validate_stored_tags(tags: &Tags) -> Result<()> {
    for (name, value) in tags {
        if name.is_empty() {
            return Err(InvalidArgumentError::EmptyTagName.into());
        }
        if value == EXISTS_WILDCARD {
            return Err(InvalidArgumentError::ReservedTagValue { name: name.clone() }.into());
        }
    }
    Ok(())
}

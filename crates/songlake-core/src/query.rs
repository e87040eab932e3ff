//! Query construction.
//!
//! A [`Selector`] is the shape of a lookup request: explicit ids, a tag
//! filter, or everything. [`Selector::build`] turns it into a [`Predicate`],
//! which stores translate into their native query form.
//!
//! # Example
//!
//! ```
//! use songlake_core::query::{Combinator, Predicate, Selector, TagFilter};
//!
//! let selector = Selector::Tags(
//!     TagFilter::new(Combinator::All)
//!         .with_tag("genre", "Hip Hop")
//!         .with_tag("explicit", "*"),
//! );
//!
//! let predicate = selector.build().unwrap();
//! assert!(matches!(predicate, Predicate::Tags { combinator: Combinator::All, .. }));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::InvalidArgumentError;
use crate::types::{Song, SongId, Tags};

/// Tag value meaning "the tag exists, whatever its value".
pub const EXISTS_WILDCARD: &str = "*";

/// How the clauses of a tag filter combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every clause must hold.
    All,
    /// At least one clause must hold.
    #[default]
    Any,
    /// No clause may hold.
    None,
}

impl Combinator {
    /// Parse a combinator name. Unrecognized names fall back to [`Combinator::Any`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" | "and" => Combinator::All,
            "none" | "nor" => Combinator::None,
            _ => Combinator::Any,
        }
    }

    /// Decode the integer wire form (`0` any, `1` all, `2` none).
    /// Unknown values fall back to [`Combinator::Any`].
    pub fn from_wire(value: i32) -> Self {
        match value {
            1 => Combinator::All,
            2 => Combinator::None,
            _ => Combinator::Any,
        }
    }

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::All => "all",
            Combinator::Any => "any",
            Combinator::None => "none",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag pairs plus the combinator joining them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    /// Tag name to expected value. [`EXISTS_WILDCARD`] matches any value.
    #[serde(default)]
    pub tags: Tags,
    /// How the pairs combine.
    #[serde(default)]
    pub combinator: Combinator,
}

impl TagFilter {
    /// An empty filter with the given combinator.
    pub fn new(combinator: Combinator) -> Self {
        Self {
            tags: Tags::new(),
            combinator,
        }
    }

    /// Add a tag pair.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }

    /// Returns true if the filter has no tag pairs.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Which songs a lookup selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    /// Every song.
    #[default]
    All,
    /// Songs whose id is in the list. The ids are parsed by [`Selector::build`].
    Ids(Vec<String>),
    /// Songs matching a tag filter.
    Tags(TagFilter),
}

impl Selector {
    /// Decode the flat request shape, where an empty list or map means the
    /// field was not supplied.
    ///
    /// Ids win over tags only if tags are absent; supplying both is an error.
    /// A missing combinator defaults to [`Combinator::Any`].
    pub fn from_parts(
        ids: Vec<String>,
        tags: Tags,
        combinator: Option<Combinator>,
    ) -> Result<Self> {
        match (ids.is_empty(), tags.is_empty()) {
            (false, false) => Err(InvalidArgumentError::ConflictingSelectors.into()),
            (false, true) => Ok(Selector::Ids(ids)),
            (true, false) => Ok(Selector::Tags(TagFilter {
                tags,
                combinator: combinator.unwrap_or_default(),
            })),
            (true, true) => Ok(Selector::All),
        }
    }

    /// Build the predicate for this selector.
    ///
    /// A tag filter without pairs selects everything, whatever its
    /// combinator. An explicit empty id list selects nothing.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error for a malformed id or an empty tag
    /// name.
    pub fn build(&self) -> Result<Predicate> {
        match self {
            Selector::All => Ok(Predicate::MatchAll),
            Selector::Ids(ids) => {
                let ids = ids
                    .iter()
                    .map(SongId::new)
                    .collect::<Result<BTreeSet<_>>>()?;
                Ok(Predicate::IdIn(ids))
            }
            Selector::Tags(filter) if filter.is_empty() => Ok(Predicate::MatchAll),
            Selector::Tags(filter) => {
                let clauses = filter
                    .tags
                    .iter()
                    .map(|(name, value)| TagClause::new(name, value))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Predicate::Tags {
                    combinator: filter.combinator,
                    clauses,
                })
            }
        }
    }
}

/// A single condition on one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagClause {
    /// The tag is present with exactly this value.
    Equals { name: String, value: String },
    /// The tag is present with any value.
    Exists { name: String },
}

impl TagClause {
    fn new(name: &str, value: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(InvalidArgumentError::EmptyTagName.into());
        }
        if value == EXISTS_WILDCARD {
            Ok(TagClause::Exists {
                name: name.to_string(),
            })
        } else {
            Ok(TagClause::Equals {
                name: name.to_string(),
                value: value.to_string(),
            })
        }
    }

    /// The tag this clause inspects.
    pub fn name(&self) -> &str {
        match self {
            TagClause::Equals { name, .. } | TagClause::Exists { name } => name,
        }
    }

    /// Check the clause against a tag map.
    pub fn is_satisfied_by(&self, tags: &Tags) -> bool {
        match self {
            TagClause::Equals { name, value } => tags.get(name) == Some(value),
            TagClause::Exists { name } => tags.contains_key(name),
        }
    }
}

/// A backend independent condition over songs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every song.
    MatchAll,
    /// Matches songs whose id is in the set.
    IdIn(BTreeSet<SongId>),
    /// Matches songs by tag clauses. `clauses` is never empty.
    Tags {
        combinator: Combinator,
        clauses: Vec<TagClause>,
    },
}

impl Predicate {
    /// Evaluate the predicate against a song.
    pub fn matches(&self, song: &Song) -> bool {
        match self {
            Predicate::MatchAll => true,
            Predicate::IdIn(ids) => ids.contains(&song.id),
            Predicate::Tags {
                combinator,
                clauses,
            } => {
                let mut satisfied = clauses.iter().map(|c| c.is_satisfied_by(&song.tags));
                match combinator {
                    Combinator::All => satisfied.all(|s| s),
                    Combinator::Any => satisfied.any(|s| s),
                    Combinator::None => !satisfied.any(|s| s),
                }
            }
        }
    }
}

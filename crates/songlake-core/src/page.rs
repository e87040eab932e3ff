//! Offset pagination over ordered result sets.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::InvalidArgumentError;

/// A validated page token and page size.
///
/// A page size of zero means "everything from the token to the end".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    token: usize,
    size: usize,
}

impl PageRequest {
    /// Validate raw page parameters.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if either value is negative.
    pub fn new(page_token: i64, page_size: i64) -> Result<Self> {
        if page_token < 0 {
            return Err(InvalidArgumentError::PageToken { value: page_token }.into());
        }
        if page_size < 0 {
            return Err(InvalidArgumentError::PageSize { value: page_size }.into());
        }
        Ok(Self {
            token: usize::try_from(page_token).unwrap_or(usize::MAX),
            size: usize::try_from(page_size).unwrap_or(usize::MAX),
        })
    }

    /// Slice an ordered result set.
    ///
    /// The next token is always the page token plus the number of items
    /// returned, so resuming from it continues right after the last item.
    /// A token past the end yields an empty page with the token unchanged.
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let take = if self.size == 0 { usize::MAX } else { self.size };
        let items: Vec<T> = items.into_iter().skip(self.token).take(take).collect();
        let returned = i64::try_from(items.len()).unwrap_or(i64::MAX);
        let token = i64::try_from(self.token).unwrap_or(i64::MAX);

        Page {
            next_token: token.saturating_add(returned),
            exhausted: self.size == 0 || items.len() < self.size,
            items,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items in this page, in store order.
    pub items: Vec<T>,
    /// Token to pass back for the following page.
    pub next_token: i64,
    #[serde(skip)]
    exhausted: bool,
}

impl<T> Page<T> {
    /// Returns true if this page reached the end of the result set.
    ///
    /// A full page reports false even when nothing follows it; the next
    /// request will then come back empty.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A record with a stable unique identifier.
///
/// This is the only thing the loader needs to know about an item: two items
/// with the same id are the same item, whatever else they contain.
pub trait Identified {
    type Id: Eq + Hash + Clone + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

/// One page of a remote list.
///
/// On the wire this is `{"items": [...], "totalCount": n}`. Both fields are
/// required, so a payload missing either one fails to decode instead of
/// silently producing an empty page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items available across all pages.
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Page { items, total_count }
    }

    pub fn empty(total_count: u64) -> Self {
        Page {
            items: Vec::new(),
            total_count,
        }
    }
}

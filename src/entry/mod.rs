//! Journal entry types
//!
//! This module defines the persisted shape of a journal entry (a SMER:
//! situation, thoughts, emotions, reactions) as exchanged with the REST API:
//! - `Entry`: an entry as returned by the server
//! - `EntryPayload`: the content fields sent on create/update
//! - `Page` and `PageMeta`: one page of a listing

pub mod editable;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use editable::{EditableEntry, EditableItem, ItemId, ItemStep};

/// Server-assigned entry identifier
pub type EntryId = u64;

/// A persisted journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub situation: String,
    #[serde(default)]
    pub thoughts: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Content fields of this entry, without server-assigned data
    pub fn payload(&self) -> EntryPayload {
        EntryPayload {
            situation: self.situation.clone(),
            thoughts: self.thoughts.clone(),
            emotions: self.emotions.clone(),
            reactions: self.reactions.clone(),
        }
    }
}

/// Content of an entry as sent on create and update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub situation: String,
    #[serde(default)]
    pub thoughts: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<String>,
}

impl EntryPayload {
    /// An entry is savable only with a situation and at least one item per list
    pub fn is_complete(&self) -> bool {
        !self.situation.is_empty()
            && !self.thoughts.is_empty()
            && !self.emotions.is_empty()
            && !self.reactions.is_empty()
    }
}

/// Pagination metadata returned alongside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl PageMeta {
    /// Number of pages needed for `total` rows (at least one)
    pub fn page_count(&self) -> u32 {
        if self.limit == 0 || self.total == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.limit));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta {
                total: 0,
                page,
                limit,
            },
        }
    }
}

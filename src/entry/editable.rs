//! Editable entry representation
//!
//! While an entry is being composed, every list item carries a client-side
//! `ItemId` so that items can be updated or removed by identity rather than
//! by position. Ids come from a counter scoped to one `EditableEntry` and are
//! dropped when the entry is converted back into an `EntryPayload`.
//!
//! All editing methods take `&self` and return a new `EditableEntry`.

use serde::Serialize;
use std::fmt;

use super::{Entry, EntryPayload};

/// Client-side identity of an item inside one `EditableEntry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(u64);

impl ItemId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// The list-valued parts of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStep {
    Thoughts,
    Emotions,
    Reactions,
}

impl ItemStep {
    pub fn all() -> &'static [ItemStep] {
        &[ItemStep::Thoughts, ItemStep::Emotions, ItemStep::Reactions]
    }
}

impl fmt::Display for ItemStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStep::Thoughts => write!(f, "thoughts"),
            ItemStep::Emotions => write!(f, "emotions"),
            ItemStep::Reactions => write!(f, "reactions"),
        }
    }
}

/// A list item being edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditableItem {
    pub id: ItemId,
    pub value: String,
}

/// In-progress, item-addressable form of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditableEntry {
    situation: String,
    thoughts: Vec<EditableItem>,
    emotions: Vec<EditableItem>,
    reactions: Vec<EditableItem>,
    #[serde(skip)]
    next_id: u64,
}

impl EditableEntry {
    /// Create an empty editable entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Project a fetched entry, assigning fresh ids to every item
    pub fn from_entry(entry: &Entry) -> Self {
        Self::from_payload(&entry.payload())
    }

    /// Project entry content, assigning fresh ids to every item
    pub fn from_payload(payload: &EntryPayload) -> Self {
        let mut editable = Self {
            situation: payload.situation.clone(),
            ..Self::default()
        };
        for (step, values) in [
            (ItemStep::Thoughts, &payload.thoughts),
            (ItemStep::Emotions, &payload.emotions),
            (ItemStep::Reactions, &payload.reactions),
        ] {
            for value in values {
                editable.push(step, value.clone());
            }
        }
        editable
    }

    /// Convert back into wire content, dropping item ids
    pub fn to_payload(&self) -> EntryPayload {
        let values = |items: &[EditableItem]| items.iter().map(|i| i.value.clone()).collect();
        EntryPayload {
            situation: self.situation.clone(),
            thoughts: values(&self.thoughts),
            emotions: values(&self.emotions),
            reactions: values(&self.reactions),
        }
    }

    pub fn situation(&self) -> &str {
        &self.situation
    }

    /// Items of one list, in order
    pub fn items(&self, step: ItemStep) -> &[EditableItem] {
        match step {
            ItemStep::Thoughts => &self.thoughts,
            ItemStep::Emotions => &self.emotions,
            ItemStep::Reactions => &self.reactions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.situation.is_empty()
            && self.thoughts.is_empty()
            && self.emotions.is_empty()
            && self.reactions.is_empty()
    }

    /// True when the situation is set and every list has an item
    pub fn is_complete(&self) -> bool {
        !self.situation.is_empty() && ItemStep::all().iter().all(|s| !self.items(*s).is_empty())
    }

    /// Replace the situation text
    pub fn set_situation(&self, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.situation = text.into();
        next
    }

    /// Append an item with a fresh id; empty text is rejected unchanged
    pub fn add_item(&self, step: ItemStep, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut next = self.clone();
        if text.is_empty() {
            tracing::trace!(%step, "ignoring empty item");
            return next;
        }
        next.push(step, text);
        next
    }

    /// Remove the item with `id`; unknown ids leave the entry unchanged
    pub fn remove_item(&self, step: ItemStep, id: ItemId) -> Self {
        let mut next = self.clone();
        next.items_mut(step).retain(|item| item.id != id);
        next
    }

    /// Replace the text of the item with `id`; unknown ids leave the entry unchanged
    pub fn set_item(&self, step: ItemStep, id: ItemId, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        if let Some(item) = next.items_mut(step).iter_mut().find(|item| item.id == id) {
            item.value = text.into();
        }
        next
    }

    /// Id of the most recently added item of a list
    pub fn last_item_id(&self, step: ItemStep) -> Option<ItemId> {
        self.items(step).last().map(|item| item.id)
    }

    fn push(&mut self, step: ItemStep, value: String) {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items_mut(step).push(EditableItem { id, value });
    }

    fn items_mut(&mut self, step: ItemStep) -> &mut Vec<EditableItem> {
        match step {
            ItemStep::Thoughts => &mut self.thoughts,
            ItemStep::Emotions => &mut self.emotions,
            ItemStep::Reactions => &mut self.reactions,
        }
    }
}

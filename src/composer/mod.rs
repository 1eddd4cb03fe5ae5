//! Entry Composer
//!
//! Guided creation and editing of one journal entry.
//!
//! ## Architecture
//!
//! - **Step / transition**: the four wizard stages and a pure reducer over them
//! - **EntryComposer**: owns the `EditableEntry` of one session, exposes
//!   gating predicates and persists through an `EntryTransport`
//!
//! ## Data Flow
//!
//! 1. `load(id)` projects a fetched entry into an `EditableEntry` (or start empty)
//! 2. The caller walks the steps and edits items by `ItemId`
//! 3. `save()` sends create or update, then resets to an empty entry

mod step;
mod wizard;

pub use step::{transition, Step, StepAction};
pub use wizard::{ComposerState, EntryComposer, SaveOutcome};

use crate::transport::TransportError;
use thiserror::Error;

/// Errors returned by composer persistence operations
#[derive(Error, Debug)]
pub enum ComposerError {
    /// A load or save is already in flight
    #[error("Another load or save is in progress")]
    Busy,

    /// Situation or one of the lists is still empty
    #[error("Entry is incomplete: situation, thoughts, emotions and reactions are all required")]
    Incomplete,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

//! Entry composer
//!
//! Holds the wizard step, the in-progress `EditableEntry` and the id of the
//! entry being edited (if any). Only one load or save may run at a time;
//! while one is in flight, navigation and edits are ignored and further
//! loads/saves fail with `ComposerError::Busy`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{transition, ComposerError, Step, StepAction};
use crate::entry::{EditableEntry, EntryId, ItemId, ItemStep};
use crate::notify::Notifier;
use crate::transport::EntryTransport;

/// Snapshot of a composer session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerState {
    pub step: Step,
    pub entry: EditableEntry,
    /// Id of the entry being edited; `None` when composing a new one
    pub active_id: Option<EntryId>,
}

/// Result of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: EntryId,
    pub created: bool,
}

/// Multi-step wizard for composing one entry
pub struct EntryComposer<T: EntryTransport + ?Sized> {
    transport: Arc<T>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ComposerState>,
    loading: AtomicBool,
}

/// Clears the loading flag when a load/save finishes, however it ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T: EntryTransport + ?Sized> EntryComposer<T> {
    pub fn new(transport: Arc<T>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            state: Mutex::new(ComposerState::default()),
            loading: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ComposerState {
        self.lock().clone()
    }

    pub fn step(&self) -> Step {
        self.lock().step
    }

    pub fn entry(&self) -> EditableEntry {
        self.lock().entry.clone()
    }

    pub fn active_id(&self) -> Option<EntryId> {
        self.lock().active_id
    }

    /// True while a load or save is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    // ---- navigation ----

    pub fn dispatch(&self, action: StepAction) -> Step {
        let mut state = self.lock();
        if self.is_loading() {
            tracing::debug!(?action, "navigation ignored while loading");
            return state.step;
        }
        let next = transition(state.step, action);
        tracing::trace!(from = %state.step, to = %next, "step transition");
        state.step = next;
        next
    }

    pub fn forward(&self) -> Step {
        self.dispatch(StepAction::Forward)
    }

    pub fn backward(&self) -> Step {
        self.dispatch(StepAction::Backward)
    }

    pub fn jump_to(&self, step: Step) -> Step {
        self.dispatch(StepAction::JumpTo(step))
    }

    // ---- editing ----

    pub fn set_situation(&self, text: impl Into<String>) -> EditableEntry {
        self.edit(|entry| entry.set_situation(text))
    }

    pub fn add_item(&self, step: ItemStep, text: impl Into<String>) -> EditableEntry {
        self.edit(|entry| entry.add_item(step, text))
    }

    pub fn remove_item(&self, step: ItemStep, id: ItemId) -> EditableEntry {
        self.edit(|entry| entry.remove_item(step, id))
    }

    pub fn set_item(&self, step: ItemStep, id: ItemId, text: impl Into<String>) -> EditableEntry {
        self.edit(|entry| entry.set_item(step, id, text))
    }

    // ---- gating ----

    /// Whether `step` has content, i.e. "Next" may be enabled on it
    pub fn can_advance(&self, step: Step) -> bool {
        step_filled(&self.lock().entry, step)
    }

    /// Whether every step before `target` has content
    pub fn can_jump_to(&self, target: Step) -> bool {
        let state = self.lock();
        Step::all()
            .iter()
            .take_while(|step| **step < target)
            .all(|step| step_filled(&state.entry, *step))
    }

    pub fn can_save(&self) -> bool {
        self.lock().entry.is_complete()
    }

    // ---- persistence ----

    /// Fetch an entry and make it the composer's state
    ///
    /// On failure the error is notified and the current state is kept.
    pub async fn load(&self, id: EntryId) -> Result<(), ComposerError> {
        let _guard = self.begin_io()?;

        match self.transport.view(id).await {
            Ok(entry) => {
                *self.lock() = ComposerState {
                    step: Step::Situation,
                    entry: EditableEntry::from_entry(&entry),
                    active_id: Some(id),
                };
                tracing::debug!(entry_id = id, "entry loaded into composer");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(entry_id = id, error = %e, "failed to load entry");
                self.notifier.error(&e.to_string());
                Err(e.into())
            }
        }
    }

    /// Create or update the entry, then reset to an empty session
    ///
    /// On failure the error is notified and the in-progress entry is kept
    /// so the user can retry.
    pub async fn save(&self) -> Result<SaveOutcome, ComposerError> {
        let _guard = self.begin_io()?;

        let (payload, active_id) = {
            let state = self.lock();
            (state.entry.to_payload(), state.active_id)
        };
        if !payload.is_complete() {
            return Err(ComposerError::Incomplete);
        }

        let result = match active_id {
            Some(id) => self
                .transport
                .update(id, &payload)
                .await
                .map(|_| SaveOutcome { id, created: false }),
            None => self
                .transport
                .create(&payload)
                .await
                .map(|id| SaveOutcome { id, created: true }),
        };

        match result {
            Ok(outcome) => {
                *self.lock() = ComposerState::default();
                tracing::info!(entry_id = outcome.id, created = outcome.created, "entry saved");
                self.notifier.success(if outcome.created {
                    "Entry created"
                } else {
                    "Entry updated"
                });
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save entry");
                self.notifier.error(&e.to_string());
                Err(e.into())
            }
        }
    }

    /// Discard the session (dialog closed or cancelled)
    pub fn cancel(&self) {
        if self.is_loading() {
            tracing::debug!("cancel ignored while loading");
            return;
        }
        *self.lock() = ComposerState::default();
    }

    fn edit(&self, f: impl FnOnce(&EditableEntry) -> EditableEntry) -> EditableEntry {
        let mut state = self.lock();
        if self.is_loading() {
            tracing::debug!("edit ignored while loading");
            return state.entry.clone();
        }
        state.entry = f(&state.entry);
        state.entry.clone()
    }

    fn begin_io(&self) -> Result<LoadingGuard<'_>, ComposerError> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| LoadingGuard(&self.loading))
            .map_err(|_| ComposerError::Busy)
    }

    fn lock(&self) -> MutexGuard<'_, ComposerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn step_filled(entry: &EditableEntry, step: Step) -> bool {
    match step.item_step() {
        None => !entry.situation().is_empty(),
        Some(items) => !entry.items(items).is_empty(),
    }
}

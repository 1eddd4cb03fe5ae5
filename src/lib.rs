//! # SMER Journal
//!
//! Client core for a cognitive-behavioural journal. Each entry records a
//! Situation together with the Thoughts, Emotions and Reactions it caused.
//!
//! ## Modules
//!
//! - [`composer`]: multi-step wizard that creates or edits one entry
//! - [`collection`]: paginated, sortable, filterable entry listings
//! - [`entry`]: wire and editable entry types
//! - [`transport`]: REST client, session handling and the `EntryTransport` seam
//! - [`account`]: signin, signup, password and profile calls
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use smer::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let session = SessionHandle::with_session(Session::from_access_token("token"));
//!     let client = ApiClient::new(&config.api, session)?;
//!     let transport = Arc::new(HttpEntryTransport::new(client));
//!     let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
//!
//!     // Compose and save a new entry
//!     let composer = EntryComposer::new(Arc::clone(&transport), Arc::clone(&notifier));
//!     composer.set_situation("Missed the bus");
//!     composer.add_item(ItemStep::Thoughts, "I'm always late");
//!     composer.add_item(ItemStep::Emotions, "anxiety");
//!     composer.add_item(ItemStep::Reactions, "called a taxi");
//!     composer.save().await?;
//!
//!     // List the newest entries
//!     let entries = CollectionController::new(transport, notifier, &config.collection);
//!     entries.refetch().await?;
//!     for entry in entries.rows() {
//!         println!("{} {}", entry.id, entry.situation);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod collection;
pub mod composer;
pub mod config;
pub mod entry;
pub mod logging;
pub mod notify;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use account::{AuthClient, Credentials, NewUser, ProfileClient, User, UserInfo};

pub use collection::{
    CollectionController, CollectionError, ListQuery, Pagination, RemoteCollection, SortOrder,
    SortSpec,
};

pub use composer::{
    transition, ComposerError, ComposerState, EntryComposer, SaveOutcome, Step, StepAction,
};

pub use config::{ApiConfig, CollectionConfig, Config, ConfigError, LoggingConfig};

pub use entry::{
    EditableEntry, EditableItem, Entry, EntryId, EntryPayload, ItemId, ItemStep, Page, PageMeta,
};

pub use notify::{MemoryNotifier, Notification, Notifier, TracingNotifier};

pub use transport::{
    ApiClient, EntryTransport, HttpEntryTransport, Session, SessionHandle, TransportError,
    TransportResult,
};

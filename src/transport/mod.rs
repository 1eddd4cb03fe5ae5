//! REST Transport
//!
//! Everything that crosses the network goes through this module.
//!
//! ## Architecture
//!
//! - **EntryTransport**: the CRUD contract the composer and list controller depend on
//! - **ApiClient**: shared reqwest client with base URL, bearer auth and error mapping
//! - **HttpEntryTransport**: `EntryTransport` over the `/api/smers` endpoints
//! - **SessionHandle**: explicitly passed token context

mod client;
mod error;
mod http;
mod session;

pub use client::ApiClient;
pub use error::{TransportError, TransportResult};
pub use http::HttpEntryTransport;
pub use session::{Session, SessionHandle};

use async_trait::async_trait;

use crate::collection::ListQuery;
use crate::entry::{Entry, EntryId, EntryPayload, Page};

/// CRUD operations on journal entries
#[async_trait]
pub trait EntryTransport: Send + Sync {
    /// Fetch one page of entries
    async fn list(&self, query: &ListQuery) -> TransportResult<Page<Entry>>;

    /// Fetch a single entry
    async fn view(&self, id: EntryId) -> TransportResult<Entry>;

    /// Create an entry and return its new id
    async fn create(&self, payload: &EntryPayload) -> TransportResult<EntryId>;

    /// Replace the content of an existing entry
    async fn update(&self, id: EntryId, payload: &EntryPayload) -> TransportResult<()>;

    /// Delete an entry
    async fn remove(&self, id: EntryId) -> TransportResult<()>;
}

//! Collection Controller
//!
//! Paginated, sortable, filterable views over a remote collection.
//!
//! - [`ListQuery`] and friends are the pure query parameters
//! - [`RemoteCollection`] is what the controller fetches from; every
//!   [`EntryTransport`](crate::transport::EntryTransport) is one
//! - [`CollectionController`] owns the query state and the last page

mod controller;
mod query;

pub use controller::{CollectionController, RemoteCollection};
pub use query::{ListQuery, Pagination, SortOrder, SortSpec, DEFAULT_PAGE_SIZE};

use crate::transport::TransportError;
use thiserror::Error;

/// Errors returned by collection operations
#[derive(Error, Debug)]
pub enum CollectionError {
    /// Page size must be greater than zero
    #[error("Invalid page size: must be greater than zero")]
    InvalidPageSize,

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The row was removed but the list could not be reloaded
    #[error("Removed, but failed to refresh the list: {0}")]
    Refresh(#[source] TransportError),
}

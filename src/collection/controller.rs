//! List controller
//!
//! Keeps the query parameters of a list view and the last page fetched for
//! them. Every parameter change triggers a fetch. Fetches may overlap: each
//! one is stamped with a sequence number and only the response to the most
//! recently issued fetch is applied.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{CollectionError, ListQuery, Pagination, SortSpec};
use crate::config::CollectionConfig;
use crate::entry::{Entry, EntryId, Page};
use crate::notify::Notifier;
use crate::transport::{EntryTransport, TransportResult};

/// A remote collection that can be paged through and deleted from
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    type Item: Clone + Send + Sync;

    async fn fetch_page(&self, query: &ListQuery) -> TransportResult<Page<Self::Item>>;

    async fn delete(&self, id: EntryId) -> TransportResult<()>;
}

#[async_trait]
impl<T: EntryTransport + ?Sized> RemoteCollection for T {
    type Item = Entry;

    async fn fetch_page(&self, query: &ListQuery) -> TransportResult<Page<Entry>> {
        self.list(query).await
    }

    async fn delete(&self, id: EntryId) -> TransportResult<()> {
        self.remove(id).await
    }
}

struct ViewState<T> {
    query: ListQuery,
    /// Parameters behind `page`; what a failed fetch rolls back to
    applied: ListQuery,
    page: Option<Page<T>>,
    busy: bool,
}

/// Pagination, sort and filter state of one list view
pub struct CollectionController<C: RemoteCollection + ?Sized> {
    source: Arc<C>,
    notifier: Arc<dyn Notifier>,
    view: Mutex<ViewState<C::Item>>,
    /// Sequence number of the most recently issued fetch
    issued: AtomicU64,
}

impl<C: RemoteCollection + ?Sized> CollectionController<C> {
    /// Create a controller starting on page 1 with the configured size and sort
    pub fn new(source: Arc<C>, notifier: Arc<dyn Notifier>, config: &CollectionConfig) -> Self {
        let query = ListQuery::new(Pagination {
            page: 1,
            limit: config.page_size.max(1),
        })
        .sorted_by(config.sort.clone());
        Self::with_query(source, notifier, query)
    }

    /// Create a controller with explicit initial parameters; nothing is fetched yet
    pub fn with_query(source: Arc<C>, notifier: Arc<dyn Notifier>, query: ListQuery) -> Self {
        Self {
            source,
            notifier,
            view: Mutex::new(ViewState {
                applied: query.clone(),
                query,
                page: None,
                busy: false,
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub fn query(&self) -> ListQuery {
        self.lock().query.clone()
    }

    /// Last applied page, if any fetch has succeeded
    pub fn page(&self) -> Option<Page<C::Item>> {
        self.lock().page.clone()
    }

    pub fn rows(&self) -> Vec<C::Item> {
        self.lock()
            .page
            .as_ref()
            .map(|p| p.data.clone())
            .unwrap_or_default()
    }

    /// True while the latest fetch is in flight
    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Go to page `page` (pages start at 1; 0 is treated as 1)
    pub async fn set_page(&self, page: u32) -> Result<(), CollectionError> {
        self.fetch_with(|q| q.pagination.page = page.max(1)).await
    }

    /// Change the page size and return to page 1
    pub async fn set_page_size(&self, limit: u32) -> Result<(), CollectionError> {
        if limit == 0 {
            return Err(CollectionError::InvalidPageSize);
        }
        self.fetch_with(|q| q.pagination = Pagination { page: 1, limit })
            .await
    }

    /// Replace the whole sort order
    pub async fn set_sort(&self, sort: Vec<SortSpec>) -> Result<(), CollectionError> {
        self.fetch_with(|q| q.sort = sort).await
    }

    /// Set one column filter; empty text removes it
    pub async fn set_filter(
        &self,
        column: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), CollectionError> {
        let column = column.into();
        let text = text.into();
        self.fetch_with(|q| q.set_filter(column, text)).await
    }

    /// Replace every filter at once
    pub async fn set_filters(
        &self,
        filters: BTreeMap<String, String>,
    ) -> Result<(), CollectionError> {
        self.fetch_with(|q| {
            q.filters = filters
                .into_iter()
                .filter(|(_, text)| !text.is_empty())
                .collect();
        })
        .await
    }

    /// Fetch again with the current parameters
    pub async fn refetch(&self) -> Result<(), CollectionError> {
        self.fetch_with(|_| {}).await
    }

    /// Delete a row remotely, then refetch
    ///
    /// Rows are left untouched if the delete fails. A refetch failure after
    /// a successful delete is reported as `CollectionError::Refresh`.
    pub async fn remove(&self, id: EntryId) -> Result<(), CollectionError> {
        if let Err(e) = self.source.delete(id).await {
            tracing::warn!(entry_id = id, error = %e, "failed to remove row");
            self.notifier.error(&e.to_string());
            return Err(e.into());
        }
        tracing::debug!(entry_id = id, "row removed, refreshing");
        self.refetch().await.map_err(|e| match e {
            CollectionError::Transport(e) => CollectionError::Refresh(e),
            other => other,
        })
    }

    async fn fetch_with(&self, update: impl FnOnce(&mut ListQuery)) -> Result<(), CollectionError> {
        let (seq, query) = {
            let mut view = self.lock();
            update(&mut view.query);
            view.busy = true;
            let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            (seq, view.query.clone())
        };

        tracing::debug!(
            seq,
            page = query.pagination.page,
            limit = query.pagination.limit,
            sort = ?query.sort,
            filters = ?query.filters,
            "fetching page"
        );
        let result = self.source.fetch_page(&query).await;

        let mut view = self.lock();
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(seq, "discarding stale page response");
            return Ok(());
        }
        view.busy = false;

        match result {
            Ok(page) => {
                view.page = Some(page);
                view.applied = query;
                Ok(())
            }
            Err(e) => {
                // changes from superseded fetches were never shown either
                view.query = view.applied.clone();
                drop(view);
                tracing::warn!(seq, error = %e, "failed to fetch page");
                self.notifier.error(&e.to_string());
                Err(e.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState<C::Item>> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! In-memory entry transport for unit tests

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::collection::{ListQuery, Pagination};
use crate::entry::{Entry, EntryId, EntryPayload, Page, PageMeta};
use crate::transport::{EntryTransport, TransportError, TransportResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(ListQuery),
    View(EntryId),
    Create(EntryPayload),
    Update(EntryId, EntryPayload),
    Remove(EntryId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    List,
    View,
    Create,
    Update,
    Remove,
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    entries: Mutex<BTreeMap<EntryId, Entry>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<Op>>,
    list_gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    create_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    pub(crate) fn with_entries(count: u64) -> Self {
        let transport = Self::new();
        for n in 0..count {
            let id = transport.next_id.fetch_add(1, Ordering::SeqCst);
            let entry = Entry {
                id,
                situation: format!("situation {}", n),
                thoughts: vec![format!("thought {}", n)],
                emotions: vec![format!("emotion {}", n)],
                reactions: vec![format!("reaction {}", n)],
                created_at: Utc::now(),
            };
            transport.entries.lock().unwrap().insert(id, entry);
        }
        transport
    }

    pub(crate) fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    pub(crate) fn recover(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    /// Block list calls for `page` until the returned sender fires
    pub(crate) fn hold_list(&self, page: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().unwrap().insert(page, rx);
        tx
    }

    /// Block the next create call until the returned sender fires
    pub(crate) fn hold_create(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.create_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> Vec<ListQuery> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn entry(&self, id: EntryId) -> Option<Entry> {
        self.entries.lock().unwrap().get(&id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn record(&self, call: Call, op: Op) -> TransportResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&op) {
            return Err(TransportError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntryTransport for FakeTransport {
    async fn list(&self, query: &ListQuery) -> TransportResult<Page<Entry>> {
        self.calls.lock().unwrap().push(Call::List(query.clone()));
        let gate = self.list_gates.lock().unwrap().remove(&query.pagination.page);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.failing.lock().unwrap().contains(&Op::List) {
            return Err(TransportError::Unavailable);
        }

        let entries = self.entries.lock().unwrap();
        let Pagination { page, limit } = query.pagination;
        let skip = (page.saturating_sub(1) * limit) as usize;
        Ok(Page {
            data: entries.values().skip(skip).take(limit as usize).cloned().collect(),
            meta: PageMeta {
                total: entries.len() as u64,
                page,
                limit,
            },
        })
    }

    async fn view(&self, id: EntryId) -> TransportResult<Entry> {
        self.record(Call::View(id), Op::View)?;
        self.entry(id)
            .ok_or_else(|| TransportError::NotFound(format!("entry {}", id)))
    }

    async fn create(&self, payload: &EntryPayload) -> TransportResult<EntryId> {
        let gate = self.create_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.record(Call::Create(payload.clone()), Op::Create)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entry = Entry {
            id,
            situation: payload.situation.clone(),
            thoughts: payload.thoughts.clone(),
            emotions: payload.emotions.clone(),
            reactions: payload.reactions.clone(),
            created_at: Utc::now(),
        };
        self.entries.lock().unwrap().insert(id, entry);
        Ok(id)
    }

    async fn update(&self, id: EntryId, payload: &EntryPayload) -> TransportResult<()> {
        self.record(Call::Update(id, payload.clone()), Op::Update)?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| TransportError::NotFound(format!("entry {}", id)))?;
        entry.situation = payload.situation.clone();
        entry.thoughts = payload.thoughts.clone();
        entry.emotions = payload.emotions.clone();
        entry.reactions = payload.reactions.clone();
        Ok(())
    }

    async fn remove(&self, id: EntryId) -> TransportResult<()> {
        self.record(Call::Remove(id), Op::Remove)?;
        self.entries
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| TransportError::NotFound(format!("entry {}", id)))
    }
}

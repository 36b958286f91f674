//! Keyed cache of remote query and mutation results.
//!
//! One entry exists per query key. Entries move through
//! `Idle -> Loading -> Success | Error`, observers subscribe per key, and
//! `invalidate` marks entries stale and refetches the ones a view is currently
//! watching. At most one fetch per key is ever in flight: concurrent `query`
//! calls attach to the in-flight result instead of issuing a second request.
//!
//! The cache is framework-free. Futures are handed to an injected [`Spawner`]
//! (on wasm: `leptos::task::spawn_local`; in tests: a queue polled by hand),
//! so the whole state machine runs and tests on the host.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde_json::Value;

use crate::error::RemoteError;

pub type QueryResult = Result<Value, RemoteError>;
pub type FetchFuture = Pin<Box<dyn Future<Output = QueryResult>>>;
/// Builds a fresh fetch future; stored per key so invalidation can refetch.
pub type Fetcher = Rc<dyn Fn() -> FetchFuture>;
/// Hands a task to the surrounding event loop.
pub type Spawner = Rc<dyn Fn(Pin<Box<dyn Future<Output = ()>>>)>;

type Observer<S> = Rc<dyn Fn(&S)>;

/// Observed state of a single query key.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Success(Value),
    Error(RemoteError),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Idle | QueryState::Loading)
    }
}

#[derive(Default)]
struct Entry {
    state: QueryState,
    stale: bool,
    in_flight: bool,
    fetcher: Option<Fetcher>,
    observers: Vec<(u64, Observer<QueryState>)>,
}

struct Inner {
    entries: RefCell<HashMap<String, Entry>>,
    spawner: Spawner,
    next_observer: Cell<u64>,
}

/// Process-wide server-state cache, shared by all views. Cheap to clone.
#[derive(Clone)]
pub struct QueryCache {
    inner: Rc<Inner>,
}

impl QueryCache {
    pub fn new(spawner: Spawner) -> Self {
        Self {
            inner: Rc::new(Inner {
                entries: RefCell::new(HashMap::new()),
                spawner,
                next_observer: Cell::new(0),
            }),
        }
    }

    /// Current state for a key; `Idle` if never queried.
    pub fn state(&self, key: &str) -> QueryState {
        self.inner
            .entries
            .borrow()
            .get(key)
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    /// Registers an observer notified on every state change of `key`.
    pub fn subscribe(&self, key: &str, observer: Observer<QueryState>) -> u64 {
        let id = self.inner.next_observer.get();
        self.inner.next_observer.set(id + 1);
        self.inner
            .entries
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .observers
            .push((id, observer));
        id
    }

    pub fn unsubscribe(&self, key: &str, id: u64) {
        if let Some(entry) = self.inner.entries.borrow_mut().get_mut(key) {
            entry.observers.retain(|(oid, _)| *oid != id);
        }
    }

    /// Ensures `key` is fetched. A fresh `Success` is served from cache; a
    /// stale, errored, or never-fetched entry triggers a fetch — unless one is
    /// already in flight, in which case this call attaches to it.
    pub fn query(&self, key: &str, fetcher: Fetcher) {
        let needs_fetch = {
            let mut entries = self.inner.entries.borrow_mut();
            let entry = entries.entry(key.to_string()).or_default();
            entry.fetcher = Some(fetcher);
            !entry.in_flight
                && (entry.stale || !matches!(entry.state, QueryState::Success(_)))
        };
        if needs_fetch {
            self.start_fetch(key);
        }
    }

    pub fn invalidate_key(&self, key: &str) {
        self.invalidate(|k| k == key);
    }

    /// Marks matching entries stale. Entries with active observers refetch
    /// immediately; the rest refetch on their next `query`.
    pub fn invalidate(&self, matches: impl Fn(&str) -> bool) {
        let refetch: Vec<String> = {
            let mut entries = self.inner.entries.borrow_mut();
            entries
                .iter_mut()
                .filter(|(key, _)| matches(key))
                .filter_map(|(key, entry)| {
                    entry.stale = true;
                    (!entry.in_flight && !entry.observers.is_empty() && entry.fetcher.is_some())
                        .then(|| key.clone())
                })
                .collect()
        };
        for key in refetch {
            self.start_fetch(&key);
        }
    }

    /// A mutation handle driven by the same spawner as the cache.
    pub fn mutation(&self) -> Mutation {
        Mutation::new(self.inner.spawner.clone())
    }

    fn start_fetch(&self, key: &str) {
        let fetcher = {
            let mut entries = self.inner.entries.borrow_mut();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            if entry.in_flight {
                return;
            }
            let Some(fetcher) = entry.fetcher.clone() else {
                return;
            };
            entry.in_flight = true;
            entry.stale = false;
            entry.state = QueryState::Loading;
            fetcher
        };
        self.notify(key);
        log::debug!("fetching {key}");

        let cache = self.clone();
        let key = key.to_string();
        let fut = fetcher();
        (self.inner.spawner)(Box::pin(async move {
            let result = fut.await;
            cache.settle(&key, result);
        }));
    }

    /// Accepts a fetch result, even if every observer has since navigated
    /// away; a late response still lands in the cache for the next visit.
    fn settle(&self, key: &str, result: QueryResult) {
        let refetch = {
            let mut entries = self.inner.entries.borrow_mut();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            entry.in_flight = false;
            entry.state = match result {
                Ok(value) => QueryState::Success(value),
                Err(err) => {
                    log::warn!("query {key} failed: {err}");
                    QueryState::Error(err)
                }
            };
            // invalidated while in flight: refetch if anyone is still watching
            entry.stale && !entry.observers.is_empty()
        };
        self.notify(key);
        if refetch {
            self.start_fetch(key);
        }
    }

    fn notify(&self, key: &str) {
        let (state, observers) = {
            let entries = self.inner.entries.borrow();
            let Some(entry) = entries.get(key) else {
                return;
            };
            let observers: Vec<_> = entry.observers.iter().map(|(_, o)| o.clone()).collect();
            (entry.state.clone(), observers)
        };
        for observer in observers {
            observer(&state);
        }
    }
}

/// Observed state of a mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success(Value),
    Error(RemoteError),
}

struct MutationInner {
    state: RefCell<MutationState>,
    observers: RefCell<Vec<(u64, Observer<MutationState>)>>,
    next_observer: Cell<u64>,
    spawner: Spawner,
}

/// Single-flight mutation handle. `run` is a no-op while a prior run is still
/// pending. The `on_success` hook — where callers invalidate query keys — runs
/// strictly after the success state has been delivered to observers, so a view
/// reacting to the success observes the refetch it triggered, never a stale
/// hit from before it. Failures invalidate nothing.
#[derive(Clone)]
pub struct Mutation {
    inner: Rc<MutationInner>,
}

impl Mutation {
    pub fn new(spawner: Spawner) -> Self {
        Self {
            inner: Rc::new(MutationInner {
                state: RefCell::new(MutationState::Idle),
                observers: RefCell::new(Vec::new()),
                next_observer: Cell::new(0),
                spawner,
            }),
        }
    }

    pub fn state(&self) -> MutationState {
        self.inner.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.inner.state.borrow(), MutationState::Pending)
    }

    pub fn subscribe(&self, observer: Observer<MutationState>) -> u64 {
        let id = self.inner.next_observer.get();
        self.inner.next_observer.set(id + 1);
        self.inner.observers.borrow_mut().push((id, observer));
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        self.inner.observers.borrow_mut().retain(|(oid, _)| *oid != id);
    }

    pub fn run(
        &self,
        op: FetchFuture,
        on_success: impl FnOnce(&Value) + 'static,
        on_error: impl FnOnce(&RemoteError) + 'static,
    ) {
        if self.is_pending() {
            return;
        }
        self.set_state(MutationState::Pending);

        let mutation = self.clone();
        (self.inner.spawner)(Box::pin(async move {
            match op.await {
                Ok(value) => {
                    mutation.set_state(MutationState::Success(value.clone()));
                    // result is delivered before any invalidation the hook performs
                    on_success(&value);
                }
                Err(err) => {
                    log::warn!("mutation failed: {err}");
                    mutation.set_state(MutationState::Error(err.clone()));
                    on_error(&err);
                }
            }
        }));
    }

    fn set_state(&self, state: MutationState) {
        *self.inner.state.borrow_mut() = state.clone();
        let observers: Vec<_> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, o)| o.clone())
            .collect();
        for observer in observers {
            observer(&state);
        }
    }
}

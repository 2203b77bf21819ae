//! Screen-side state: the local collection a listing shows and the
//! lifetime its fetches are tied to.
//!
//! A `CollectionView` is rebuilt from scratch on every fetch. Overlapping
//! fetches are ordered by tickets, so a slow old response can never replace
//! a newer one. A `ViewScope` cancels whatever is still in flight when the
//! screen goes away.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;
use crate::models::{RecordId, Resource};

/// Sequence number handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct CollectionView<T> {
    items: Mutex<Vec<T>>,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl<T> Default for CollectionView<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }
}

impl<T: Resource> CollectionView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Replace the collection with `items` if `ticket` is the latest fetch
    /// started. Returns whether the items were applied.
    pub fn apply(&self, ticket: Ticket, items: Vec<T>) -> bool {
        let mut current = self.items.lock();
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            debug!(ticket = ticket.0, "Discarding stale response");
            return false;
        }
        *current = items;
        self.applied.store(ticket.0, Ordering::SeqCst);
        true
    }

    /// Run `fetch` under a fresh ticket and apply its result. Errors leave
    /// the current collection untouched.
    pub async fn refresh<F>(&self, fetch: F) -> Result<bool>
    where
        F: Future<Output = Result<Vec<T>>>,
    {
        let ticket = self.begin_fetch();
        let items = fetch.await?;
        Ok(self.apply(ticket, items))
    }

    /// Remove exactly the record with `id`. Returns whether one was removed.
    pub fn remove(&self, id: &RecordId) -> bool {
        let mut items = self.items.lock();
        match items.iter().position(|item| item.id() == id) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Delete on the backend first, then drop the record locally. There is
    /// no rollback if a later refresh disagrees.
    pub async fn delete_and_remove<F>(&self, id: &RecordId, delete: F) -> Result<bool>
    where
        F: Future<Output = Result<()>>,
    {
        delete.await?;
        Ok(self.remove(id))
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Whether anything has been applied yet, i.e. the screen is past loading.
    pub fn is_loaded(&self) -> bool {
        self.applied.load(Ordering::SeqCst) > 0
    }
}

/// Lifetime of a screen. Dropping or cancelling it abandons in-flight work.
#[derive(Clone)]
pub struct ViewScope {
    token: CancellationToken,
    _guard: Option<Arc<DropGuard>>,
}

struct DropGuard(CancellationToken);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    /// A scope that cancels itself once the last clone is dropped.
    pub fn new() -> Self {
        let token = CancellationToken::new();
        Self {
            _guard: Some(Arc::new(DropGuard(token.clone()))),
            token,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` unless the scope ends first; `None` means it was abandoned.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("View scope cancelled, dropping in-flight work");
                None
            }
            output = fut => Some(output),
        }
    }

    /// Cancel this scope when Ctrl+C arrives.
    pub fn cancel_on_ctrl_c(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                result = tokio::signal::ctrl_c() => {
                    if result.is_ok() {
                        token.cancel();
                    }
                }
            }
        });
    }
}

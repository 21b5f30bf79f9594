//! Per-line bookkeeping: request sequencing and debounced edits.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use rustc_hash::FxHashMap;
use tokio::{
    sync::{Mutex as TurnLock, OwnedMutexGuard},
    task::{AbortHandle, JoinHandle},
};

use crate::ids::ItemId;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serializes requests touching the same line.
///
/// Turns are granted in the order they were asked for.
#[derive(Debug, Default)]
pub(super) struct LineTurns {
    turns: Mutex<FxHashMap<ItemId, Arc<TurnLock<()>>>>,
}

impl LineTurns {
    /// Wait until no other request for `item` is in flight.
    pub(super) async fn acquire(&self, item: &ItemId) -> OwnedMutexGuard<()> {
        let turn = Arc::clone(lock(&self.turns).entry(item.clone()).or_default());

        turn.lock_owned().await
    }

    /// Drop the turn for `item` unless a request holds or awaits it.
    pub(super) fn forget(&self, item: &ItemId) {
        let mut turns = lock(&self.turns);

        if turns.get(item).is_some_and(|turn| Arc::strong_count(turn) == 1) {
            turns.remove(item);
        }
    }

    /// Drop every turn no request holds or awaits.
    pub(super) fn forget_idle(&self) {
        lock(&self.turns).retain(|_, turn| Arc::strong_count(turn) > 1);
    }
}

#[derive(Debug)]
struct PendingEdit {
    ticket: u64,
    timer: AbortHandle,
}

/// Quantity edits waiting out their debounce window, at most one per line.
#[derive(Debug, Default)]
pub(super) struct PendingEdits {
    tickets: AtomicU64,
    edits: Mutex<FxHashMap<ItemId, PendingEdit>>,
}

impl PendingEdits {
    /// Register a new edit for `item`, cancelling the one it supersedes.
    ///
    /// `spawn` starts the edit's timer task with the edit's ticket. The task
    /// is registered before it can [`commit`](Self::commit), so only edits
    /// still waiting are ever aborted.
    pub(super) fn schedule<T>(
        &self,
        item: &ItemId,
        spawn: impl FnOnce(u64) -> JoinHandle<T>,
    ) -> JoinHandle<T> {
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);

        let mut edits = lock(&self.edits);
        let handle = spawn(ticket);

        let previous = edits.insert(
            item.clone(),
            PendingEdit {
                ticket,
                timer: handle.abort_handle(),
            },
        );

        drop(edits);

        if let Some(previous) = previous {
            previous.timer.abort();
        }

        handle
    }

    /// Claim the edit once its window has elapsed. Returns `false` when a
    /// newer edit has replaced it.
    pub(super) fn commit(&self, item: &ItemId, ticket: u64) -> bool {
        let mut edits = lock(&self.edits);

        if edits.get(item).is_some_and(|edit| edit.ticket == ticket) {
            edits.remove(item);

            return true;
        }

        false
    }

    /// Cancel the waiting edit for `item`, if any.
    pub(super) fn cancel(&self, item: &ItemId) -> bool {
        let Some(edit) = lock(&self.edits).remove(item) else {
            return false;
        };

        edit.timer.abort();

        true
    }

    /// Cancel every waiting edit.
    pub(super) fn cancel_all(&self) {
        for (_, edit) in lock(&self.edits).drain() {
            edit.timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{future, time::Duration};

    use super::*;

    fn waiting(edits: &PendingEdits, item: &ItemId) -> (u64, JoinHandle<()>) {
        let mut scheduled = 0;

        let handle = edits.schedule(item, |ticket| {
            scheduled = ticket;

            tokio::spawn(future::pending::<()>())
        });

        (scheduled, handle)
    }

    #[tokio::test]
    async fn only_the_latest_edit_commits() {
        let edits = PendingEdits::default();
        let item = ItemId::from("1");

        let (first, _) = waiting(&edits, &item);
        let (second, _) = waiting(&edits, &item);

        assert!(!edits.commit(&item, first));
        assert!(edits.commit(&item, second));
        assert!(!edits.commit(&item, second), "an edit commits once");
    }

    #[tokio::test]
    async fn edits_on_different_lines_are_independent() {
        let edits = PendingEdits::default();

        let (a, _) = waiting(&edits, &ItemId::from("a"));
        let (b, _) = waiting(&edits, &ItemId::from("b"));

        assert!(edits.commit(&ItemId::from("a"), a));
        assert!(edits.commit(&ItemId::from("b"), b));
    }

    #[tokio::test]
    async fn cancelled_edits_never_commit() {
        let edits = PendingEdits::default();
        let item = ItemId::from("1");

        let (ticket, timer) = waiting(&edits, &item);

        assert!(edits.cancel(&item));
        assert!(!edits.cancel(&item));
        assert!(!edits.commit(&item, ticket));
        assert!(timer.await.is_err_and(|error| error.is_cancelled()));
    }

    #[tokio::test]
    async fn superseding_an_edit_aborts_its_timer() {
        let edits = PendingEdits::default();
        let item = ItemId::from("1");

        let (_, timer) = waiting(&edits, &item);
        let _newer = waiting(&edits, &item);

        assert!(timer.await.is_err_and(|error| error.is_cancelled()));
    }

    #[tokio::test]
    async fn committed_edits_survive_a_newer_edit() {
        let edits = PendingEdits::default();
        let item = ItemId::from("1");

        let (ticket, in_flight) = waiting(&edits, &item);

        assert!(edits.commit(&item, ticket));

        let _newer = waiting(&edits, &item);

        let still_running = tokio::time::timeout(Duration::from_millis(10), in_flight).await;

        assert!(still_running.is_err(), "a sent request is never aborted");
    }

    #[tokio::test]
    async fn turns_for_one_line_are_exclusive() {
        let turns = LineTurns::default();
        let item = ItemId::from("1");

        let held = turns.acquire(&item).await;
        let other = turns.acquire(&ItemId::from("2")).await;

        let waiting = tokio::time::timeout(Duration::from_millis(10), turns.acquire(&item)).await;

        assert!(waiting.is_err(), "second turn must wait for the first");

        drop((held, other));

        let _next = turns.acquire(&item).await;
    }

    #[tokio::test]
    async fn only_idle_turns_are_forgotten() {
        let turns = LineTurns::default();
        let busy = ItemId::from("1");
        let idle = ItemId::from("2");

        let held = turns.acquire(&busy).await;
        drop(turns.acquire(&idle).await);

        turns.forget(&busy);
        turns.forget(&idle);

        assert!(lock(&turns.turns).contains_key(&busy));
        assert!(!lock(&turns.turns).contains_key(&idle));

        drop(held);
        turns.forget_idle();

        assert!(lock(&turns.turns).is_empty());
    }
}

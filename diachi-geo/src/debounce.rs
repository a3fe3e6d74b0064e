//! Per-key debouncing of asynchronous actions.
//!
//! Each key owns at most one pending slot. Arming a key cancels whatever was
//! pending under it, so within one delay window only the most recent caller
//! gets to run its action.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of a debounced call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Debounced<T> {
    /// The delay elapsed with no newer caller; the action ran.
    Fired(T),
    /// A newer caller took over the key; the action never ran.
    Superseded,
}

struct Slot {
    generation: u64,
    cancel: oneshot::Sender<()>,
}

/// Keyed debouncer.
///
/// Owned by its user rather than shared process-wide, so independent
/// instances never interfere.
pub struct Debouncer {
    delay: Duration,
    slots: Mutex<HashMap<String, Slot>>,
    next_generation: AtomicU64,
}

impl Debouncer {
    /// Creates a debouncer with the given delay window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// The delay window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of keys with a pending action.
    pub fn pending(&self) -> usize {
        self.slots.lock().len()
    }

    /// Waits out the delay for `key`, then runs `action` unless a newer call
    /// for the same key arrived in the meantime.
    ///
    /// A superseded caller returns [`Debounced::Superseded`] as soon as it is
    /// replaced and never invokes `action`. Dropping the returned future
    /// releases the slot.
    pub async fn run<T, F, Fut>(&self, key: &str, action: F) -> Debounced<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let (generation, cancelled) = self.arm(key);
        let mut slot = ArmedSlot {
            debouncer: self,
            key,
            generation,
            settled: false,
        };

        tokio::select! {
            biased;
            _ = cancelled => {
                slot.settled = true;
                debug!(key, generation, "Debounced action superseded");
                return Debounced::Superseded;
            }
            _ = tokio::time::sleep(self.delay) => {}
        }

        slot.settled = true;
        if !self.disarm(key, generation) {
            return Debounced::Superseded;
        }

        debug!(key, generation, "Debounced action firing");
        Debounced::Fired(action().await)
    }

    /// Installs a fresh slot for `key`, cancelling the previous one.
    fn arm(&self, key: &str) -> (u64, oneshot::Receiver<()>) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (cancel, cancelled) = oneshot::channel();

        let previous = self
            .slots
            .lock()
            .insert(key.to_string(), Slot { generation, cancel });
        if let Some(previous) = previous {
            let _ = previous.cancel.send(());
        }

        (generation, cancelled)
    }

    /// Removes the slot for `key` if it still belongs to `generation`.
    fn disarm(&self, key: &str, generation: u64) -> bool {
        let mut slots = self.slots.lock();
        match slots.get(key) {
            Some(slot) if slot.generation == generation => {
                slots.remove(key);
                true
            }
            _ => false,
        }
    }
}

/// Releases a slot whose caller went away before it settled.
struct ArmedSlot<'a> {
    debouncer: &'a Debouncer,
    key: &'a str,
    generation: u64,
    settled: bool,
}

impl Drop for ArmedSlot<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.debouncer.disarm(self.key, self.generation);
        }
    }
}

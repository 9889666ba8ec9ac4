//! Long-lived action sources
//!
//! Where [`TaskPool`](crate::TaskPool) runs one-shot work, a signal keeps
//! emitting: a periodic refresh tick, or an external stream such as the
//! environment's color-scheme changes forwarded into the theme store.
//! Signals are keyed, replace-on-rebind, and abort when dropped.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};

use crate::Action;

/// Names a signal for replacement and cancellation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SignalKey(String);

impl SignalKey {
    /// Create a new signal key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SignalKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SignalKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Registry of continuous action sources.
pub struct Signals<A> {
    active: HashMap<SignalKey, JoinHandle<()>>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> Signals<A>
where
    A: Action,
{
    /// Create a registry sending emitted actions on `action_tx`.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            active: HashMap::new(),
            action_tx,
        }
    }

    /// Emit `factory()` every `period`, starting one period from now.
    ///
    /// Rebinding an existing key cancels the old signal first.
    pub fn interval<F>(&mut self, key: impl Into<SignalKey>, period: Duration, factory: F) -> &mut Self
    where
        F: Fn() -> A + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let tx = self.action_tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // Skip the immediate first tick.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(factory()).is_err() {
                    break;
                }
            }
        });

        self.active.insert(key, handle);
        self
    }

    /// Forward every item of `source` as an action.
    ///
    /// Ends when the stream does. Rebinding an existing key cancels the
    /// old signal first.
    pub fn stream<S>(&mut self, key: impl Into<SignalKey>, source: S) -> &mut Self
    where
        S: Stream<Item = A> + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let tx = self.action_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::pin!(source);
            while let Some(action) = source.next().await {
                if tx.send(action).is_err() {
                    break;
                }
            }
        });

        self.active.insert(key, handle);
        self
    }

    /// Cancel the signal under `key`. Absent key is a no-op.
    pub fn cancel(&mut self, key: &SignalKey) {
        if let Some(handle) = self.active.remove(key) {
            handle.abort();
        }
    }

    /// Cancel every signal.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.active.drain() {
            handle.abort();
        }
    }

    /// Whether a signal under `key` is bound.
    pub fn is_active(&self, key: &SignalKey) -> bool {
        self.active.contains_key(key)
    }

    /// Number of bound signals.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no signals are bound.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl<A> Drop for Signals<A> {
    fn drop(&mut self) {
        for (_, handle) in self.active.drain() {
            handle.abort();
        }
    }
}

//! Keyed pool for one-shot async work
//!
//! Mock network calls and debounced validators run as tokio tasks that
//! resolve to a completion action, sent back to the driver's action
//! channel. Tasks are registered under a [`TaskTag`]; spawning under a tag
//! that is already running cancels the old task first, and dropping the
//! pool aborts everything still in flight - no timer outlives its owner.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::Action;

/// Names a unit of async work for replacement and cancellation.
///
/// Two tasks under the same tag are mutually exclusive.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskTag(String);

impl TaskTag {
    /// Create a new task tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the tag name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TaskTag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Registry of in-flight async tasks, keyed by [`TaskTag`].
///
/// # Type Parameters
///
/// - `A`: the action type that completed tasks produce
pub struct TaskPool<A> {
    running: HashMap<TaskTag, AbortHandle>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> TaskPool<A>
where
    A: Action,
{
    /// Create a pool sending completion actions on `action_tx`.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            running: HashMap::new(),
            action_tx,
        }
    }

    /// Spawn a task, cancelling any task already running under the tag.
    ///
    /// The future's output action is sent on the channel when it
    /// completes; a cancelled task sends nothing.
    ///
    /// ```ignore
    /// pool.spawn("contact:send", async move {
    ///     match send_submission(payload).await {
    ///         Ok(payload) => ContactAction::SubmitDidSend { ticket, payload },
    ///         Err(message) => ContactAction::SubmitDidError { ticket, message },
    ///     }
    /// });
    /// ```
    pub fn spawn<F>(&mut self, tag: impl Into<TaskTag>, work: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let tag = tag.into();
        self.cancel(&tag);

        let tx = self.action_tx.clone();
        let handle = tokio::spawn(async move {
            let action = work.await;
            let _ = tx.send(action);
        });

        self.running.insert(tag, handle.abort_handle());
        self
    }

    /// Spawn a task that waits `delay` before doing its work.
    ///
    /// Re-invoking the same tag inside the delay cancels the pending task
    /// and restarts the timer, so only the last burst survives - the shape
    /// of search-as-you-type and debounced field validation.
    pub fn debounce<F>(&mut self, tag: impl Into<TaskTag>, delay: Duration, work: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let tag = tag.into();
        self.cancel(&tag);

        let tx = self.action_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let action = work.await;
            let _ = tx.send(action);
        });

        self.running.insert(tag, handle.abort_handle());
        self
    }

    /// Cancel the task under `tag`. Absent tag is a no-op.
    pub fn cancel(&mut self, tag: &TaskTag) {
        if let Some(handle) = self.running.remove(tag) {
            handle.abort();
        }
    }

    /// Cancel every in-flight task.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.running.drain() {
            handle.abort();
        }
    }

    /// Whether a task under `tag` is still in flight.
    pub fn is_running(&mut self, tag: &TaskTag) -> bool {
        self.prune();
        self.running.contains_key(tag)
    }

    /// Number of in-flight tasks.
    pub fn len(&mut self) -> usize {
        self.prune();
        self.running.len()
    }

    /// Whether no tasks are in flight.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Tags of in-flight tasks.
    pub fn tags(&mut self) -> Vec<TaskTag> {
        self.prune();
        self.running.keys().cloned().collect()
    }

    // Drop registry entries whose task already ran to completion, so
    // `is_running` answers about actual work rather than history.
    fn prune(&mut self) {
        self.running.retain(|_, handle| !handle.is_finished());
    }
}

impl<A> Drop for TaskPool<A> {
    fn drop(&mut self) {
        for (_, handle) in self.running.drain() {
            handle.abort();
        }
    }
}

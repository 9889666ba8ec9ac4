//! Test utilities for formflow stores
//!
//! - [`TestHarness`]: state plus an emit/drain action channel
//! - [`Recorder`]: a subscriber that records every snapshot it sees
//! - assertion macros over drained action lists
//! - time-control helpers behind the `testing-time` feature

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::{Action, ActionCategory};

/// Generic test harness: a state value and an action channel for
/// capturing what handlers emit.
///
/// ```ignore
/// let mut harness = TestHarness::<CartState, CartAction>::default();
/// harness.emit(CartAction::Clear);
/// let actions = harness.drain_emitted();
/// assert_emitted!(actions, CartAction::Clear);
/// ```
pub struct TestHarness<S, A: Action> {
    /// The state under test
    pub state: S,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    /// Create a harness with the given initial state.
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state, tx, rx }
    }

    /// Clone of the sender, for handing to the code under test.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Emit an action, as a handler would.
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Drain every emitted action.
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Whether anything was emitted (drains the channel).
    pub fn has_emitted(&mut self) -> bool {
        !self.drain_emitted().is_empty()
    }
}

impl<S: Default, A: Action> Default for TestHarness<S, A> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S, A: ActionCategory> TestHarness<S, A> {
    /// Drain only the actions of one category; others stay queued.
    pub fn drain_category(&mut self, category: &str) -> Vec<A> {
        let mut matching = Vec::new();
        for action in self.drain_emitted() {
            if action.category() == Some(category) {
                matching.push(action);
            } else {
                let _ = self.tx.send(action);
            }
        }
        matching
    }
}

/// A subscriber that records every snapshot it is notified with.
///
/// Clones share the same log, so one clone can be moved into
/// `store.subscribe` while the test keeps the other for assertions.
pub struct Recorder<S> {
    snapshots: Rc<RefCell<Vec<S>>>,
}

impl<S> Clone for Recorder<S> {
    fn clone(&self) -> Self {
        Self {
            snapshots: Rc::clone(&self.snapshots),
        }
    }
}

impl<S> Default for Recorder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Recorder<S> {
    pub fn new() -> Self {
        Self {
            snapshots: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Number of notifications recorded.
    pub fn len(&self) -> usize {
        self.snapshots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.snapshots.borrow_mut().clear();
    }
}

impl<S: Clone + 'static> Recorder<S> {
    /// The subscriber callback to hand to `store.subscribe`.
    pub fn callback(&self) -> impl FnMut(&S) + 'static {
        let snapshots = Rc::clone(&self.snapshots);
        move |state: &S| snapshots.borrow_mut().push(state.clone())
    }

    /// Every recorded snapshot, oldest first.
    pub fn snapshots(&self) -> Vec<S> {
        self.snapshots.borrow().clone()
    }

    /// The most recent snapshot, if any.
    pub fn last(&self) -> Option<S> {
        self.snapshots.borrow().last().cloned()
    }
}

/// Assert that an action matching the pattern was emitted.
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that no action matching the pattern was emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find the first action matching the pattern.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count the actions matching the pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

/// Pause the tokio clock. Requires the `testing-time` feature.
#[cfg(feature = "testing-time")]
pub fn pause_time() {
    tokio::time::pause();
}

/// Advance the paused tokio clock. Requires the `testing-time` feature.
#[cfg(feature = "testing-time")]
pub async fn advance_time(duration: std::time::Duration) {
    tokio::time::advance(duration).await;
}

/// Resume the tokio clock. Requires the `testing-time` feature.
#[cfg(feature = "testing-time")]
pub fn resume_time() {
    tokio::time::resume();
}

//! Observable state store with reducer pattern
//!
//! A [`Store`] owns one state value and mutates it only through dispatched
//! actions. After every change all subscribers run synchronously, in
//! subscription order, with the fresh snapshot - a subscriber never sees a
//! status flag paired with stale data, because both move inside a single
//! dispatch.
//!
//! Subscribers cannot call back into the store directly (the borrow rules
//! forbid it, deliberately). A subscriber that wants to react with another
//! action pushes it on the store's [`DeferHandle`]; deferred actions are
//! dispatched after the current notification pass completes, never nested
//! inside it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::Action;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed and subscribers should be notified.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Identifies a subscriber for removal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SubscriberId(u64);

type SubscriberFn<S> = Box<dyn FnMut(&S)>;

/// Ordered subscriber registry shared by [`Store`] and
/// [`EffectStore`](crate::EffectStore).
pub(crate) struct Subscribers<S> {
    entries: Vec<(SubscriberId, SubscriberFn<S>)>,
    next_id: u64,
}

impl<S> Default for Subscribers<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<S> Subscribers<S> {
    pub(crate) fn add(&mut self, subscriber: SubscriberFn<S>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, subscriber));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Invoke every subscriber with the snapshot, in subscription order.
    pub(crate) fn notify(&mut self, state: &S) {
        for (_, subscriber) in &mut self.entries {
            subscriber(state);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Handle for enqueueing actions from inside subscriber callbacks.
///
/// This is the store's re-entrancy guard: pushed actions are dispatched
/// after the notification pass that produced them, so a subscriber can
/// react to a change without observing a half-applied nested update.
/// The handle is single-threaded, like the store itself; async completions
/// go through a driver channel instead (see [`crate::Driver`]).
pub struct DeferHandle<A> {
    queue: Rc<RefCell<VecDeque<A>>>,
}

impl<A> Clone for DeferHandle<A> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
        }
    }
}

impl<A> DeferHandle<A> {
    pub(crate) fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Queue an action for dispatch after the current pass.
    pub fn push(&self, action: A) {
        self.queue.borrow_mut().push_back(action);
    }

    pub(crate) fn pop(&self) -> Option<A> {
        self.queue.borrow_mut().pop_front()
    }
}

/// Middleware trait for intercepting dispatches
///
/// Implement this to add logging, persistence, or other cross-cutting
/// concerns to a store. `before` hooks run in installation order, `after`
/// hooks in reverse order.
pub trait Middleware<A: Action> {
    /// Called before the action reaches the reducer
    fn before(&mut self, _action: &A) {}

    /// Called after the reducer has processed the action
    fn after(&mut self, _action: &A, _changed: bool) {}
}

/// Middleware that logs every dispatch through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TraceMiddleware {
    /// Also log before the reducer runs
    pub log_before: bool,
}

impl TraceMiddleware {
    /// Log after each dispatch only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log both before and after each dispatch.
    pub fn verbose() -> Self {
        Self { log_before: true }
    }
}

impl<A: Action> Middleware<A> for TraceMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before {
            tracing::debug!(action = %action.name(), "dispatching");
        }
    }

    fn after(&mut self, action: &A, changed: bool) {
        tracing::debug!(action = %action.name(), changed, "dispatched");
    }
}

pub(crate) struct MiddlewareStack<A: Action> {
    entries: Vec<Box<dyn Middleware<A>>>,
}

impl<A: Action> Default for MiddlewareStack<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A: Action> MiddlewareStack<A> {
    pub(crate) fn push(&mut self, middleware: Box<dyn Middleware<A>>) {
        self.entries.push(middleware);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn before(&mut self, action: &A) {
        for middleware in &mut self.entries {
            middleware.before(action);
        }
    }

    pub(crate) fn after(&mut self, action: &A, changed: bool) {
        // Reverse order for proper nesting
        for middleware in self.entries.iter_mut().rev() {
            middleware.after(action, changed);
        }
    }
}

/// Observable state container with a reducer
///
/// # Type Parameters
/// * `S` - The state type
/// * `A` - The action type (must implement [`Action`])
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct Counter {
///     value: i32,
/// }
///
/// #[derive(Action, Clone, Debug)]
/// enum CounterAction {
///     Increment,
///     Decrement,
/// }
///
/// fn reducer(state: &mut Counter, action: CounterAction) -> bool {
///     match action {
///         CounterAction::Increment => {
///             state.value += 1;
///             true
///         }
///         CounterAction::Decrement => {
///             state.value -= 1;
///             true
///         }
///     }
/// }
///
/// let mut store = Store::new(Counter::default(), reducer);
/// store.subscribe(|state| println!("value is {}", state.value));
/// store.dispatch(CounterAction::Increment);
/// assert_eq!(store.state().value, 1);
/// ```
pub struct Store<S, A: Action> {
    state: S,
    reducer: Reducer<S, A>,
    subscribers: Subscribers<S>,
    middleware: MiddlewareStack<A>,
    deferred: DeferHandle<A>,
}

impl<S, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer.
    ///
    /// Stores are constructed once at application start (or per test) and
    /// injected where needed; there are no module-level globals.
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            subscribers: Subscribers::default(),
            middleware: MiddlewareStack::default(),
            deferred: DeferHandle::new(),
        }
    }

    /// Install a middleware. Hooks run in installation order (`after` in
    /// reverse order).
    pub fn push_middleware<M: Middleware<A> + 'static>(&mut self, middleware: M) {
        self.middleware.push(Box::new(middleware));
    }

    /// Get a reference to the current state snapshot.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Register a subscriber invoked synchronously after every change.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&S) + 'static) -> SubscriberId {
        self.subscribers.add(Box::new(subscriber))
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(id)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Handle for enqueueing actions from subscriber callbacks.
    pub fn defer_handle(&self) -> DeferHandle<A> {
        self.deferred.clone()
    }

    /// Dispatch an action to the store.
    ///
    /// The reducer runs first; if it reports a change, subscribers are
    /// notified synchronously with the new snapshot. Any actions deferred
    /// by subscribers during notification are then dispatched in order,
    /// until the queue is drained. Returns `true` if any dispatch in the
    /// pass changed state.
    pub fn dispatch(&mut self, action: A) -> bool {
        let mut changed = self.dispatch_one(action);
        while let Some(deferred) = self.deferred.pop() {
            changed |= self.dispatch_one(deferred);
        }
        changed
    }

    fn dispatch_one(&mut self, action: A) -> bool {
        let changed = if self.middleware.is_empty() {
            (self.reducer)(&mut self.state, action)
        } else {
            self.middleware.before(&action);
            let changed = (self.reducer)(&mut self.state, action.clone());
            self.middleware.after(&action, changed);
            changed
        };
        if changed {
            self.subscribers.notify(&self.state);
        }
        changed
    }

    /// Apply a patch closure outside the action set.
    ///
    /// Use sparingly - prefer dispatching actions. This exists for
    /// initialization and for callers that own a partial update the action
    /// vocabulary does not cover. The closure reports whether it changed
    /// anything; subscribers are notified on `true`. A panic inside the
    /// closure propagates to the caller - a malformed update function is a
    /// programmer error, not a runtime condition.
    pub fn set_state(&mut self, patch: impl FnOnce(&mut S) -> bool) -> bool {
        let mut changed = patch(&mut self.state);
        if changed {
            self.subscribers.notify(&self.state);
        }
        while let Some(deferred) = self.deferred.pop() {
            changed |= self.dispatch_one(deferred);
        }
        changed
    }
}

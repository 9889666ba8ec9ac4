//! Effect-aware state store
//!
//! Reducers stay pure by *describing* side effects instead of performing
//! them: an effect-aware reducer returns a [`DispatchResult`] carrying both
//! the change flag and a list of effect values. The driver (or a test)
//! executes the effects - spawning a mock network call, scheduling a
//! debounced validation, persisting a blob - and feeds completions back in
//! as new actions.
//!
//! ```ignore
//! enum SearchEffect {
//!     Query { query: String, ticket: Ticket },
//! }
//!
//! fn reducer(state: &mut SearchState, action: SearchAction) -> DispatchResult<SearchEffect> {
//!     match action {
//!         SearchAction::SearchStart(query) => {
//!             let ticket = state.lifecycle.start();
//!             state.query = query.clone();
//!             DispatchResult::changed_with(SearchEffect::Query { query, ticket })
//!         }
//!         SearchAction::SearchDidLoad { ticket, results } => {
//!             if !state.lifecycle.complete(ticket) {
//!                 return DispatchResult::unchanged();
//!             }
//!             state.results = results;
//!             DispatchResult::changed()
//!         }
//!         // ...
//!     }
//! }
//! ```

use crate::store::{DeferHandle, Middleware, MiddlewareStack, SubscriberId, Subscribers};
use crate::Action;

/// Result of dispatching an action to an effect-aware store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<E> {
    /// Whether the state was modified by this action.
    pub changed: bool,
    /// Effects to be executed after dispatch.
    pub effects: Vec<E>,
}

impl<E> Default for DispatchResult<E> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<E> DispatchResult<E> {
    /// No state change and no effects.
    #[inline]
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            effects: vec![],
        }
    }

    /// State changed, no effects.
    #[inline]
    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: vec![],
        }
    }

    /// State changed with a single effect.
    #[inline]
    pub fn changed_with(effect: E) -> Self {
        Self {
            changed: true,
            effects: vec![effect],
        }
    }

    /// State changed with multiple effects.
    #[inline]
    pub fn changed_with_many(effects: Vec<E>) -> Self {
        Self {
            changed: true,
            effects,
        }
    }

    /// Append an effect to this result.
    #[inline]
    pub fn with(mut self, effect: E) -> Self {
        self.effects.push(effect);
        self
    }

    /// Returns true if there are effects to execute.
    #[inline]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }
}

/// A reducer that can declare effects alongside state changes.
pub type EffectReducer<S, A, E> = fn(&mut S, A) -> DispatchResult<E>;

/// An observable store whose reducer declares effects.
///
/// Same subscriber and re-entrancy contract as [`Store`](crate::Store):
/// subscribers run synchronously, in subscription order, after every
/// change, and actions deferred during notification are dispatched after
/// the pass. Effects declared by deferred actions are accumulated onto the
/// returned result.
pub struct EffectStore<S, A: Action, E> {
    state: S,
    reducer: EffectReducer<S, A, E>,
    subscribers: Subscribers<S>,
    middleware: MiddlewareStack<A>,
    deferred: DeferHandle<A>,
}

impl<S, A: Action, E> EffectStore<S, A, E> {
    /// Create a new effect store with the given initial state and reducer.
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self {
            state,
            reducer,
            subscribers: Subscribers::default(),
            middleware: MiddlewareStack::default(),
            deferred: DeferHandle::new(),
        }
    }

    /// Install a middleware.
    pub fn push_middleware<M: Middleware<A> + 'static>(&mut self, middleware: M) {
        self.middleware.push(Box::new(middleware));
    }

    /// Get a reference to the current state snapshot.
    #[inline]
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

    /// Handle for enqueueing actions from subscriber callbacks.
    pub fn defer_handle(&self) -> DeferHandle<A> {
        self.deferred.clone()
    }

    /// Dispatch an action to the store.
    ///
    /// Returns the combined change flag and effects from the action plus
    /// any actions deferred by subscribers during notification.
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        let mut result = self.dispatch_one(action);
        while let Some(deferred) = self.deferred.pop() {
            let next = self.dispatch_one(deferred);
            result.changed |= next.changed;
            result.effects.extend(next.effects);
        }
        result
    }

    fn dispatch_one(&mut self, action: A) -> DispatchResult<E> {
        let result = if self.middleware.is_empty() {
            (self.reducer)(&mut self.state, action)
        } else {
            self.middleware.before(&action);
            let result = (self.reducer)(&mut self.state, action.clone());
            self.middleware.after(&action, result.changed);
            result
        };
        if result.changed {
            self.subscribers.notify(&self.state);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Persist,
        NoOp,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Increment => "Increment",
                TestAction::Persist => "Persist",
                TestAction::NoOp => "NoOp",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestEffect {
        Save(i32),
    }

    #[derive(Default)]
    struct TestState {
        count: i32,
    }

    fn test_reducer(state: &mut TestState, action: TestAction) -> DispatchResult<TestEffect> {
        match action {
            TestAction::Increment => {
                state.count += 1;
                DispatchResult::changed()
            }
            TestAction::Persist => DispatchResult::changed_with(TestEffect::Save(state.count)),
            TestAction::NoOp => DispatchResult::unchanged(),
        }
    }

    #[test]
    fn result_builders() {
        let result: DispatchResult<TestEffect> = DispatchResult::unchanged();
        assert!(!result.changed);
        assert!(!result.has_effects());

        let result: DispatchResult<TestEffect> = DispatchResult::changed();
        assert!(result.changed);
        assert!(result.effects.is_empty());

        let result = DispatchResult::changed_with(TestEffect::Save(1));
        assert!(result.changed);
        assert_eq!(result.effects, vec![TestEffect::Save(1)]);

        let result =
            DispatchResult::changed_with_many(vec![TestEffect::Save(1), TestEffect::Save(2)]);
        assert_eq!(result.effects.len(), 2);

        let result = DispatchResult::unchanged().with(TestEffect::Save(3));
        assert!(!result.changed);
        assert!(result.has_effects());
    }

    #[test]
    fn dispatch_returns_effects() {
        let mut store = EffectStore::new(TestState::default(), test_reducer);

        let result = store.dispatch(TestAction::Increment);
        assert!(result.changed);
        assert!(result.effects.is_empty());

        let result = store.dispatch(TestAction::Persist);
        assert_eq!(result.effects, vec![TestEffect::Save(1)]);

        let result = store.dispatch(TestAction::NoOp);
        assert!(!result.changed);
    }

    #[test]
    fn subscribers_notified_on_change() {
        let mut store = EffectStore::new(TestState::default(), test_reducer);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        store.subscribe(move |state: &TestState| sink.borrow_mut().push(state.count));

        store.dispatch(TestAction::Increment);
        store.dispatch(TestAction::NoOp);
        store.dispatch(TestAction::Increment);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn deferred_effects_are_collected() {
        let mut store = EffectStore::new(TestState::default(), test_reducer);
        let handle = store.defer_handle();

        let once = Rc::new(RefCell::new(true));
        store.subscribe(move |_| {
            if once.replace(false) {
                handle.push(TestAction::Persist);
            }
        });

        let result = store.dispatch(TestAction::Increment);

        assert!(result.changed);
        assert_eq!(result.effects, vec![TestEffect::Save(1)]);
    }
}

//! Driver for effect stores
//!
//! The driver owns the action channel and the async-work registries, and
//! turns declared effects into scheduled work. One logical thread of
//! control: UI events and task completions alike arrive as actions on the
//! channel, are dispatched in call order, and their effects are handed to
//! the application's effect handler.
//!
//! ```ignore
//! let mut driver = Driver::new(SearchState::default(), search::reducer);
//! driver.enqueue(SearchAction::SearchStart("forms".into()));
//! driver
//!     .run_until_idle(&mut |effect, ctx| match effect {
//!         SearchEffect::Query { query, ticket } => {
//!             ctx.tasks().spawn("search", async move {
//!                 SearchAction::SearchDidLoad {
//!                     ticket,
//!                     results: backend.query(&query).await,
//!                 }
//!             });
//!         }
//!     })
//!     .await;
//! ```

use tokio::sync::mpsc;

use crate::effect::{DispatchResult, EffectReducer, EffectStore};
use crate::signals::Signals;
use crate::store::{Middleware, SubscriberId};
use crate::tasks::TaskPool;
use crate::Action;

/// Context handed to effect handlers.
pub struct EffectContext<'a, A: Action> {
    action_tx: &'a mpsc::UnboundedSender<A>,
    tasks: &'a mut TaskPool<A>,
    signals: &'a mut Signals<A>,
}

impl<'a, A: Action> EffectContext<'a, A> {
    /// Send an action straight back into the queue.
    pub fn emit(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Clone of the action sender, for handing to external collaborators.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    /// The one-shot task pool.
    pub fn tasks(&mut self) -> &mut TaskPool<A> {
        self.tasks
    }

    /// The continuous signal registry.
    pub fn signals(&mut self) -> &mut Signals<A> {
        self.signals
    }
}

/// Owns a store, its action channel, and its async work.
pub struct Driver<S, A: Action, E> {
    store: EffectStore<S, A, E>,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
    tasks: TaskPool<A>,
    signals: Signals<A>,
}

impl<S, A: Action, E> Driver<S, A, E> {
    /// Create a driver from state + effect reducer.
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self::from_store(EffectStore::new(state, reducer))
    }

    /// Create a driver from an existing effect store.
    pub fn from_store(store: EffectStore<S, A, E>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let tasks = TaskPool::new(action_tx.clone());
        let signals = Signals::new(action_tx.clone());
        Self {
            store,
            action_tx,
            action_rx,
            tasks,
            signals,
        }
    }

    /// Queue an action for the next processing pass.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Clone the action sender.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    /// Current state snapshot.
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Register a subscriber on the underlying store.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&S) + 'static) -> SubscriberId {
        self.store.subscribe(subscriber)
    }

    /// Remove a subscriber from the underlying store.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Install a middleware on the underlying store.
    pub fn push_middleware<M: Middleware<A> + 'static>(&mut self, middleware: M) {
        self.store.push_middleware(middleware);
    }

    /// The one-shot task pool.
    pub fn tasks(&mut self) -> &mut TaskPool<A> {
        &mut self.tasks
    }

    /// The continuous signal registry.
    pub fn signals(&mut self) -> &mut Signals<A> {
        &mut self.signals
    }

    fn apply<F>(&mut self, action: A, handle_effect: &mut F) -> bool
    where
        F: FnMut(E, &mut EffectContext<'_, A>),
    {
        let result: DispatchResult<E> = self.store.dispatch(action);
        if result.has_effects() {
            let mut ctx = EffectContext {
                action_tx: &self.action_tx,
                tasks: &mut self.tasks,
                signals: &mut self.signals,
            };
            for effect in result.effects {
                handle_effect(effect, &mut ctx);
            }
        }
        result.changed
    }

    /// Synchronously drain every action currently queued.
    ///
    /// Returns the number of actions processed. Actions enqueued by the
    /// effect handler itself are picked up in the same pass; task
    /// completions arrive later and need [`run_until_idle`](Self::run_until_idle)
    /// or [`run`](Self::run).
    pub fn pump<F>(&mut self, handle_effect: &mut F) -> usize
    where
        F: FnMut(E, &mut EffectContext<'_, A>),
    {
        let mut processed = 0;
        while let Ok(action) = self.action_rx.try_recv() {
            self.apply(action, handle_effect);
            processed += 1;
        }
        processed
    }

    /// Process actions until the queue is empty and no tasks are in
    /// flight. Signals keep running (they never go idle by themselves).
    ///
    /// Returns the number of actions processed.
    pub async fn run_until_idle<F>(&mut self, handle_effect: &mut F) -> usize
    where
        F: FnMut(E, &mut EffectContext<'_, A>),
    {
        let mut processed = self.pump(handle_effect);
        while !self.tasks.is_empty() {
            match self.action_rx.recv().await {
                Some(action) => {
                    self.apply(action, handle_effect);
                    processed += 1;
                    processed += self.pump(handle_effect);
                }
                None => break,
            }
        }
        processed
    }

    /// Run the action loop until `should_quit` matches.
    ///
    /// Cancels all tasks and signals on exit.
    pub async fn run<F, Q>(&mut self, mut handle_effect: F, mut should_quit: Q)
    where
        F: FnMut(E, &mut EffectContext<'_, A>),
        Q: FnMut(&A) -> bool,
    {
        while let Some(action) = self.action_rx.recv().await {
            if should_quit(&action) {
                break;
            }
            self.apply(action, &mut handle_effect);
        }
        self.signals.cancel_all();
        self.tasks.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{Lifecycle, Status, Ticket};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    enum TestAction {
        Fetch,
        DidFetch { ticket: Ticket, value: u32 },
        Quit,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Fetch => "Fetch",
                TestAction::DidFetch { .. } => "DidFetch",
                TestAction::Quit => "Quit",
            }
        }
    }

    #[derive(Debug)]
    enum TestEffect {
        Fetch { ticket: Ticket },
    }

    #[derive(Default)]
    struct TestState {
        lifecycle: Lifecycle,
        value: Option<u32>,
    }

    fn reducer(state: &mut TestState, action: TestAction) -> DispatchResult<TestEffect> {
        match action {
            TestAction::Fetch => {
                let ticket = state.lifecycle.start();
                DispatchResult::changed_with(TestEffect::Fetch { ticket })
            }
            TestAction::DidFetch { ticket, value } => {
                if !state.lifecycle.complete(ticket) {
                    return DispatchResult::unchanged();
                }
                state.value = Some(value);
                DispatchResult::changed()
            }
            TestAction::Quit => DispatchResult::unchanged(),
        }
    }

    #[tokio::test]
    async fn effects_spawn_tasks_whose_completions_dispatch() {
        let mut driver = Driver::new(TestState::default(), reducer);
        driver.enqueue(TestAction::Fetch);

        driver
            .run_until_idle(&mut |effect, ctx| match effect {
                TestEffect::Fetch { ticket } => {
                    ctx.tasks().spawn("fetch", async move {
                        TestAction::DidFetch { ticket, value: 7 }
                    });
                }
            })
            .await;

        assert_eq!(driver.state().lifecycle.status(), Status::Success);
        assert_eq!(driver.state().value, Some(7));
    }

    #[tokio::test]
    async fn running_is_observable_before_completion() {
        let mut driver = Driver::new(TestState::default(), reducer);
        driver.enqueue(TestAction::Fetch);

        // Handle the effect with a slow task, then look at state before
        // the completion lands.
        driver.pump(&mut |effect, ctx| match effect {
            TestEffect::Fetch { ticket } => {
                ctx.tasks().spawn("fetch", async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    TestAction::DidFetch { ticket, value: 1 }
                });
            }
        });

        assert_eq!(driver.state().lifecycle.status(), Status::Running);

        driver.run_until_idle(&mut |_, _| {}).await;
        assert_eq!(driver.state().lifecycle.status(), Status::Success);
    }

    #[tokio::test]
    async fn overlapping_fetches_resolve_to_newest() {
        let mut driver = Driver::new(TestState::default(), reducer);

        // Two overlapping invocations; the first resolves last.
        driver.enqueue(TestAction::Fetch);
        driver.enqueue(TestAction::Fetch);

        let mut delay = Duration::from_millis(60);
        let mut value = 1;
        driver
            .run_until_idle(&mut |effect, ctx| match effect {
                TestEffect::Fetch { ticket } => {
                    let tag = format!("fetch:{}", value);
                    let this_delay = delay;
                    let this_value = value;
                    delay = Duration::from_millis(10);
                    value += 1;
                    ctx.tasks().spawn(tag, async move {
                        tokio::time::sleep(this_delay).await;
                        TestAction::DidFetch {
                            ticket,
                            value: this_value,
                        }
                    });
                }
            })
            .await;

        // The second (newest) invocation's result wins even though the
        // first finished later.
        assert_eq!(driver.state().value, Some(2));
        assert_eq!(driver.state().lifecycle.status(), Status::Success);
    }

    #[tokio::test]
    async fn run_stops_on_quit_and_cancels_work() {
        let mut driver = Driver::new(TestState::default(), reducer);
        let sender = driver.sender();

        driver.enqueue(TestAction::Fetch);
        let _ = sender.send(TestAction::Quit);

        driver
            .run(
                |effect, ctx| match effect {
                    TestEffect::Fetch { ticket } => {
                        ctx.tasks().spawn("fetch", async move {
                            tokio::time::sleep(Duration::from_secs(10)).await;
                            TestAction::DidFetch { ticket, value: 1 }
                        });
                    }
                },
                |action| matches!(action, TestAction::Quit),
            )
            .await;

        assert!(driver.tasks().is_empty());
        assert_eq!(driver.state().value, None);
    }
}

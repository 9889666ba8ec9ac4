//! formflow: reactive state stores with asynchronous action lifecycles
//!
//! Like Redux for application state, with the async edges made explicit:
//! reducers declare effects instead of performing them, async flows carry
//! idle/running/success/error lifecycles with stale-completion discard,
//! and subscribers always observe whole snapshots.
//!
//! # Example
//! ```ignore
//! use formflow::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(infer_categories)]
//! enum CartAction {
//!     ItemAdd { id: String, name: String, price: f64 },
//!     ItemRemove(String),
//!     Clear,
//! }
//! ```

// Re-export everything from core
pub use formflow_core::*;

// Assertion macros, re-exported by name so `use formflow::assert_emitted`
// works in downstream tests
pub use formflow_core::{assert_emitted, assert_not_emitted, count_emitted, find_emitted};

// Re-export the derive macro
pub use formflow_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use formflow_core::{Action, ActionCategory, ActionSummary};

    // Stores
    pub use formflow_core::{
        DeferHandle, DispatchResult, EffectReducer, EffectStore, Middleware, Reducer, Store,
        SubscriberId, TraceMiddleware,
    };

    // Lifecycle
    pub use formflow_core::{Lifecycle, Status, Ticket};

    // Collections
    pub use formflow_core::{
        add_or_increment, find_by_key, push_recent, remove_by_key, set_count, upsert_by_key,
        Counted, Keyed, Upserted,
    };

    // Async work
    pub use formflow_core::{Driver, EffectContext, SignalKey, Signals, TaskPool, TaskTag};

    // Validation
    pub use formflow_core::{
        AsyncProbe, AsyncSpec, FieldKind, FieldSet, FieldSpec, FieldState, FieldValue, Rule,
    };

    // Derive macro
    pub use formflow_macros::Action;
}

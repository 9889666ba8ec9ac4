//! Core traits and types for formflow
//!
//! This crate provides the foundational abstractions for reactive state
//! stores with asynchronous action lifecycles, following a Redux-inspired
//! architecture:
//!
//! - **Action**: events that describe state changes
//! - **Store** / **EffectStore**: observable state containers with reducers
//! - **Lifecycle**: the idle/running/success/error machine for async flows
//! - **Collections**: add/update/remove algebra over keyed entity lists
//! - **FieldSet**: per-field sync + debounced-async validation
//! - **Driver**: the action loop that executes declared effects
//!
//! # Two-phase async actions
//!
//! Asynchronous work uses intent/result action pairs: an intent action
//! (`SearchStart`) synchronously moves the lifecycle to running and
//! declares an effect; the driver executes the effect on the
//! [`TaskPool`]; the completion comes back as a `Did*` result action
//! (`SearchDidLoad` / `SearchDidError`) carrying the lifecycle ticket
//! that decides whether it still applies.
//!
//! ```ignore
//! use formflow_core::prelude::*;
//!
//! fn reducer(state: &mut AppState, action: AppAction) -> DispatchResult<AppEffect> {
//!     match action {
//!         AppAction::SessionLoad => {
//!             let ticket = state.lifecycle.start();
//!             DispatchResult::changed_with(AppEffect::LoadSession { ticket })
//!         }
//!         AppAction::SessionDidLoad { ticket, user } => {
//!             if !state.lifecycle.complete(ticket) {
//!                 return DispatchResult::unchanged();
//!             }
//!             state.current_user = Some(user);
//!             DispatchResult::changed()
//!         }
//!         // ...
//!     }
//! }
//! ```

pub mod action;
pub mod collection;
pub mod effect;
pub mod lifecycle;
pub mod runtime;
pub mod signals;
pub mod store;
pub mod tasks;
pub mod testing;
pub mod validate;

// Core trait exports
pub use action::{Action, ActionCategory, ActionSummary};

// Store exports
pub use store::{DeferHandle, Middleware, Reducer, Store, SubscriberId, TraceMiddleware};

// Effect exports
pub use effect::{DispatchResult, EffectReducer, EffectStore};

// Lifecycle exports
pub use lifecycle::{Lifecycle, Status, Ticket};

// Collection exports
pub use collection::{
    add_or_increment, find_by_key, push_recent, remove_by_key, set_count, upsert_by_key, Counted,
    Keyed, Upserted,
};

// Async work exports
pub use signals::{SignalKey, Signals};
pub use tasks::{TaskPool, TaskTag};

// Validation exports
pub use validate::{AsyncProbe, AsyncSpec, FieldKind, FieldSet, FieldSpec, FieldState, FieldValue, Rule};

// Driver exports
pub use runtime::{Driver, EffectContext};

// Testing exports
pub use testing::{Recorder, TestHarness};

#[cfg(feature = "testing-time")]
pub use testing::{advance_time, pause_time, resume_time};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionCategory, ActionSummary};
    pub use crate::collection::{
        add_or_increment, find_by_key, push_recent, remove_by_key, set_count, upsert_by_key,
        Counted, Keyed, Upserted,
    };
    pub use crate::effect::{DispatchResult, EffectReducer, EffectStore};
    pub use crate::lifecycle::{Lifecycle, Status, Ticket};
    pub use crate::runtime::{Driver, EffectContext};
    pub use crate::signals::{SignalKey, Signals};
    pub use crate::store::{DeferHandle, Middleware, Reducer, Store, SubscriberId, TraceMiddleware};
    pub use crate::tasks::{TaskPool, TaskTag};
    pub use crate::validate::{
        AsyncProbe, AsyncSpec, FieldKind, FieldSet, FieldSpec, FieldState, FieldValue, Rule,
    };
}

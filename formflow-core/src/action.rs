//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: For async completion actions sent across tasks
///
/// Use `#[derive(Action)]` from `formflow-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Actions grouped into categories for filtering and assertions
///
/// Generated by `#[derive(Action)]` with `#[action(infer_categories)]`:
/// the variant-name prefix before the verb becomes the category, and
/// `Did` result actions inherit the prefix before `Did`.
pub trait ActionCategory: Action {
    /// The generated category enum type
    type Category: Copy + Debug + Eq;

    /// Get the action's category name, if it has one
    fn category(&self) -> Option<&'static str>;

    /// Get the category as an enum value
    fn category_enum(&self) -> Self::Category;
}

/// Concise one-line rendering of an action for dispatch logs
///
/// The default implementation falls back to `Debug`. Override it for
/// data-heavy actions (result payloads, long messages) so logs stay
/// readable.
pub trait ActionSummary: Action {
    /// Render the action for logging
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

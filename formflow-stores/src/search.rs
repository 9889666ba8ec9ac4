//! Search store
//!
//! Query text, a ticket-gated async result flow, and a bounded
//! most-recent-first search history. Overlapping searches resolve to the
//! newest invocation; a slow older query can never overwrite fresher
//! results.

use formflow::{push_recent, Action, ActionSummary, DispatchResult, EffectStore, Lifecycle, Ticket};
use serde::{Deserialize, Serialize};

/// How many entries the recent-search history keeps.
pub const RECENT_SEARCH_CAP: usize = 5;

/// What kind of entity a search result points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Form,
    Card,
    User,
}

/// One search hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: ResultKind,
}

/// Search state.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub lifecycle: Lifecycle,
    /// Most-recent-first, deduplicated, at most [`RECENT_SEARCH_CAP`].
    pub recent: Vec<String>,
}

impl SearchState {
    /// Whether a search is in flight.
    pub fn is_searching(&self) -> bool {
        self.lifecycle.is_running()
    }
}

/// Search actions.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum SearchAction {
    /// Update the query text without searching.
    QuerySet(String),
    /// Replace the results directly.
    ResultsSet(Vec<SearchResult>),
    /// Kick off a search: records the query in history and declares the
    /// query effect.
    SearchStart(String),
    SearchDidLoad {
        ticket: Ticket,
        results: Vec<SearchResult>,
    },
    SearchDidError {
        ticket: Ticket,
        message: String,
    },
    /// Clear query and results (history stays).
    Clear,
    RecentClear,
    RecentRemove(String),
}

// Result payloads are too noisy for dispatch logs; show counts instead.
impl ActionSummary for SearchAction {
    fn summary(&self) -> String {
        match self {
            SearchAction::SearchDidLoad { results, .. } => {
                format!("SearchDidLoad {{ {} results }}", results.len())
            }
            SearchAction::ResultsSet(results) => {
                format!("ResultsSet({} results)", results.len())
            }
            _ => format!("{:?}", self),
        }
    }
}

/// Effects declared by the search reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchEffect {
    /// Run the query against the search collaborator.
    Query { query: String, ticket: Ticket },
}

/// Search reducer.
pub fn reducer(state: &mut SearchState, action: SearchAction) -> DispatchResult<SearchEffect> {
    match action {
        SearchAction::QuerySet(query) => {
            state.query = query;
            DispatchResult::changed()
        }
        SearchAction::ResultsSet(results) => {
            state.results = results;
            DispatchResult::changed()
        }
        SearchAction::SearchStart(query) => {
            state.query = query.clone();
            push_recent(&mut state.recent, &query, RECENT_SEARCH_CAP);
            let ticket = state.lifecycle.start();
            DispatchResult::changed_with(SearchEffect::Query { query, ticket })
        }
        SearchAction::SearchDidLoad { ticket, results } => {
            if !state.lifecycle.complete(ticket) {
                return DispatchResult::unchanged();
            }
            state.results = results;
            DispatchResult::changed()
        }
        SearchAction::SearchDidError { ticket, message } => {
            if !state.lifecycle.fail(ticket, message) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }
        SearchAction::Clear => {
            let changed = !state.query.is_empty() || !state.results.is_empty();
            state.query.clear();
            state.results.clear();
            if changed {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        SearchAction::RecentClear => {
            let changed = !state.recent.is_empty();
            state.recent.clear();
            if changed {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        SearchAction::RecentRemove(query) => {
            let before = state.recent.len();
            state.recent.retain(|entry| entry != &query);
            if state.recent.len() != before {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
    }
}

/// A fresh search store.
pub fn store() -> EffectStore<SearchState, SearchAction, SearchEffect> {
    EffectStore::new(SearchState::default(), reducer)
}

/// Canned results for a query, the shape the demo backend returns: one
/// hit for a non-blank query, nothing otherwise.
pub fn mock_results(query: &str) -> Vec<SearchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    vec![SearchResult {
        id: "1".into(),
        title: format!("Result for \"{query}\""),
        description: "This is a mock search result".into(),
        kind: ResultKind::Form,
    }]
}

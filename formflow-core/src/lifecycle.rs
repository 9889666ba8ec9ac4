//! Lifecycle state machine for asynchronous actions
//!
//! Every async flow in a store - a submission, a search, a session load -
//! moves through the same four statuses:
//!
//! ```text
//! Idle -[start]-> Running -[complete]-> Success
//!                 Running -[fail]-----> Error
//!                 Success | Error -[reset]-> Idle
//! ```
//!
//! `start` runs synchronously before the async step, so observers always
//! see `Running` first. Overlapping invocations are resolved with
//! generation tickets: each `start` bumps the generation and hands back a
//! [`Ticket`]; a completion whose ticket no longer matches is discarded.
//! The newest invocation wins, deterministically - not whichever happens
//! to resolve last.

/// Status of an asynchronous action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// No operation has run, or the last one was reset.
    #[default]
    Idle,
    /// An operation is in flight.
    Running,
    /// The most recent operation succeeded.
    Success,
    /// The most recent operation failed; see [`Lifecycle::error`].
    Error,
}

/// Proof of a particular `start` invocation.
///
/// Completions present their ticket back to the lifecycle; a stale ticket
/// (one issued before a newer `start`, `invalidate`, or reset of the flow)
/// is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// One async flow's status, error payload, and generation counter.
///
/// Accumulated data (result collections, submissions) lives next to the
/// lifecycle in the store state, not inside it - `reset` touches only
/// status and error.
#[derive(Clone, Debug, Default)]
pub struct Lifecycle {
    status: Status,
    error: Option<String>,
    generation: u64,
}

impl Lifecycle {
    /// Begin an invocation: synchronously enters `Running`, clears any
    /// previous error, and returns the ticket the completion must present.
    pub fn start(&mut self) -> Ticket {
        self.generation += 1;
        self.status = Status::Running;
        self.error = None;
        Ticket(self.generation)
    }

    /// Record a successful completion.
    ///
    /// Returns `false` (and leaves all state alone) if the ticket is stale.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.status = Status::Success;
        self.error = None;
        true
    }

    /// Record a failed completion with a message.
    ///
    /// Returns `false` (and leaves all state alone) if the ticket is stale.
    pub fn fail(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.status = Status::Error;
        self.error = Some(message.into());
        true
    }

    /// Return to `Idle`, clearing the error. Accumulated data is untouched
    /// by design; the generation never rewinds, so completions from before
    /// the reset stay stale.
    pub fn reset(&mut self) {
        self.status = Status::Idle;
        self.error = None;
    }

    /// Invalidate any in-flight invocation without starting a new one.
    ///
    /// Used when a synchronous action supersedes an async flow (logging in
    /// manually while a session load is pending, for example): the pending
    /// completion's ticket goes stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                generation = self.generation,
                "discarding stale completion"
            );
            return false;
        }
        true
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Error message from the most recent failed invocation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_idle(&self) -> bool {
        self.status == Status::Idle
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

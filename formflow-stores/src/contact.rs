//! Contact form store
//!
//! The full form-submission flow: per-field validation (including the
//! debounced async screen on the first name), the submit lifecycle, and
//! the accumulated submissions. Submission is gated on the field set -
//! a submit attempt with invalid or still-validating fields only marks
//! the fields touched and goes no further. On success the fields reset
//! to their initial values; the submissions collection survives status
//! resets.

use std::time::Duration;

use formflow::{
    Action, AsyncProbe, DispatchResult, EffectContext, EffectStore, FieldSet, FieldSpec,
    FieldValue, Lifecycle, Rule, Ticket,
};
use serde::{Deserialize, Serialize};

/// How long the first-name screen waits for typing to pause.
pub const SCREEN_DEBOUNCE: Duration = Duration::from_millis(500);

/// Latency of the mock collaborators.
const MOCK_LATENCY: Duration = Duration::from_millis(1000);

/// A completed contact payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: u32,
    pub message: String,
}

/// The contact form's field specs.
pub fn contact_fields() -> FieldSet {
    FieldSet::new(vec![
        FieldSpec::new("first_name", "First Name", FieldValue::Text(String::new()))
            .on_change(vec![
                Rule::required("First name is required"),
                Rule::min_length(2, "First name must be at least 2 characters"),
            ])
            .on_blur(vec![
                Rule::required("First name is required"),
                Rule::min_length(2, "First name must be at least 2 characters"),
            ])
            .debounced_check(SCREEN_DEBOUNCE),
        FieldSpec::new("last_name", "Last Name", FieldValue::Text(String::new())).on_change(vec![
            Rule::required("Last name is required"),
            Rule::min_length(2, "Last name must be at least 2 characters"),
        ]),
        FieldSpec::new("email", "Email", FieldValue::Email(String::new())).on_change(vec![
            Rule::required("Email is required"),
            Rule::email_format("Please enter a valid email address"),
        ]),
        FieldSpec::new("age", "Age", FieldValue::Number(0.0)).on_change(vec![
            Rule::min(13.0, "You must be at least 13 years old"),
            Rule::max(120.0, "Please enter a valid age"),
        ]),
        FieldSpec::new("message", "Message", FieldValue::TextArea(String::new())).on_change(vec![
            Rule::required("Message is required"),
            Rule::min_length(10, "Message must be at least 10 characters"),
            Rule::max_length(500, "Message must be less than 500 characters"),
        ]),
    ])
}

/// Contact form state.
#[derive(Clone, Debug)]
pub struct ContactFormState {
    pub fields: FieldSet,
    pub submissions: Vec<ContactSubmission>,
    pub lifecycle: Lifecycle,
}

impl Default for ContactFormState {
    fn default() -> Self {
        Self {
            fields: contact_fields(),
            submissions: Vec::new(),
            lifecycle: Lifecycle::default(),
        }
    }
}

impl ContactFormState {
    /// Whether the fields currently allow submission.
    pub fn can_submit(&self) -> bool {
        self.fields.can_submit()
    }

    fn text(&self, name: &str) -> String {
        self.fields
            .value(name)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }

    /// Assemble the payload from the current field values.
    fn payload(&self) -> ContactSubmission {
        ContactSubmission {
            first_name: self.text("first_name"),
            last_name: self.text("last_name"),
            email: self.text("email"),
            age: self
                .fields
                .value("age")
                .and_then(FieldValue::as_number)
                .unwrap_or(0.0) as u32,
            message: self.text("message"),
        }
    }
}

/// Contact form actions.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum ContactAction {
    /// A field's value changed.
    FieldChange { name: String, value: FieldValue },
    /// A field lost focus.
    FieldBlur(String),
    /// Result of a debounced field screen.
    FieldDidScreen {
        field: String,
        seq: u64,
        error: Option<String>,
    },
    /// Attempt submission. Rejected (fields merely marked touched) unless
    /// every field is valid and none is validating.
    SubmitStart,
    SubmitDidSend {
        ticket: Ticket,
        payload: ContactSubmission,
    },
    SubmitDidError {
        ticket: Ticket,
        message: String,
    },
    /// Clear the submit status and error; submissions are untouched.
    StatusReset,
    SubmissionsClear,
}

/// Effects declared by the contact reducer.
#[derive(Clone, Debug)]
pub enum ContactEffect {
    /// Schedule the debounced async screen for a field.
    ScreenField {
        field: String,
        seq: u64,
        value: FieldValue,
        delay: Duration,
    },
    /// Send the payload to the submission collaborator.
    Send {
        payload: ContactSubmission,
        ticket: Ticket,
    },
}

/// Contact form reducer.
pub fn reducer(state: &mut ContactFormState, action: ContactAction) -> DispatchResult<ContactEffect> {
    match action {
        ContactAction::FieldChange { name, value } => {
            if !state.fields.contains(&name) {
                return DispatchResult::unchanged();
            }
            match state.fields.change(&name, value) {
                Some(AsyncProbe {
                    field,
                    seq,
                    value,
                    delay,
                }) => DispatchResult::changed_with(ContactEffect::ScreenField {
                    field,
                    seq,
                    value,
                    delay,
                }),
                None => DispatchResult::changed(),
            }
        }
        ContactAction::FieldBlur(name) => {
            if state.fields.blur(&name) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        ContactAction::FieldDidScreen { field, seq, error } => {
            if state.fields.apply_async(&field, seq, error) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        ContactAction::SubmitStart => {
            if !state.fields.touch_all_and_validate() {
                tracing::debug!("submission blocked by field validation");
                return DispatchResult::changed();
            }
            let payload = state.payload();
            let ticket = state.lifecycle.start();
            DispatchResult::changed_with(ContactEffect::Send { payload, ticket })
        }
        ContactAction::SubmitDidSend { ticket, payload } => {
            if !state.lifecycle.complete(ticket) {
                return DispatchResult::unchanged();
            }
            state.submissions.push(payload);
            // Successful submission resets the form for the next one.
            state.fields.reset();
            DispatchResult::changed()
        }
        ContactAction::SubmitDidError { ticket, message } => {
            if !state.lifecycle.fail(ticket, message) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }
        ContactAction::StatusReset => {
            let changed = !state.lifecycle.is_idle() || state.lifecycle.error().is_some();
            state.lifecycle.reset();
            if changed {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        ContactAction::SubmissionsClear => {
            let changed = !state.submissions.is_empty();
            state.submissions.clear();
            if changed {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
    }
}

/// A fresh contact form store.
pub fn store() -> EffectStore<ContactFormState, ContactAction, ContactEffect> {
    EffectStore::new(ContactFormState::default(), reducer)
}

/// Mock screen collaborator: rejects names containing "test".
pub async fn screen_name(value: FieldValue) -> Option<String> {
    tokio::time::sleep(MOCK_LATENCY).await;
    match value.as_text() {
        Some(text) if text.to_lowercase().contains("test") => {
            Some("First name cannot contain \"test\"".to_string())
        }
        _ => None,
    }
}

/// Mock submission collaborator: accepts after simulated latency and
/// echoes the payload back.
pub async fn send_submission(payload: ContactSubmission) -> Result<ContactSubmission, String> {
    tokio::time::sleep(MOCK_LATENCY).await;
    Ok(payload)
}

/// Default effect wiring against the mock collaborators.
///
/// The screen rides `TaskPool::debounce` under a per-field tag, so a
/// newer keystroke cancels the pending screen outright; a result that
/// does fire is still sequence-checked by the reducer.
pub fn handle_effect(effect: ContactEffect, ctx: &mut EffectContext<'_, ContactAction>) {
    match effect {
        ContactEffect::ScreenField {
            field,
            seq,
            value,
            delay,
        } => {
            let tag = format!("screen:{field}");
            ctx.tasks().debounce(tag, delay, async move {
                let error = screen_name(value).await;
                ContactAction::FieldDidScreen { field, seq, error }
            });
        }
        ContactEffect::Send { payload, ticket } => {
            ctx.tasks().spawn("contact:send", async move {
                match send_submission(payload).await {
                    Ok(payload) => ContactAction::SubmitDidSend { ticket, payload },
                    Err(message) => ContactAction::SubmitDidError { ticket, message },
                }
            });
        }
    }
}

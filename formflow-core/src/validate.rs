//! Per-field validation pipeline
//!
//! Each field runs up to three checks:
//!
//! 1. synchronous rules on every value change,
//! 2. synchronous rules when the field loses focus,
//! 3. an optional debounced asynchronous check after typing pauses.
//!
//! Field values are a tagged union over the supported field kinds - a
//! text value is a `String`, an age is an `f64`, a checkbox is a `bool` -
//! so rules can't be handed a value of the wrong shape.
//!
//! The async check is raced against further edits with a per-field
//! sequence number: [`FieldSet::change`] bumps the number and returns an
//! [`AsyncProbe`] for the driver to schedule (typically through
//! [`TaskPool::debounce`](crate::TaskPool::debounce)); when the result
//! comes back, [`FieldSet::apply_async`] accepts it only if no newer
//! change superseded it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The supported field kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Email,
    Select,
    Checkbox,
    Radio,
    TextArea,
}

/// A strongly-typed field value, one variant per field kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Email(String),
    Select(String),
    Checkbox(bool),
    Radio(String),
    TextArea(String),
}

impl FieldValue {
    /// Which kind of field this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Email(_) => FieldKind::Email,
            FieldValue::Select(_) => FieldKind::Select,
            FieldValue::Checkbox(_) => FieldKind::Checkbox,
            FieldValue::Radio(_) => FieldKind::Radio,
            FieldValue::TextArea(_) => FieldKind::TextArea,
        }
    }

    /// The textual content, for the string-backed kinds.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text)
            | FieldValue::Email(text)
            | FieldValue::Select(text)
            | FieldValue::Radio(text)
            | FieldValue::TextArea(text) => Some(text),
            _ => None,
        }
    }

    /// The numeric content, for number fields.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the value counts as absent for `Required` checks.
    ///
    /// String-backed kinds are empty when blank after trimming; numbers
    /// and checkboxes are always considered present.
    pub fn is_empty(&self) -> bool {
        match self.as_text() {
            Some(text) => text.trim().is_empty(),
            None => false,
        }
    }
}

/// A synchronous validation rule, carrying its human-readable message.
///
/// Rules never throw; a failing check surfaces as field state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Rule {
    /// The value must be present (see [`FieldValue::is_empty`]).
    Required { message: String },
    /// Text must be at least `min` characters.
    MinLength { min: usize, message: String },
    /// Text must be at most `max` characters.
    MaxLength { max: usize, message: String },
    /// Number must be at least `min`.
    Min { min: f64, message: String },
    /// Number must be at most `max`.
    Max { max: f64, message: String },
    /// Text must look like an email address.
    EmailFormat { message: String },
    /// Text must not contain `needle` (case-insensitive).
    Forbidden { needle: String, message: String },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required {
            message: message.into(),
        }
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Rule::MinLength {
            min,
            message: message.into(),
        }
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Rule::MaxLength {
            max,
            message: message.into(),
        }
    }

    pub fn min(min: f64, message: impl Into<String>) -> Self {
        Rule::Min {
            min,
            message: message.into(),
        }
    }

    pub fn max(max: f64, message: impl Into<String>) -> Self {
        Rule::Max {
            max,
            message: message.into(),
        }
    }

    pub fn email_format(message: impl Into<String>) -> Self {
        Rule::EmailFormat {
            message: message.into(),
        }
    }

    pub fn forbidden(needle: impl Into<String>, message: impl Into<String>) -> Self {
        Rule::Forbidden {
            needle: needle.into(),
            message: message.into(),
        }
    }

    /// Check the value, returning the failure message if the rule fails.
    pub fn check(&self, value: &FieldValue) -> Option<String> {
        match self {
            Rule::Required { message } => value.is_empty().then(|| message.clone()),
            Rule::MinLength { min, message } => {
                let length = value.as_text().map(|t| t.chars().count()).unwrap_or(0);
                (length < *min).then(|| message.clone())
            }
            Rule::MaxLength { max, message } => {
                let length = value.as_text().map(|t| t.chars().count()).unwrap_or(0);
                (length > *max).then(|| message.clone())
            }
            Rule::Min { min, message } => match value.as_number() {
                Some(n) if n < *min => Some(message.clone()),
                _ => None,
            },
            Rule::Max { max, message } => match value.as_number() {
                Some(n) if n > *max => Some(message.clone()),
                _ => None,
            },
            Rule::EmailFormat { message } => match value.as_text() {
                Some(text) if !looks_like_email(text) => Some(message.clone()),
                _ => None,
            },
            Rule::Forbidden { needle, message } => match value.as_text() {
                Some(text) if text.to_lowercase().contains(&needle.to_lowercase()) => {
                    Some(message.clone())
                }
                _ => None,
            },
        }
    }
}

// local@domain with at least one dot in a whitespace-free domain.
fn looks_like_email(text: &str) -> bool {
    let mut parts = text.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !local.contains(char::is_whitespace)
                && domain.contains('.')
                && domain
                    .split('.')
                    .all(|segment| !segment.is_empty() && !segment.contains(char::is_whitespace))
        }
        _ => false,
    }
}

/// Configuration of a field's debounced asynchronous check.
#[derive(Clone, Copy, Debug)]
pub struct AsyncSpec {
    /// How long the value must stay unchanged before the check runs.
    pub debounce: Duration,
}

/// Static description of one field: identity, initial value, and rules.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub initial: FieldValue,
    pub on_change: Vec<Rule>,
    pub on_blur: Vec<Rule>,
    pub async_check: Option<AsyncSpec>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, initial: FieldValue) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            initial,
            on_change: Vec::new(),
            on_blur: Vec::new(),
            async_check: None,
        }
    }

    /// Rules run on every value change.
    pub fn on_change(mut self, rules: Vec<Rule>) -> Self {
        self.on_change = rules;
        self
    }

    /// Rules run when the field loses focus.
    pub fn on_blur(mut self, rules: Vec<Rule>) -> Self {
        self.on_blur = rules;
        self
    }

    /// Attach a debounced asynchronous check.
    pub fn debounced_check(mut self, debounce: Duration) -> Self {
        self.async_check = Some(AsyncSpec { debounce });
        self
    }
}

/// Live state of one field.
#[derive(Clone, Debug)]
pub struct FieldState {
    pub value: FieldValue,
    pub touched: bool,
    pub validating: bool,
    sync_errors: Vec<String>,
    async_error: Option<String>,
    seq: u64,
}

impl FieldState {
    fn new(value: FieldValue) -> Self {
        Self {
            value,
            touched: false,
            validating: false,
            sync_errors: Vec::new(),
            async_error: None,
            seq: 0,
        }
    }

    /// All current errors, synchronous first, then the async result.
    pub fn errors(&self) -> Vec<&str> {
        self.sync_errors
            .iter()
            .map(String::as_str)
            .chain(self.async_error.as_deref())
            .collect()
    }

    /// A field is valid iff it has no errors.
    pub fn is_valid(&self) -> bool {
        self.sync_errors.is_empty() && self.async_error.is_none()
    }

    /// The field's current request sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Work order for a debounced async check, returned by [`FieldSet::change`].
///
/// The driver schedules it; the completion must echo `field` and `seq`
/// back through [`FieldSet::apply_async`].
#[derive(Clone, Debug)]
pub struct AsyncProbe {
    pub field: String,
    pub seq: u64,
    pub value: FieldValue,
    pub delay: Duration,
}

#[derive(Clone, Debug)]
struct Field {
    spec: FieldSpec,
    state: FieldState,
}

/// An ordered set of fields under validation.
///
/// Insertion order is display order; lookup is by field name.
#[derive(Clone, Debug)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    /// Build a field set from specs, each field starting at its initial
    /// value, untouched and unvalidated.
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        let fields = specs
            .into_iter()
            .map(|spec| {
                let state = FieldState::new(spec.initial.clone());
                Field { spec, state }
            })
            .collect();
        Self { fields }
    }

    /// Whether a field with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.spec.name == name)
    }

    /// A field's live state.
    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields
            .iter()
            .find(|field| field.spec.name == name)
            .map(|field| &field.state)
    }

    /// A field's current value.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).map(|state| &state.value)
    }

    /// Iterate field names and states in display order.
    pub fn states(&self) -> impl Iterator<Item = (&str, &FieldState)> {
        self.fields
            .iter()
            .map(|field| (field.spec.name.as_str(), &field.state))
    }

    /// Apply a value change.
    ///
    /// Runs the field's `on_change` rules immediately, discards any async
    /// error (it belonged to the old value), and - when the field has an
    /// async check - bumps the sequence number, marks the field
    /// validating, and returns the probe to schedule.
    pub fn change(&mut self, name: &str, value: FieldValue) -> Option<AsyncProbe> {
        let Some(field) = self.fields.iter_mut().find(|f| f.spec.name == name) else {
            tracing::warn!(field = name, "change for unknown field");
            return None;
        };
        field.state.value = value.clone();
        field.state.seq += 1;
        field.state.sync_errors = first_failure(&field.spec.on_change, &field.state.value)
            .into_iter()
            .collect();
        field.state.async_error = None;
        match &field.spec.async_check {
            Some(check) => {
                field.state.validating = true;
                Some(AsyncProbe {
                    field: field.spec.name.clone(),
                    seq: field.state.seq,
                    value,
                    delay: check.debounce,
                })
            }
            None => {
                field.state.validating = false;
                None
            }
        }
    }

    /// Mark the field touched and run its `on_blur` rules.
    pub fn blur(&mut self, name: &str) -> bool {
        let Some(field) = self.fields.iter_mut().find(|f| f.spec.name == name) else {
            tracing::warn!(field = name, "blur for unknown field");
            return false;
        };
        field.state.touched = true;
        if let Some(message) = first_failure(&field.spec.on_blur, &field.state.value) {
            if !field.state.sync_errors.contains(&message) {
                field.state.sync_errors.push(message);
            }
        }
        true
    }

    /// Apply an async check result.
    ///
    /// Accepted only when `seq` is still the field's current sequence
    /// number; a result for a superseded value is discarded and the
    /// `validating` flag stays owned by the newest probe.
    pub fn apply_async(&mut self, name: &str, seq: u64, error: Option<String>) -> bool {
        let Some(field) = self.fields.iter_mut().find(|f| f.spec.name == name) else {
            tracing::warn!(field = name, "async result for unknown field");
            return false;
        };
        if seq != field.state.seq {
            tracing::debug!(
                field = name,
                seq,
                current = field.state.seq,
                "discarding stale validation result"
            );
            return false;
        }
        field.state.validating = false;
        field.state.async_error = error;
        true
    }

    /// Whether the form may be submitted: every field valid, none
    /// validating.
    pub fn can_submit(&self) -> bool {
        self.fields
            .iter()
            .all(|field| field.state.is_valid() && !field.state.validating)
    }

    /// Submit-time gate: touch every field, rerun its change rules, and
    /// report [`can_submit`](Self::can_submit).
    pub fn touch_all_and_validate(&mut self) -> bool {
        for field in &mut self.fields {
            field.state.touched = true;
            field.state.sync_errors = first_failure(&field.spec.on_change, &field.state.value)
                .into_iter()
                .collect();
        }
        self.can_submit()
    }

    /// Return every field to its initial value, untouched and error-free.
    ///
    /// Sequence numbers advance rather than rewind, so async results for
    /// pre-reset values can never land on the fresh form.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            let seq = field.state.seq + 1;
            field.state = FieldState {
                seq,
                ..FieldState::new(field.spec.initial.clone())
            };
        }
    }
}

// A trigger reports its first failing rule, like the source validators
// which return a single message per trigger.
fn first_failure(rules: &[Rule], value: &FieldValue) -> Option<String> {
    rules.iter().find_map(|rule| rule.check(value))
}

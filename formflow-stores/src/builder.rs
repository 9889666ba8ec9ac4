//! Form builder store
//!
//! Saved form documents with upsert-by-id semantics: saving an existing
//! form replaces it in place and stamps `updated_at`; saving a new one
//! appends. The store also tracks the form currently being edited.

use chrono::{DateTime, Utc};
use formflow::{remove_by_key, upsert_by_key, Action, FieldKind, FieldValue, Keyed, Rule, Store, Upserted};
use serde::{Deserialize, Serialize};

/// Review status of a saved form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

/// One field of a built form. The value, when present, is the same
/// tagged union the validation pipeline uses - a number field can only
/// hold a number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

/// A saved form document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: FormStatus,
    pub fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Keyed for Form {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }
}

/// Builder state: saved forms plus the one being edited.
#[derive(Clone, Debug, Default)]
pub struct BuilderState {
    pub forms: Vec<Form>,
    pub current: Option<Form>,
}

impl BuilderState {
    /// Look up a saved form by id.
    pub fn form(&self, id: &str) -> Option<&Form> {
        formflow::find_by_key(&self.forms, &id.to_string())
    }
}

/// Builder actions.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum BuilderAction {
    /// Upsert a form. `at` stamps `updated_at` when an existing form is
    /// replaced; the caller supplies it so the reducer stays
    /// deterministic.
    FormSave { form: Form, at: DateTime<Utc> },
    /// Select (or deselect) the form being edited.
    CurrentSet(Option<Form>),
    CurrentClear,
    /// Delete a saved form; clears the selection when it was the one
    /// being edited.
    FormDelete(String),
}

/// Builder reducer.
pub fn reducer(state: &mut BuilderState, action: BuilderAction) -> bool {
    match action {
        BuilderAction::FormSave { form, at } => {
            let mut saved = form;
            let outcome = upsert_by_key(&mut state.forms, saved.clone(), |stored| {
                stored.updated_at = at;
            });
            if outcome == Upserted::Replaced {
                saved.updated_at = at;
            }
            state.current = Some(saved);
            true
        }
        BuilderAction::CurrentSet(form) => {
            let changed = state.current != form;
            state.current = form;
            changed
        }
        BuilderAction::CurrentClear => {
            let changed = state.current.is_some();
            state.current = None;
            changed
        }
        BuilderAction::FormDelete(id) => {
            let removed = remove_by_key(&mut state.forms, &id);
            let deselected = state
                .current
                .as_ref()
                .map(|form| form.id == id)
                .unwrap_or(false);
            if deselected {
                state.current = None;
            }
            removed || deselected
        }
    }
}

/// A fresh builder store.
pub fn store() -> Store<BuilderState, BuilderAction> {
    Store::new(BuilderState::default(), reducer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn when(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn form(id: &str, title: &str, at: DateTime<Utc>) -> Form {
        Form {
            id: id.into(),
            title: title.into(),
            description: "A form".into(),
            status: FormStatus::Draft,
            fields: vec![FormField {
                id: format!("{id}-f1"),
                name: "email".into(),
                label: "Email".into(),
                kind: FieldKind::Email,
                required: true,
                value: None,
                rules: vec![Rule::required("Email is required")],
            }],
            created_at: at,
            updated_at: at,
            submitted_at: None,
        }
    }

    #[test]
    fn save_appends_new_forms_in_order() {
        let mut store = store();

        store.dispatch(BuilderAction::FormSave {
            form: form("a", "First", when(0)),
            at: when(0),
        });
        store.dispatch(BuilderAction::FormSave {
            form: form("b", "Second", when(1)),
            at: when(1),
        });

        let state = store.state();
        assert_eq!(state.forms.len(), 2);
        assert_eq!(state.forms[0].id, "a");
        assert_eq!(state.current.as_ref().unwrap().id, "b");
    }

    #[test]
    fn save_replaces_in_place_and_stamps_updated_at() {
        let mut store = store();

        store.dispatch(BuilderAction::FormSave {
            form: form("a", "First", when(0)),
            at: when(0),
        });
        store.dispatch(BuilderAction::FormSave {
            form: form("b", "Second", when(1)),
            at: when(1),
        });

        let mut revised = form("a", "First, revised", when(0));
        revised.status = FormStatus::Submitted;
        store.dispatch(BuilderAction::FormSave {
            form: revised,
            at: when(60),
        });

        let state = store.state();
        assert_eq!(state.forms.len(), 2);
        // Position preserved.
        assert_eq!(state.forms[0].title, "First, revised");
        assert_eq!(state.forms[0].updated_at, when(60));
        assert_eq!(state.forms[0].created_at, when(0));
        // The selection mirrors the stamped copy.
        assert_eq!(state.current.as_ref().unwrap().updated_at, when(60));
    }

    #[test]
    fn delete_clears_matching_selection() {
        let mut store = store();
        store.dispatch(BuilderAction::FormSave {
            form: form("a", "First", when(0)),
            at: when(0),
        });

        assert!(store.dispatch(BuilderAction::FormDelete("a".into())));

        let state = store.state();
        assert!(state.forms.is_empty());
        assert!(state.current.is_none());

        // Deleting again is a no-op.
        assert!(!store.dispatch(BuilderAction::FormDelete("a".into())));
    }

    #[test]
    fn delete_keeps_unrelated_selection() {
        let mut store = store();
        store.dispatch(BuilderAction::FormSave {
            form: form("a", "First", when(0)),
            at: when(0),
        });
        store.dispatch(BuilderAction::FormSave {
            form: form("b", "Second", when(1)),
            at: when(1),
        });

        store.dispatch(BuilderAction::FormDelete("a".into()));

        let state = store.state();
        assert_eq!(state.current.as_ref().unwrap().id, "b");
        assert!(state.form("a").is_none());
        assert!(state.form("b").is_some());
    }

    #[test]
    fn current_set_and_clear() {
        let mut store = store();
        let draft = form("a", "Draft", when(0));

        assert!(store.dispatch(BuilderAction::CurrentSet(Some(draft.clone()))));
        assert_eq!(store.state().current.as_ref().unwrap().id, "a");

        // Same selection again: unchanged.
        assert!(!store.dispatch(BuilderAction::CurrentSet(Some(draft))));

        assert!(store.dispatch(BuilderAction::CurrentClear));
        assert!(!store.dispatch(BuilderAction::CurrentClear));
    }

    #[test]
    fn form_roundtrips_through_json() {
        let subject = form("a", "First", when(0));
        let encoded = serde_json::to_string(&subject).unwrap();
        let decoded: Form = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, subject);
        assert!(encoded.contains("\"status\":\"draft\""));
        assert!(encoded.contains("\"kind\":\"email\""));
    }
}

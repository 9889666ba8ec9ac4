//! Auth store
//!
//! Owns the session: the current user, replaced wholesale on login and
//! logout, patched on profile update. The session load is a ticket-gated
//! async flow; a manual login or logout invalidates any load still in
//! flight so its completion cannot clobber the newer session.

use formflow::{Action, DispatchResult, EffectStore, Lifecycle, Ticket};

use crate::user::{Privileges, User, UserPatch, UserRole};

/// Auth state.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub current_user: Option<User>,
    pub is_authenticated: bool,
    pub lifecycle: Lifecycle,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            current_user: None,
            is_authenticated: false,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl AuthState {
    /// Whether a session load is in flight.
    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Whether the current user holds all of `privileges`. False with no
    /// user.
    pub fn has_privilege(&self, privileges: Privileges) -> bool {
        self.current_user
            .as_ref()
            .map(|user| user.privileges.contains(privileges))
            .unwrap_or(false)
    }

    /// Whether the current user has exactly this role. False with no user.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.current_user
            .as_ref()
            .map(|user| user.role == role)
            .unwrap_or(false)
    }
}

/// Auth actions.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum AuthAction {
    /// Start the async session load.
    SessionLoad,
    SessionDidLoad {
        ticket: Ticket,
        user: User,
    },
    SessionDidError {
        ticket: Ticket,
        message: String,
    },
    /// Replace the session with this user.
    Login(User),
    /// Drop the session.
    Logout,
    /// Patch the current user's profile. No-op when logged out.
    ProfileUpdate(UserPatch),
}

/// Effects declared by the auth reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthEffect {
    /// Resolve the session against the auth collaborator.
    LoadSession { ticket: Ticket },
}

/// Auth reducer.
pub fn reducer(state: &mut AuthState, action: AuthAction) -> DispatchResult<AuthEffect> {
    match action {
        AuthAction::SessionLoad => {
            let ticket = state.lifecycle.start();
            DispatchResult::changed_with(AuthEffect::LoadSession { ticket })
        }
        AuthAction::SessionDidLoad { ticket, user } => {
            if !state.lifecycle.complete(ticket) {
                return DispatchResult::unchanged();
            }
            state.current_user = Some(user);
            state.is_authenticated = true;
            DispatchResult::changed()
        }
        AuthAction::SessionDidError { ticket, message } => {
            if !state.lifecycle.fail(ticket, message) {
                return DispatchResult::unchanged();
            }
            state.current_user = None;
            state.is_authenticated = false;
            DispatchResult::changed()
        }
        AuthAction::Login(user) => {
            // A pending session load must not overwrite the manual login.
            state.lifecycle.invalidate();
            state.lifecycle.reset();
            state.current_user = Some(user);
            state.is_authenticated = true;
            DispatchResult::changed()
        }
        AuthAction::Logout => {
            state.lifecycle.invalidate();
            state.lifecycle.reset();
            state.current_user = None;
            state.is_authenticated = false;
            DispatchResult::changed()
        }
        AuthAction::ProfileUpdate(patch) => match state.current_user.as_mut() {
            Some(user) => {
                patch.apply(user);
                DispatchResult::changed()
            }
            None => {
                tracing::debug!("profile update with no session");
                DispatchResult::unchanged()
            }
        },
    }
}

/// A fresh auth store.
pub fn store() -> EffectStore<AuthState, AuthAction, AuthEffect> {
    EffectStore::new(AuthState::default(), reducer)
}

/// The demo user the mock auth backend resolves to.
pub fn mock_user() -> User {
    User {
        id: "1".into(),
        name: "John Doe".into(),
        email: "john@example.com".into(),
        avatar: None,
        role: UserRole::User,
        privileges: Privileges::CREATE_FORM | Privileges::VIEW_DRAFTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflow::Status;

    fn load(store: &mut EffectStore<AuthState, AuthAction, AuthEffect>) -> Ticket {
        let result = store.dispatch(AuthAction::SessionLoad);
        match result.effects.as_slice() {
            [AuthEffect::LoadSession { ticket }] => *ticket,
            other => panic!("expected one load effect, got {other:?}"),
        }
    }

    #[test]
    fn session_load_resolves_to_user() {
        let mut store = store();

        let ticket = load(&mut store);
        assert!(store.state().is_loading());
        assert!(!store.state().is_authenticated);

        store.dispatch(AuthAction::SessionDidLoad {
            ticket,
            user: mock_user(),
        });

        let state = store.state();
        assert!(!state.is_loading());
        assert!(state.is_authenticated);
        assert_eq!(state.current_user.as_ref().unwrap().name, "John Doe");
    }

    #[test]
    fn session_error_clears_session() {
        let mut store = store();
        let ticket = load(&mut store);

        store.dispatch(AuthAction::SessionDidError {
            ticket,
            message: "token expired".into(),
        });

        let state = store.state();
        assert_eq!(state.lifecycle.status(), Status::Error);
        assert_eq!(state.lifecycle.error(), Some("token expired"));
        assert!(!state.is_authenticated);
    }

    #[test]
    fn login_wins_over_inflight_session_load() {
        let mut store = store();
        let ticket = load(&mut store);

        let mut manual = mock_user();
        manual.name = "Jane Admin".into();
        manual.role = UserRole::Admin;
        store.dispatch(AuthAction::Login(manual));

        // The load completes late; its ticket is stale.
        let result = store.dispatch(AuthAction::SessionDidLoad {
            ticket,
            user: mock_user(),
        });

        assert!(!result.changed);
        assert_eq!(store.state().current_user.as_ref().unwrap().name, "Jane Admin");
    }

    #[test]
    fn logout_replaces_session_wholesale() {
        let mut store = store();
        store.dispatch(AuthAction::Login(mock_user()));
        assert!(store.state().is_authenticated);

        store.dispatch(AuthAction::Logout);

        let state = store.state();
        assert!(state.current_user.is_none());
        assert!(!state.is_authenticated);
        assert_eq!(state.lifecycle.status(), Status::Idle);
    }

    #[test]
    fn privilege_and_role_checks_default_to_false() {
        let mut store = store();
        let state = store.state();
        assert!(!state.has_privilege(Privileges::CREATE_FORM));
        assert!(!state.has_role(UserRole::User));

        store.dispatch(AuthAction::Login(mock_user()));

        let state = store.state();
        assert!(state.has_privilege(Privileges::CREATE_FORM));
        assert!(state.has_privilege(Privileges::CREATE_FORM | Privileges::VIEW_DRAFTS));
        assert!(!state.has_privilege(Privileges::DELETE_FORM));
        assert!(state.has_role(UserRole::User));
        assert!(!state.has_role(UserRole::Admin));
    }

    #[test]
    fn profile_update_patches_in_place() {
        let mut store = store();

        // Logged out: nothing to patch.
        let result = store.dispatch(AuthAction::ProfileUpdate(UserPatch {
            name: Some("Nobody".into()),
            ..UserPatch::default()
        }));
        assert!(!result.changed);

        store.dispatch(AuthAction::Login(mock_user()));
        store.dispatch(AuthAction::ProfileUpdate(UserPatch {
            email: Some("jane@example.com".into()),
            ..UserPatch::default()
        }));

        let user = store.state().current_user.as_ref().unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.name, "John Doe");
    }
}

//! User entity: identity, role, and privileges

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// What a user is allowed to do.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Privileges: u8 {
        const CREATE_FORM = 1 << 0;
        const EDIT_FORM   = 1 << 1;
        const DELETE_FORM = 1 << 2;
        const VIEW_DRAFTS = 1 << 3;
        const SUBMIT_FORM = 1 << 4;
    }
}

/// Coarse access role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Viewer,
}

/// An authenticated user. Owned by the auth store, read-only everywhere
/// else; replaced wholesale on login/logout, patched on profile update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    pub privileges: Privileges,
}

/// Typed partial update for a user profile.
///
/// Only the populated fields are applied; everything else keeps its
/// current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<UserRole>,
    pub privileges: Option<Privileges>,
}

impl UserPatch {
    /// Apply the populated fields onto `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(privileges) = self.privileges {
            user.privileges = privileges;
        }
    }
}

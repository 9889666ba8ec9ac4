//! Theme store
//!
//! The theme preference is `light`, `dark`, or `system`; resolving
//! `system` against the environment happens in exactly one place,
//! [`ThemeState::effective`]. The preference persists as a JSON blob
//! under a single storage key: read once at store creation (falling back
//! to `system` on missing or corrupt data), written through a `Persist`
//! effect on every change.

use formflow::{Action, DispatchResult, EffectStore};
use serde::{Deserialize, Serialize};

use crate::storage::{BlobStore, StorageError};

/// Storage key for the persisted theme blob.
pub const THEME_STORAGE_KEY: &str = "theme-storage";

/// The stored theme preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// A concrete theme, after resolving `system`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn opposite(self) -> Self {
        match self {
            ResolvedTheme::Light => ResolvedTheme::Dark,
            ResolvedTheme::Dark => ResolvedTheme::Light,
        }
    }
}

/// The environment's reported color-scheme preference.
pub trait SystemScheme {
    fn current(&self) -> ResolvedTheme;
}

/// A fixed scheme, for tests and headless runs.
#[derive(Clone, Copy, Debug)]
pub struct FixedScheme(pub ResolvedTheme);

impl SystemScheme for FixedScheme {
    fn current(&self) -> ResolvedTheme {
        self.0
    }
}

/// Theme state - exactly the persisted layout.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ThemeState {
    pub theme: Theme,
}

impl ThemeState {
    /// Load the persisted preference, tolerating missing or corrupt data
    /// by falling back to `system`.
    pub fn load(storage: &dyn BlobStore) -> Self {
        match storage.read(THEME_STORAGE_KEY) {
            Some(blob) => serde_json::from_str(&blob).unwrap_or_else(|err| {
                tracing::warn!(%err, "corrupt theme blob, falling back to system");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Resolve the effective theme. This is the only place the system
    /// preference is consulted.
    pub fn effective(&self, system: ResolvedTheme) -> ResolvedTheme {
        match self.theme {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System => system,
        }
    }
}

/// Theme actions.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum ThemeAction {
    /// Set the preference outright.
    Set(Theme),
    /// Flip to the opposite of the currently effective theme. From
    /// `system` this lands on a concrete theme, never a third state.
    Toggle { system: ResolvedTheme },
    /// The environment's preference changed.
    SystemDidChange(ResolvedTheme),
}

/// Effects declared by the theme reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum ThemeEffect {
    /// Write the preference to the blob store.
    Persist { theme: Theme },
}

/// Theme reducer. Every `Set`/`Toggle` declares a `Persist`, whether or
/// not the value moved - the storage contract is write-on-every-set.
pub fn reducer(state: &mut ThemeState, action: ThemeAction) -> DispatchResult<ThemeEffect> {
    match action {
        ThemeAction::Set(theme) => {
            let changed = state.theme != theme;
            state.theme = theme;
            let result = if changed {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            };
            result.with(ThemeEffect::Persist { theme })
        }
        ThemeAction::Toggle { system } => {
            let next = match state.effective(system).opposite() {
                ResolvedTheme::Light => Theme::Light,
                ResolvedTheme::Dark => Theme::Dark,
            };
            state.theme = next;
            DispatchResult::changed_with(ThemeEffect::Persist { theme: next })
        }
        ThemeAction::SystemDidChange(_) => {
            // Nothing stored changes, but observers of the effective theme
            // must re-read when the preference is `system`.
            if state.theme == Theme::System {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
    }
}

/// A theme store hydrated from `storage`.
pub fn store(storage: &dyn BlobStore) -> EffectStore<ThemeState, ThemeAction, ThemeEffect> {
    EffectStore::new(ThemeState::load(storage), reducer)
}

/// Execute a theme effect against the blob store.
pub fn persist_effect(effect: ThemeEffect, storage: &mut dyn BlobStore) -> Result<(), StorageError> {
    match effect {
        ThemeEffect::Persist { theme } => {
            let blob = serde_json::to_string(&ThemeState { theme })?;
            storage.write(THEME_STORAGE_KEY, &blob)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use formflow::assert_emitted;

    #[test]
    fn defaults_to_system_on_missing_blob() {
        let storage = MemoryBlobStore::new();
        let state = ThemeState::load(&storage);
        assert_eq!(state.theme, Theme::System);
    }

    #[test]
    fn defaults_to_system_on_corrupt_blob() {
        let storage = MemoryBlobStore::new().with_entry(THEME_STORAGE_KEY, "not json {");
        let state = ThemeState::load(&storage);
        assert_eq!(state.theme, Theme::System);
    }

    #[test]
    fn loads_persisted_preference() {
        let storage = MemoryBlobStore::new().with_entry(THEME_STORAGE_KEY, "{\"theme\":\"dark\"}");
        let state = ThemeState::load(&storage);
        assert_eq!(state.theme, Theme::Dark);
    }

    #[test]
    fn effective_resolves_system_via_environment() {
        let state = ThemeState { theme: Theme::System };
        assert_eq!(state.effective(ResolvedTheme::Dark), ResolvedTheme::Dark);
        assert_eq!(state.effective(ResolvedTheme::Light), ResolvedTheme::Light);

        let state = ThemeState { theme: Theme::Light };
        assert_eq!(state.effective(ResolvedTheme::Dark), ResolvedTheme::Light);
    }

    #[test]
    fn set_persists_every_time() {
        let mut storage = MemoryBlobStore::new();
        let mut store = store(&storage);

        let result = store.dispatch(ThemeAction::Set(Theme::Dark));
        assert!(result.changed);
        for effect in result.effects {
            persist_effect(effect, &mut storage).unwrap();
        }
        assert_eq!(
            storage.read(THEME_STORAGE_KEY).as_deref(),
            Some("{\"theme\":\"dark\"}")
        );

        // Setting the same value again still writes through.
        let result = store.dispatch(ThemeAction::Set(Theme::Dark));
        assert!(!result.changed);
        assert_emitted!(result.effects, ThemeEffect::Persist { theme: Theme::Dark });
    }

    #[test]
    fn toggle_from_system_flips_the_resolved_theme() {
        let storage = MemoryBlobStore::new();
        let mut store = store(&storage);
        assert_eq!(store.state().theme, Theme::System);

        // Environment is dark, so toggling lands on light - a concrete
        // theme, never back on `system`.
        store.dispatch(ThemeAction::Toggle {
            system: ResolvedTheme::Dark,
        });
        assert_eq!(store.state().theme, Theme::Light);

        store.dispatch(ThemeAction::Toggle {
            system: ResolvedTheme::Dark,
        });
        assert_eq!(store.state().theme, Theme::Dark);
    }

    #[test]
    fn system_change_notifies_only_system_preference() {
        let storage = MemoryBlobStore::new();
        let mut store = store(&storage);

        let result = store.dispatch(ThemeAction::SystemDidChange(ResolvedTheme::Dark));
        assert!(result.changed);

        store.dispatch(ThemeAction::Set(Theme::Light));
        let result = store.dispatch(ThemeAction::SystemDidChange(ResolvedTheme::Light));
        assert!(!result.changed);
    }

    #[test]
    fn round_trip_through_storage() {
        let mut storage = MemoryBlobStore::new();
        {
            let mut store = store(&storage);
            let result = store.dispatch(ThemeAction::Set(Theme::Dark));
            for effect in result.effects {
                persist_effect(effect, &mut storage).unwrap();
            }
        }

        // A new session reads the persisted preference back.
        let revived = store(&storage);
        assert_eq!(revived.state().theme, Theme::Dark);
    }
}

//! Prebuilt application stores for formflow
//!
//! Five stores, each an explicitly constructed container around a
//! formflow reducer:
//!
//! - [`cart`]: keyed item list with derived totals (pure sync)
//! - [`search`]: ticket-gated async queries plus bounded recent history
//! - [`auth`]: session lifecycle, privilege and role checks
//! - [`contact`]: field validation pipeline plus the submission flow
//! - [`builder`]: saved form documents with upsert-by-id
//! - [`theme`]: persisted preference with environment resolution
//!
//! No store touches another's internals; cross-store reads go through
//! state snapshots and selectors. Each store module exposes its state
//! type, action enum, reducer, and a `store()` constructor; the async
//! stores also expose their effect enum and mock collaborators.

pub mod auth;
pub mod builder;
pub mod cart;
pub mod contact;
pub mod search;
pub mod storage;
pub mod theme;
pub mod user;

pub use auth::{AuthAction, AuthEffect, AuthState};
pub use builder::{BuilderAction, BuilderState, Form, FormField, FormStatus};
pub use cart::{CartAction, CartItem, CartState};
pub use contact::{ContactAction, ContactEffect, ContactFormState, ContactSubmission};
pub use search::{ResultKind, SearchAction, SearchEffect, SearchResult, SearchState};
pub use storage::{BlobStore, MemoryBlobStore, StorageError};
pub use theme::{ResolvedTheme, SystemScheme, Theme, ThemeAction, ThemeEffect, ThemeState};
pub use user::{Privileges, User, UserPatch, UserRole};

//! The remote document store and authentication boundary.
//!
//! Every screen talks to the backend through [`AuthService`] and
//! [`DocumentStore`]. A backend value is built once at startup and passed by
//! reference; nothing in this crate keeps an ambient client.
//!
//! Two implementations ship with the crate:
//! - [`MemoryBackend`] keeps everything in process memory
//! - [`SqliteBackend`] persists documents, accounts and the signed-in session
//!   in a local SQLite file

pub mod credentials;
pub mod document;
mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{io, path::PathBuf};

use crate::error::{ErrorCode, Result};
use crate::model::{Group, GroupId, Identity, Profile, ScheduledTask, UserId, Weekday};
use document::Collection;

/// Failures raised by a backend itself rather than by input validation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to prepare store directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{collection}/{id} does not exist")]
    Missing { collection: Collection, id: String },
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Sqlite(_) | Self::Io { .. } => ErrorCode::StoreFailure,
            Self::Json(_) => ErrorCode::CorruptDocument,
            Self::Missing {
                collection: Collection::Groups,
                ..
            } => ErrorCode::GroupNotFound,
            Self::Missing {
                collection: Collection::Profiles,
                ..
            } => ErrorCode::ProfileNotFound,
        }
    }
}

/// The identity attached to an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Email/password authentication.
pub trait AuthService {
    /// Register a new account and make it the signed-in user.
    ///
    /// # Errors
    ///
    /// Fails with `EmailInUse`, `InvalidEmail`, `WeakPassword`, or a store error.
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Authenticate and make the account the signed-in user.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidCredentials` for an unknown email or wrong password.
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Forget the signed-in user. Signing out twice is not an error.
    ///
    /// # Errors
    ///
    /// Fails only on store errors.
    fn sign_out(&self) -> Result<()>;

    /// # Errors
    ///
    /// Fails only on store errors.
    fn current_user(&self) -> Result<Option<AuthUser>>;
}

/// Fields written onto a profile document. `None` leaves the stored value
/// untouched; the group reference is only written through
/// [`DocumentStore::set_group_ref`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub email: Option<String>,
    pub identity: Option<Identity>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Initial contents of a group document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub creator_id: UserId,
    pub name: Option<String>,
    pub members: Vec<UserId>,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
}

/// Field-level update of a group document. Unset fields are left alone.
///
/// `tasks` replaces the whole stored list; `add_members` is merged with
/// set-union semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub week_start: Option<Weekday>,
    pub invite_code: Option<String>,
    pub tasks: Option<Vec<ScheduledTask>>,
    pub add_members: Vec<UserId>,
}

impl GroupPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.week_start.is_none()
            && self.invite_code.is_none()
            && self.tasks.is_none()
            && self.add_members.is_empty()
    }
}

/// Document operations against the `usuarios` and `grupos` collections.
///
/// Writes are last-writer-wins; there is no version check and no transaction
/// spanning more than one call.
pub trait DocumentStore {
    /// # Errors
    ///
    /// Fails on store errors or an undecodable document.
    fn get_profile(&self, user: &UserId) -> Result<Option<Profile>>;

    /// Create the profile document or merge `fields` into it.
    ///
    /// # Errors
    ///
    /// Fails on store errors.
    fn set_profile(&self, user: &UserId, fields: &ProfileFields) -> Result<()>;

    /// Point the user's profile at `group`.
    ///
    /// # Errors
    ///
    /// Fails on store errors.
    fn set_group_ref(&self, user: &UserId, group: &GroupId) -> Result<()>;

    /// # Errors
    ///
    /// Fails on store errors.
    fn create_group(&self, group: &NewGroup) -> Result<GroupId>;

    /// # Errors
    ///
    /// Fails on store errors or an undecodable document.
    fn get_group(&self, group: &GroupId) -> Result<Option<Group>>;

    /// Merge `patch` into an existing group document.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::Missing`] when the group does not exist.
    fn update_group(&self, group: &GroupId, patch: &GroupPatch) -> Result<()>;

    /// Groups whose member list contains `user`.
    ///
    /// # Errors
    ///
    /// Fails on store errors.
    fn query_groups_by_member(&self, user: &UserId) -> Result<Vec<Group>>;

    /// Groups whose invite code equals `code` exactly.
    ///
    /// # Errors
    ///
    /// Fails on store errors.
    fn query_groups_by_invite_code(&self, code: &str) -> Result<Vec<Group>>;

    /// Delete a group. Deleting a missing group succeeds.
    ///
    /// # Errors
    ///
    /// Fails on store errors.
    fn delete_group(&self, group: &GroupId) -> Result<()>;
}

/// A complete backend: authentication plus documents.
pub trait Backend: AuthService + DocumentStore {}

impl<T: AuthService + DocumentStore + ?Sized> Backend for T {}

#[cfg(test)]
mod tests {
    use super::{Collection, GroupPatch, StoreError};
    use crate::error::ErrorCode;
    use crate::model::Weekday;

    #[test]
    fn default_patch_is_empty() {
        assert!(GroupPatch::default().is_empty());
        let patch = GroupPatch {
            week_start: Some(Weekday::Monday),
            ..GroupPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn missing_documents_map_to_lookup_codes() {
        let group = StoreError::Missing {
            collection: Collection::Groups,
            id: "g1".into(),
        };
        let profile = StoreError::Missing {
            collection: Collection::Profiles,
            id: "u1".into(),
        };
        assert_eq!(group.code(), ErrorCode::GroupNotFound);
        assert_eq!(profile.code(), ErrorCode::ProfileNotFound);
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::credentials::{self, PasswordDigest};
use super::document::{Collection, GroupDocument, ProfileDocument};
use super::{AuthService, AuthUser, DocumentStore, GroupPatch, NewGroup, ProfileFields, StoreError};
use crate::error::{Result, WhizzyError};
use crate::model::{Group, GroupId, Profile, UserId};

#[derive(Debug)]
struct Account {
    user: AuthUser,
    digest: PasswordDigest,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    profiles: BTreeMap<UserId, ProfileDocument>,
    groups: BTreeMap<GroupId, GroupDocument>,
    current: Option<AuthUser>,
    calls: usize,
}

/// Backend that keeps accounts, documents and the session in memory.
///
/// Every trait call is counted so callers can check that a rejected action
/// never reached the store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of auth and document calls served so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
    }

    fn enter(&self) -> MutexGuard<'_, MemoryState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.calls += 1;
        state
    }
}

impl AuthService for MemoryBackend {
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        credentials::check_signup_input(email, password)?;
        let key = credentials::normalize_email(email);
        let mut state = self.enter();
        if state.accounts.contains_key(&key) {
            return Err(WhizzyError::EmailInUse(key));
        }
        let user = AuthUser {
            id: UserId::generate(),
            email: email.trim().to_string(),
        };
        state.accounts.insert(
            key,
            Account {
                user: user.clone(),
                digest: PasswordDigest::derive(password),
            },
        );
        state.current = Some(user.clone());
        debug!(user = %user.id, "account created");
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let key = credentials::normalize_email(email);
        let mut state = self.enter();
        let user = match state.accounts.get(&key) {
            Some(account) if account.digest.verify(password) => account.user.clone(),
            _ => return Err(WhizzyError::InvalidCredentials),
        };
        state.current = Some(user.clone());
        Ok(user)
    }

    fn sign_out(&self) -> Result<()> {
        self.enter().current = None;
        Ok(())
    }

    fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.enter().current.clone())
    }
}

impl DocumentStore for MemoryBackend {
    fn get_profile(&self, user: &UserId) -> Result<Option<Profile>> {
        let state = self.enter();
        Ok(state
            .profiles
            .get(user)
            .cloned()
            .map(|doc| doc.into_profile(user.clone())))
    }

    fn set_profile(&self, user: &UserId, fields: &ProfileFields) -> Result<()> {
        self.enter()
            .profiles
            .entry(user.clone())
            .or_default()
            .merge(fields);
        Ok(())
    }

    fn set_group_ref(&self, user: &UserId, group: &GroupId) -> Result<()> {
        self.enter()
            .profiles
            .entry(user.clone())
            .or_default()
            .group_id = Some(group.to_string());
        Ok(())
    }

    fn create_group(&self, group: &NewGroup) -> Result<GroupId> {
        let id = GroupId::generate();
        self.enter()
            .groups
            .insert(id.clone(), GroupDocument::from(group));
        Ok(id)
    }

    fn get_group(&self, group: &GroupId) -> Result<Option<Group>> {
        let state = self.enter();
        Ok(state
            .groups
            .get(group)
            .cloned()
            .map(|doc| doc.into_group(group.clone())))
    }

    fn update_group(&self, group: &GroupId, patch: &GroupPatch) -> Result<()> {
        let mut state = self.enter();
        let doc = state.groups.get_mut(group).ok_or_else(|| StoreError::Missing {
            collection: Collection::Groups,
            id: group.to_string(),
        })?;
        doc.apply(patch);
        Ok(())
    }

    fn query_groups_by_member(&self, user: &UserId) -> Result<Vec<Group>> {
        let state = self.enter();
        Ok(state
            .groups
            .iter()
            .filter(|(_, doc)| doc.has_member(user))
            .map(|(id, doc)| doc.clone().into_group(id.clone()))
            .collect())
    }

    fn query_groups_by_invite_code(&self, code: &str) -> Result<Vec<Group>> {
        let state = self.enter();
        Ok(state
            .groups
            .iter()
            .filter(|(_, doc)| doc.invite_code == code)
            .map(|(id, doc)| doc.clone().into_group(id.clone()))
            .collect())
    }

    fn delete_group(&self, group: &GroupId) -> Result<()> {
        self.enter().groups.remove(group);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::error::WhizzyError;
    use crate::model::{GroupId, UserId};
    use crate::store::{AuthService, DocumentStore, GroupPatch, NewGroup};
    use chrono::Utc;

    fn new_group(creator: &UserId) -> NewGroup {
        NewGroup {
            creator_id: creator.clone(),
            name: None,
            members: vec![creator.clone()],
            invite_code: "abc123".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sign_up_then_sign_in() {
        let backend = MemoryBackend::new();
        let created = backend.sign_up("ana@example.com", "secreto1").unwrap();
        backend.sign_out().unwrap();
        assert!(backend.current_user().unwrap().is_none());

        let signed_in = backend.sign_in("ANA@example.com", "secreto1").unwrap();
        assert_eq!(signed_in.id, created.id);
        assert_eq!(backend.current_user().unwrap(), Some(signed_in));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let backend = MemoryBackend::new();
        backend.sign_up("ana@example.com", "secreto1").unwrap();
        assert!(matches!(
            backend.sign_up("Ana@Example.com", "otro123"),
            Err(WhizzyError::EmailInUse(_))
        ));
    }

    #[test]
    fn wrong_password_and_unknown_email_look_the_same() {
        let backend = MemoryBackend::new();
        backend.sign_up("ana@example.com", "secreto1").unwrap();
        assert!(matches!(
            backend.sign_in("ana@example.com", "nope"),
            Err(WhizzyError::InvalidCredentials)
        ));
        assert!(matches!(
            backend.sign_in("bob@example.com", "secreto1"),
            Err(WhizzyError::InvalidCredentials)
        ));
    }

    #[test]
    fn update_of_missing_group_fails() {
        let backend = MemoryBackend::new();
        let err = backend
            .update_group(&GroupId::new("nope"), &GroupPatch::default())
            .unwrap_err();
        assert!(matches!(err, WhizzyError::Store(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let backend = MemoryBackend::new();
        let creator = UserId::new("u1");
        let id = backend.create_group(&new_group(&creator)).unwrap();
        backend.delete_group(&id).unwrap();
        backend.delete_group(&id).unwrap();
        assert!(backend.get_group(&id).unwrap().is_none());
    }

    #[test]
    fn queries_match_member_and_code() {
        let backend = MemoryBackend::new();
        let ana = UserId::new("ana");
        let id = backend.create_group(&new_group(&ana)).unwrap();

        let by_member = backend.query_groups_by_member(&ana).unwrap();
        assert_eq!(by_member.len(), 1);
        assert_eq!(by_member[0].id, id);
        assert!(backend.query_groups_by_member(&UserId::new("bob")).unwrap().is_empty());

        assert_eq!(backend.query_groups_by_invite_code("abc123").unwrap().len(), 1);
        assert!(backend.query_groups_by_invite_code("ABC123").unwrap().is_empty());
    }

    #[test]
    fn calls_are_counted() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.call_count(), 0);
        backend.current_user().unwrap();
        backend.get_group(&GroupId::new("g")).unwrap();
        assert_eq!(backend.call_count(), 2);
    }
}

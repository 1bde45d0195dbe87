//! Sign-in, sign-up and the onboarding state machine.
//!
//! [`next_state`] is the only place that decides where a user goes next.
//! Every flow that finishes an onboarding step (login, resume, profile setup,
//! group creation, task submission) ends by asking it.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, WhizzyError};
use crate::model::{Group, GroupId, Identity, Profile, UserId};
use crate::store::{AuthService, AuthUser, Backend, DocumentStore, ProfileFields, credentials};

/// Where the user stands in onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OnboardingState {
    SignedOut,
    /// Name and avatar are still missing.
    ProfileSetup,
    /// No usable group: create one, join one, or pick an existing one.
    GroupSelection,
    /// The group still needs a name or a week-start day.
    GroupSetup { group_id: GroupId },
    /// The group has no scheduled tasks yet.
    TaskSelection { group_id: GroupId },
    Home { group_id: GroupId },
}

impl OnboardingState {
    /// Short label for terminal output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::SignedOut => "signed-out",
            Self::ProfileSetup => "profile-setup",
            Self::GroupSelection => "group-selection",
            Self::GroupSetup { .. } => "group-setup",
            Self::TaskSelection { .. } => "task-selection",
            Self::Home { .. } => "home",
        }
    }

    #[must_use]
    pub const fn group_id(&self) -> Option<&GroupId> {
        match self {
            Self::GroupSetup { group_id }
            | Self::TaskSelection { group_id }
            | Self::Home { group_id } => Some(group_id),
            Self::SignedOut | Self::ProfileSetup | Self::GroupSelection => None,
        }
    }
}

/// Compute the onboarding state of a signed-in user.
///
/// `group` is the document the profile's group reference points at, if it
/// could be loaded. A returning user with a complete profile and a complete
/// group goes straight to [`OnboardingState::Home`]. A dangling reference or
/// a group that no longer lists the user sends them back to group selection.
#[must_use]
pub fn next_state(profile: Option<&Profile>, group: Option<&Group>) -> OnboardingState {
    let Some(profile) = profile.filter(|p| p.is_complete()) else {
        return OnboardingState::ProfileSetup;
    };
    let Some(group_ref) = profile.group_id.as_ref() else {
        return OnboardingState::GroupSelection;
    };
    let Some(group) = group.filter(|g| &g.id == group_ref && g.has_member(&profile.id)) else {
        return OnboardingState::GroupSelection;
    };

    let group_id = group.id.clone();
    if group.name.as_deref().is_none_or(|n| n.trim().is_empty()) || group.week_start.is_none() {
        OnboardingState::GroupSetup { group_id }
    } else if group.tasks.is_empty() {
        OnboardingState::TaskSelection { group_id }
    } else {
        OnboardingState::Home { group_id }
    }
}

/// The signed-in user together with the documents that decide their state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub profile: Option<Profile>,
    pub group: Option<Group>,
}

impl Session {
    /// Read the user's profile and, when referenced, their current group.
    ///
    /// # Errors
    ///
    /// Fails on store errors.
    pub fn load<S: DocumentStore + ?Sized>(store: &S, user: AuthUser) -> Result<Self> {
        let profile = store.get_profile(&user.id)?;
        let group = match profile.as_ref().and_then(|p| p.group_id.as_ref()) {
            Some(group_id) => store.get_group(group_id)?,
            None => None,
        };
        debug!(user = %user.id, has_profile = profile.is_some(), has_group = group.is_some(), "session loaded");
        Ok(Self {
            user,
            profile,
            group,
        })
    }

    #[must_use]
    pub fn state(&self) -> OnboardingState {
        next_state(self.profile.as_ref(), self.group.as_ref())
    }
}

/// The signed-in user, or [`WhizzyError::NotSignedIn`].
///
/// # Errors
///
/// Fails when nobody is signed in or on store errors.
pub fn require_user<A: AuthService + ?Sized>(auth: &A) -> Result<AuthUser> {
    auth.current_user()?.ok_or(WhizzyError::NotSignedIn)
}

/// Load the current session, if anyone is signed in.
///
/// # Errors
///
/// Fails on store errors.
pub fn current<B: Backend + ?Sized>(backend: &B) -> Result<Option<Session>> {
    backend
        .current_user()?
        .map(|user| Session::load(backend, user))
        .transpose()
}

/// Onboarding state of whoever is signed in.
///
/// # Errors
///
/// Fails on store errors.
pub fn resolve<B: Backend + ?Sized>(backend: &B) -> Result<OnboardingState> {
    Ok(current(backend)?.map_or(OnboardingState::SignedOut, |session| session.state()))
}

/// Create an account and its bare profile document.
///
/// The new profile holds only the email and creation time, so the next step
/// is always profile setup.
///
/// # Errors
///
/// Input errors are returned before the backend is touched.
pub fn sign_up<B: Backend + ?Sized>(
    backend: &B,
    email: &str,
    password: &str,
) -> Result<(AuthUser, OnboardingState)> {
    credentials::check_signup_input(email, password)?;
    let user = backend.sign_up(email, password)?;
    backend.set_profile(
        &user.id,
        &ProfileFields {
            email: Some(user.email.clone()),
            created_at: Some(Utc::now()),
            ..ProfileFields::default()
        },
    )?;
    info!(user = %user.id, "signed up");
    Ok((user, OnboardingState::ProfileSetup))
}

/// Authenticate and work out where the user resumes.
///
/// # Errors
///
/// Input errors are returned before the backend is touched; a wrong email or
/// password yields [`WhizzyError::InvalidCredentials`].
pub fn sign_in<B: Backend + ?Sized>(
    backend: &B,
    email: &str,
    password: &str,
) -> Result<Session> {
    credentials::check_login_input(email, password)?;
    let user = backend.sign_in(email, password)?;
    info!(user = %user.id, "signed in");
    Session::load(backend, user)
}

/// # Errors
///
/// Fails on store errors.
pub fn sign_out<A: AuthService + ?Sized>(auth: &A) -> Result<()> {
    auth.sign_out()?;
    info!("signed out");
    Ok(())
}

/// Write name and avatar onto the user's profile.
///
/// # Errors
///
/// Returns [`WhizzyError::MissingFields`] (name and/or avatar) or
/// [`WhizzyError::AvatarOutOfRange`] before any store call.
pub fn complete_profile<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
    name: &str,
    avatar: Option<u32>,
) -> Result<OnboardingState> {
    let identity = Identity::new(name, avatar)?;
    store.set_profile(
        user,
        &ProfileFields {
            identity: Some(identity),
            ..ProfileFields::default()
        },
    )?;
    info!(user = %user, "profile completed");

    let profile = store.get_profile(user)?;
    let group = match profile.as_ref().and_then(|p| p.group_id.as_ref()) {
        Some(group_id) => store.get_group(group_id)?,
        None => None,
    };
    Ok(next_state(profile.as_ref(), group.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::{OnboardingState, complete_profile, next_state, resolve, sign_in, sign_up};
    use crate::error::{Field, WhizzyError};
    use crate::model::{Group, GroupId, Identity, Profile, ScheduledTask, UserId, Weekday};
    use crate::store::MemoryBackend;

    fn profile(group: Option<&str>) -> Profile {
        Profile {
            id: UserId::new("ana"),
            email: "ana@example.com".into(),
            identity: Some(Identity::new("Ana", Some(2)).unwrap()),
            group_id: group.map(GroupId::new),
            created_at: None,
        }
    }

    fn group(name: Option<&str>, week_start: Option<Weekday>, tasks: usize) -> Group {
        Group {
            id: GroupId::new("g1"),
            creator_id: UserId::new("ana"),
            name: name.map(str::to_string),
            members: vec![UserId::new("ana")],
            invite_code: "abc123".into(),
            week_start,
            tasks: (0..tasks)
                .map(|i| ScheduledTask {
                    id: i.to_string(),
                    title: "t".into(),
                    points: 10,
                    day: "Lunes".into(),
                })
                .collect(),
            created_at: None,
        }
    }

    #[test]
    fn incomplete_profile_goes_to_setup() {
        let mut p = profile(None);
        p.identity = None;
        assert_eq!(next_state(Some(&p), None), OnboardingState::ProfileSetup);
        assert_eq!(next_state(None, None), OnboardingState::ProfileSetup);
    }

    #[test]
    fn complete_profile_without_group_selects_one() {
        assert_eq!(
            next_state(Some(&profile(None)), None),
            OnboardingState::GroupSelection
        );
    }

    #[test]
    fn dangling_group_ref_selects_again() {
        assert_eq!(
            next_state(Some(&profile(Some("g1"))), None),
            OnboardingState::GroupSelection
        );
        let mut g = group(Some("Casa"), Some(Weekday::Monday), 1);
        g.members.clear();
        assert_eq!(
            next_state(Some(&profile(Some("g1"))), Some(&g)),
            OnboardingState::GroupSelection
        );
    }

    #[test]
    fn group_progress_decides_the_step() {
        let p = profile(Some("g1"));
        let gid = GroupId::new("g1");
        assert_eq!(
            next_state(Some(&p), Some(&group(None, None, 0))),
            OnboardingState::GroupSetup {
                group_id: gid.clone()
            }
        );
        assert_eq!(
            next_state(Some(&p), Some(&group(Some("Casa"), Some(Weekday::Monday), 0))),
            OnboardingState::TaskSelection {
                group_id: gid.clone()
            }
        );
        assert_eq!(
            next_state(Some(&p), Some(&group(Some("Casa"), Some(Weekday::Monday), 2))),
            OnboardingState::Home { group_id: gid }
        );
    }

    #[test]
    fn sign_up_lands_on_profile_setup() {
        let backend = MemoryBackend::new();
        let (user, state) = sign_up(&backend, "ana@example.com", "secreto1").unwrap();
        assert_eq!(state, OnboardingState::ProfileSetup);
        assert_eq!(resolve(&backend).unwrap(), OnboardingState::ProfileSetup);

        let next = complete_profile(&backend, &user.id, "Ana", Some(2)).unwrap();
        assert_eq!(next, OnboardingState::GroupSelection);
    }

    #[test]
    fn bad_login_input_never_reaches_backend() {
        let backend = MemoryBackend::new();
        let err = sign_in(&backend, "", "").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn wrong_password_has_localized_message() {
        let backend = MemoryBackend::new();
        sign_up(&backend, "ana@example.com", "secreto1").unwrap();
        let err = sign_in(&backend, "ana@example.com", "equivocada").unwrap_err();
        assert!(matches!(err, WhizzyError::InvalidCredentials));
        assert_eq!(err.user_message(), "Usuario o contraseña incorrectos");
    }

    #[test]
    fn profile_setup_requires_name_and_avatar() {
        let backend = MemoryBackend::new();
        let err = complete_profile(&backend, &UserId::new("ana"), " ", None).unwrap_err();
        assert!(matches!(err, WhizzyError::MissingFields(ref f) if f == &[Field::Name, Field::Avatar]));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn nobody_signed_in_resolves_to_signed_out() {
        let backend = MemoryBackend::new();
        assert_eq!(resolve(&backend).unwrap(), OnboardingState::SignedOut);
    }
}

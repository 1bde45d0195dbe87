//! Group membership: create, configure, join, list and prune, select.
//!
//! Each operation issues its store calls one after another. Nothing here is
//! transactional across calls: a failure between creating a group and pointing
//! the creator's profile at it leaves an orphan, which the next listing scan
//! prunes because it is incomplete.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Field, Result, WhizzyError};
use crate::invite;
use crate::model::{Group, GroupId, Profile, UserId, Weekday};
use crate::store::{DocumentStore, GroupPatch, NewGroup};
use crate::weekly::parse_day;

fn require_profile<S: DocumentStore + ?Sized>(store: &S, user: &UserId) -> Result<Profile> {
    store
        .get_profile(user)?
        .ok_or_else(|| WhizzyError::ProfileNotFound(user.clone()))
}

/// The group the user's profile points at.
///
/// # Errors
///
/// [`WhizzyError::ProfileNotFound`], [`WhizzyError::NoActiveGroup`],
/// [`WhizzyError::GroupNotFound`] or [`WhizzyError::NotAMember`] depending on
/// which link is broken.
pub fn active_group<S: DocumentStore + ?Sized>(store: &S, user: &UserId) -> Result<Group> {
    let profile = require_profile(store, user)?;
    let group_id = profile
        .group_id
        .ok_or_else(|| WhizzyError::NoActiveGroup(user.clone()))?;
    let group = store
        .get_group(&group_id)?
        .ok_or_else(|| WhizzyError::GroupNotFound(group_id.clone()))?;
    if !group.has_member(user) {
        return Err(WhizzyError::NotAMember {
            user: user.clone(),
            group: group_id,
        });
    }
    Ok(group)
}

/// Create a group with `creator` as its only member and make it their
/// current group.
///
/// # Errors
///
/// Fails on store errors.
pub fn create_group<S: DocumentStore + ?Sized>(store: &S, creator: &UserId) -> Result<Group> {
    let new = NewGroup {
        creator_id: creator.clone(),
        name: None,
        members: vec![creator.clone()],
        invite_code: invite::generate(),
        created_at: Utc::now(),
    };
    let id = store.create_group(&new)?;
    store.set_group_ref(creator, &id)?;
    info!(group = %id, creator = %creator, "group created");

    Ok(Group {
        id,
        creator_id: new.creator_id,
        name: None,
        members: new.members,
        invite_code: new.invite_code,
        week_start: None,
        tasks: Vec::new(),
        created_at: Some(new.created_at),
    })
}

/// Read the group setup form as typed.
///
/// # Errors
///
/// Every problem is reported at once: a blank name, a missing day and a day
/// outside the canonical list come back together through
/// [`WhizzyError::from_many`].
pub fn parse_group_settings(name: &str, week_start: Option<&str>) -> Result<(String, Weekday)> {
    let name = name.trim();
    let mut missing = Vec::new();
    if name.is_empty() {
        missing.push(Field::GroupName);
    }
    let (day, invalid) = match week_start.filter(|raw| !raw.trim().is_empty()).map(parse_day) {
        None => {
            missing.push(Field::WeekStart);
            (None, None)
        }
        Some(Ok(day)) => (Some(day), None),
        Some(Err(err)) => (None, Some(err)),
    };

    match day {
        Some(day) if missing.is_empty() => Ok((name.to_string(), day)),
        _ => {
            let mut problems = Vec::with_capacity(2);
            if !missing.is_empty() {
                problems.push(WhizzyError::MissingFields(missing));
            }
            problems.extend(invalid);
            Err(WhizzyError::from_many(problems))
        }
    }
}

/// Name the user's current group and pick its week-start day.
///
/// # Errors
///
/// A blank name and a missing day are reported together as
/// [`WhizzyError::MissingFields`] before any store call.
pub fn configure_group<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
    name: &str,
    week_start: Option<Weekday>,
) -> Result<Group> {
    let name = name.trim();
    let mut missing = Vec::new();
    if name.is_empty() {
        missing.push(Field::GroupName);
    }
    if week_start.is_none() {
        missing.push(Field::WeekStart);
    }
    let Some(week_start) = week_start.filter(|_| missing.is_empty()) else {
        return Err(WhizzyError::MissingFields(missing));
    };

    let mut group = active_group(store, user)?;
    store.update_group(
        &group.id,
        &GroupPatch {
            name: Some(name.to_string()),
            week_start: Some(week_start),
            ..GroupPatch::default()
        },
    )?;
    info!(group = %group.id, %week_start, "group configured");

    group.name = Some(name.to_string());
    group.week_start = Some(week_start);
    Ok(group)
}

/// Join the group whose invite code is exactly `code` (after trimming).
///
/// When several groups share the code the first one returned is used.
///
/// # Errors
///
/// An empty code is rejected before any store call. An unknown code yields
/// [`WhizzyError::InviteCodeNotFound`] and leaves the profile untouched.
pub fn join_by_code<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
    code: &str,
) -> Result<Group> {
    let code = code.trim();
    if code.is_empty() {
        return Err(WhizzyError::MissingFields(vec![Field::InviteCode]));
    }

    let mut group = store
        .query_groups_by_invite_code(code)?
        .into_iter()
        .next()
        .ok_or_else(|| WhizzyError::InviteCodeNotFound(code.to_string()))?;

    store.set_group_ref(user, &group.id)?;
    store.update_group(
        &group.id,
        &GroupPatch {
            add_members: vec![user.clone()],
            ..GroupPatch::default()
        },
    )?;
    info!(group = %group.id, user = %user, "joined group");

    if !group.has_member(user) {
        group.members.push(user.clone());
    }
    Ok(group)
}

/// Groups the user belongs to that are fully set up.
///
/// Every incomplete group found on the way (no name, no week-start day, or
/// no tasks) is deleted. Deletes are idempotent, so concurrent scans are
/// harmless.
///
/// # Errors
///
/// Fails on store errors.
pub fn list_and_prune_user_groups<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
) -> Result<Vec<Group>> {
    let mut kept = Vec::new();
    for group in store.query_groups_by_member(user)? {
        let missing = group.missing_fields();
        if missing.is_empty() {
            kept.push(group);
        } else {
            store.delete_group(&group.id)?;
            info!(group = %group.id, ?missing, "pruned incomplete group");
        }
    }
    debug!(user = %user, count = kept.len(), "listed groups");
    Ok(kept)
}

/// Make one of the user's groups their current group.
///
/// # Errors
///
/// [`WhizzyError::GroupNotFound`] or [`WhizzyError::NotAMember`].
pub fn select_group<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
    group_id: &GroupId,
) -> Result<Group> {
    let group = store
        .get_group(group_id)?
        .ok_or_else(|| WhizzyError::GroupNotFound(group_id.clone()))?;
    if !group.has_member(user) {
        return Err(WhizzyError::NotAMember {
            user: user.clone(),
            group: group_id.clone(),
        });
    }
    store.set_group_ref(user, group_id)?;
    info!(group = %group_id, user = %user, "group selected");
    Ok(group)
}

/// Replace the current group's invite code. Codes shared earlier stop working.
///
/// # Errors
///
/// Same as [`active_group`], plus store errors.
pub fn rotate_invite_code<S: DocumentStore + ?Sized>(store: &S, user: &UserId) -> Result<Group> {
    let mut group = active_group(store, user)?;
    let code = invite::generate();
    store.update_group(
        &group.id,
        &GroupPatch {
            invite_code: Some(code.clone()),
            ..GroupPatch::default()
        },
    )?;
    info!(group = %group.id, "invite code rotated");
    group.invite_code = code;
    Ok(group)
}

/// One group as shown on the profile screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub invite_code: String,
    pub members: usize,
}

impl From<&Group> for GroupSummary {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.display_name().to_string(),
            invite_code: group.invite_code.clone(),
            members: group.members.len(),
        }
    }
}

/// Profile screen contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileOverview {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: u8,
    pub current_group: Option<GroupSummary>,
    pub other_groups: Vec<GroupSummary>,
}

/// Name, avatar, current group and the user's other groups.
///
/// A dangling group reference shows as no current group. Other groups are
/// listed as stored, without pruning.
///
/// # Errors
///
/// [`WhizzyError::ProfileNotFound`] or store errors.
pub fn profile_overview<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
) -> Result<ProfileOverview> {
    let profile = require_profile(store, user)?;
    let current = match &profile.group_id {
        Some(group_id) => store.get_group(group_id)?,
        None => None,
    };
    let other_groups = store
        .query_groups_by_member(user)?
        .iter()
        .filter(|group| Some(&group.id) != profile.group_id.as_ref())
        .map(GroupSummary::from)
        .collect();

    Ok(ProfileOverview {
        name: profile.display_name().to_string(),
        avatar: profile.avatar().map_or(0, |avatar| avatar.get()),
        current_group: current.as_ref().map(GroupSummary::from),
        other_groups,
        email: profile.email,
        user_id: profile.id,
    })
}

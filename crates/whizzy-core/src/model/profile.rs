use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, UserId};
use crate::error::{Field, Result, WhizzyError};

/// Number of avatar images bundled with the app.
pub const AVATAR_COUNT: u8 = 16;

/// Index into the fixed avatar image set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarIndex(u8);

impl AvatarIndex {
    /// # Errors
    ///
    /// Returns [`WhizzyError::AvatarOutOfRange`] when `raw` does not name one
    /// of the bundled images.
    pub fn new(raw: u32) -> Result<Self> {
        u8::try_from(raw)
            .ok()
            .filter(|index| *index < AVATAR_COUNT)
            .map(Self)
            .ok_or(WhizzyError::AvatarOutOfRange(raw))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Display name and avatar chosen during profile setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub avatar: AvatarIndex,
}

impl Identity {
    /// Validate profile-setup input. Both missing fields are reported together.
    ///
    /// # Errors
    ///
    /// Returns [`WhizzyError::MissingFields`] for a blank name and/or absent
    /// avatar, or [`WhizzyError::AvatarOutOfRange`].
    pub fn new(name: &str, avatar: Option<u32>) -> Result<Self> {
        let name = name.trim();
        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push(Field::Name);
        }
        if avatar.is_none() {
            missing.push(Field::Avatar);
        }
        match avatar {
            Some(raw) if missing.is_empty() => Ok(Self {
                name: name.to_string(),
                avatar: AvatarIndex::new(raw)?,
            }),
            _ => Err(WhizzyError::MissingFields(missing)),
        }
    }
}

/// A user's profile document after presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    /// Present only once profile setup stored both a name and an avatar.
    pub identity: Option<Identity>,
    pub group_id: Option<GroupId>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.identity.is_some()
    }

    /// Name to greet the user with; empty until setup completes.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.identity.as_ref().map_or("", |identity| identity.name.as_str())
    }

    #[must_use]
    pub fn avatar(&self) -> Option<AvatarIndex> {
        self.identity.as_ref().map(|identity| identity.avatar)
    }
}

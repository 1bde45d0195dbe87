//! Weekly points ranking.
//!
//! Points are a display placeholder: every member shows zero and nothing is
//! ever summed.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::groups::active_group;
use crate::model::UserId;
use crate::store::DocumentStore;

/// Face shown next to a member's points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Doubtful,
    Sad,
}

impl Mood {
    #[must_use]
    pub const fn from_points(points: u32) -> Self {
        if points >= 80 {
            Self::Happy
        } else if points >= 30 {
            Self::Doubtful
        } else {
            Self::Sad
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Happy => "Feliz",
            Self::Doubtful => "Dudoso",
            Self::Sad => "Triste",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub user_id: UserId,
    pub name: String,
    pub avatar: u8,
    pub points: u32,
    pub mood: Mood,
}

/// Members of the user's current group, highest points first.
///
/// Members without a profile document are skipped.
///
/// # Errors
///
/// Same as [`active_group`].
pub fn ranking<S: DocumentStore + ?Sized>(store: &S, user: &UserId) -> Result<Vec<RankingEntry>> {
    let group = active_group(store, user)?;
    let mut entries = Vec::with_capacity(group.members.len());
    for member in &group.members {
        let Some(profile) = store.get_profile(member)? else {
            debug!(member = %member, "member has no profile; skipped");
            continue;
        };
        let points = 0;
        entries.push(RankingEntry {
            name: profile.display_name().to_string(),
            avatar: profile.avatar().map_or(0, |avatar| avatar.get()),
            user_id: profile.id,
            points,
            mood: Mood::from_points(points),
        });
    }
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    Ok(entries)
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::{GroupId, ScheduledTask, UserId, Weekday};

/// Display name for groups that were never named.
pub const UNNAMED_GROUP: &str = "Grupo sin nombre";

/// Configuration fields a group needs before it is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Name,
    WeekStart,
    Tasks,
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::WeekStart => "week_start",
            Self::Tasks => "tasks",
        })
    }
}

/// A household shared by its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub creator_id: UserId,
    pub name: Option<String>,
    pub members: Vec<UserId>,
    pub invite_code: String,
    pub week_start: Option<Weekday>,
    pub tasks: Vec<ScheduledTask>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Group {
    /// Fields still missing, in configuration order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<GroupField> {
        let mut missing = Vec::new();
        if self.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
            missing.push(GroupField::Name);
        }
        if self.week_start.is_none() {
            missing.push(GroupField::WeekStart);
        }
        if self.tasks.is_empty() {
            missing.push(GroupField::Tasks);
        }
        missing
    }

    /// A group is complete once it has a name, a week-start day and at
    /// least one scheduled task.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    #[must_use]
    pub fn has_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNNAMED_GROUP)
    }
}

#[cfg(test)]
mod tests {
    use super::{Group, GroupField, UNNAMED_GROUP};
    use crate::model::{GroupId, ScheduledTask, UserId, Weekday};

    fn bare_group() -> Group {
        Group {
            id: GroupId::new("g1"),
            creator_id: UserId::new("u1"),
            name: None,
            members: vec![UserId::new("u1")],
            invite_code: "abc123".to_string(),
            week_start: None,
            tasks: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn fresh_group_is_missing_everything() {
        let group = bare_group();
        assert_eq!(
            group.missing_fields(),
            vec![GroupField::Name, GroupField::WeekStart, GroupField::Tasks]
        );
        assert!(!group.is_complete());
        assert_eq!(group.display_name(), UNNAMED_GROUP);
    }

    #[test]
    fn blank_name_counts_as_missing() {
        let mut group = bare_group();
        group.name = Some("   ".to_string());
        assert!(group.missing_fields().contains(&GroupField::Name));
        assert_eq!(group.display_name(), UNNAMED_GROUP);
    }

    #[test]
    fn configured_group_is_complete() {
        let mut group = bare_group();
        group.name = Some("Casa Ana".to_string());
        group.week_start = Some(Weekday::Monday);
        group.tasks.push(ScheduledTask {
            id: "1".into(),
            title: "Fregar los platos".into(),
            points: 15,
            day: "Lunes".into(),
        });
        assert!(group.is_complete());
        assert_eq!(group.display_name(), "Casa Ana");
        assert!(group.has_member(&UserId::new("u1")));
        assert!(!group.has_member(&UserId::new("u2")));
    }
}

//! Stored document shapes and their conversion into domain values.
//!
//! Field names match the hosted store's collections so documents stay
//! interchangeable with other clients. Everything is optional on the wire;
//! presence is decided here, once, by [`ProfileDocument::into_profile`] and
//! [`GroupDocument::into_group`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::{GroupPatch, NewGroup, ProfileFields};
use crate::model::{AvatarIndex, Group, GroupId, Identity, Profile, ScheduledTask, UserId, Weekday};

/// The two document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profiles,
    Groups,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profiles => "usuarios",
            Self::Groups => "grupos",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document in `usuarios`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_index: Option<i64>,
    #[serde(rename = "grupoId", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileDocument {
    /// Merge the set fields of `fields` into this document.
    pub fn merge(&mut self, fields: &ProfileFields) {
        if let Some(email) = &fields.email {
            self.email = Some(email.clone());
        }
        if let Some(identity) = &fields.identity {
            self.name = Some(identity.name.clone());
            self.avatar_index = Some(i64::from(identity.avatar.get()));
        }
        if let Some(created_at) = fields.created_at {
            self.created_at = Some(created_at);
        }
    }

    #[must_use]
    pub fn into_profile(self, id: UserId) -> Profile {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let identity = match (name, self.avatar_index) {
            (Some(name), Some(raw)) => {
                let avatar = u32::try_from(raw).ok().and_then(|raw| AvatarIndex::new(raw).ok());
                if avatar.is_none() {
                    warn!(user = %id, avatar_index = raw, "ignoring out-of-range avatar index");
                }
                avatar.map(|avatar| Identity {
                    name: name.to_string(),
                    avatar,
                })
            }
            _ => None,
        };

        Profile {
            identity,
            email: self.email.unwrap_or_default(),
            group_id: self
                .group_id
                .filter(|group| !group.is_empty())
                .map(GroupId::from),
            created_at: self.created_at,
            id,
        }
    }
}

/// A document in `grupos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDocument {
    #[serde(rename = "creadorId", default)]
    pub creator_id: String,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "miembros", default)]
    pub members: Vec<String>,
    #[serde(rename = "codigoInvitacion", default)]
    pub invite_code: String,
    #[serde(rename = "inicioSemana", default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
    #[serde(rename = "tareas", default)]
    pub tasks: Vec<ScheduledTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&NewGroup> for GroupDocument {
    fn from(group: &NewGroup) -> Self {
        let mut members: Vec<String> = Vec::with_capacity(group.members.len());
        for member in &group.members {
            if !members.iter().any(|existing| existing == member.as_str()) {
                members.push(member.to_string());
            }
        }
        Self {
            creator_id: group.creator_id.to_string(),
            name: group.name.clone(),
            members,
            invite_code: group.invite_code.clone(),
            week_start: None,
            tasks: Vec::new(),
            created_at: Some(group.created_at),
        }
    }
}

impl GroupDocument {
    /// Apply a field-level update. Members are merged as a set.
    pub fn apply(&mut self, patch: &GroupPatch) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(day) = patch.week_start {
            self.week_start = Some(day.as_str().to_string());
        }
        if let Some(code) = &patch.invite_code {
            self.invite_code.clone_from(code);
        }
        if let Some(tasks) = &patch.tasks {
            self.tasks.clone_from(tasks);
        }
        for member in &patch.add_members {
            if !self.members.iter().any(|existing| existing == member.as_str()) {
                self.members.push(member.to_string());
            }
        }
    }

    #[must_use]
    pub fn into_group(self, id: GroupId) -> Group {
        let week_start = self.week_start.as_deref().and_then(|raw| {
            let parsed = raw.parse::<Weekday>().ok();
            if parsed.is_none() {
                warn!(group = %id, week_start = raw, "ignoring unknown week-start day");
            }
            parsed
        });

        Group {
            creator_id: UserId::from(self.creator_id),
            name: self.name,
            members: self.members.into_iter().map(UserId::from).collect(),
            invite_code: self.invite_code,
            week_start,
            tasks: self.tasks,
            created_at: self.created_at,
            id,
        }
    }

    /// True when the member list contains `user`.
    #[must_use]
    pub fn has_member(&self, user: &UserId) -> bool {
        self.members.iter().any(|member| member == user.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{GroupDocument, ProfileDocument};
    use crate::model::{GroupId, Identity, ScheduledTask, UserId, Weekday};
    use crate::store::{GroupPatch, NewGroup, ProfileFields};
    use chrono::Utc;

    #[test]
    fn signup_document_has_no_identity() {
        let doc: ProfileDocument =
            serde_json::from_str(r#"{"email":"ana@example.com"}"#).unwrap();
        let profile = doc.into_profile(UserId::new("u1"));
        assert!(profile.identity.is_none());
        assert!(profile.group_id.is_none());
        assert_eq!(profile.email, "ana@example.com");
    }

    #[test]
    fn name_without_avatar_is_incomplete() {
        let doc: ProfileDocument = serde_json::from_str(r#"{"nombre":"Ana"}"#).unwrap();
        assert!(doc.into_profile(UserId::new("u1")).identity.is_none());
    }

    #[test]
    fn out_of_range_avatar_is_dropped() {
        let doc: ProfileDocument =
            serde_json::from_str(r#"{"nombre":"Ana","avatarIndex":40}"#).unwrap();
        assert!(doc.into_profile(UserId::new("u1")).identity.is_none());
    }

    #[test]
    fn empty_group_ref_reads_as_none() {
        let doc: ProfileDocument =
            serde_json::from_str(r#"{"nombre":"Ana","avatarIndex":2,"grupoId":""}"#).unwrap();
        let profile = doc.into_profile(UserId::new("u1"));
        assert!(profile.is_complete());
        assert!(profile.group_id.is_none());
    }

    #[test]
    fn merge_keeps_group_ref() {
        let mut doc = ProfileDocument {
            email: Some("ana@example.com".into()),
            group_id: Some("g1".into()),
            ..ProfileDocument::default()
        };
        doc.merge(&ProfileFields {
            identity: Some(Identity::new("Ana", Some(2)).unwrap()),
            ..ProfileFields::default()
        });
        assert_eq!(doc.name.as_deref(), Some("Ana"));
        assert_eq!(doc.avatar_index, Some(2));
        assert_eq!(doc.group_id.as_deref(), Some("g1"));
    }

    #[test]
    fn group_document_uses_stored_field_names() {
        let doc = GroupDocument::from(&NewGroup {
            creator_id: UserId::new("u1"),
            name: None,
            members: vec![UserId::new("u1")],
            invite_code: "k3x9qa".into(),
            created_at: Utc::now(),
        });
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["creadorId"], "u1");
        assert_eq!(value["miembros"][0], "u1");
        assert_eq!(value["codigoInvitacion"], "k3x9qa");
        assert!(value.get("nombre").is_none());
        assert!(value.get("inicioSemana").is_none());
        assert_eq!(value["tareas"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn patch_merges_members_as_a_set() {
        let mut doc = GroupDocument {
            members: vec!["u1".into()],
            ..GroupDocument::default()
        };
        doc.apply(&GroupPatch {
            add_members: vec![UserId::new("u2"), UserId::new("u1"), UserId::new("u2")],
            ..GroupPatch::default()
        });
        assert_eq!(doc.members, vec!["u1".to_string(), "u2".to_string()]);
    }

    #[test]
    fn patch_replaces_task_list_wholesale() {
        let old = ScheduledTask {
            id: "1".into(),
            title: "Fregar los platos".into(),
            points: 15,
            day: "Lunes".into(),
        };
        let new = ScheduledTask {
            id: "3".into(),
            title: "Poner la mesa".into(),
            points: 10,
            day: "Martes".into(),
        };
        let mut doc = GroupDocument {
            tasks: vec![old],
            ..GroupDocument::default()
        };
        doc.apply(&GroupPatch {
            tasks: Some(vec![new.clone()]),
            ..GroupPatch::default()
        });
        assert_eq!(doc.tasks, vec![new]);
    }

    #[test]
    fn unknown_week_start_reads_as_missing() {
        let doc = GroupDocument {
            name: Some("Casa".into()),
            week_start: Some("Lundi".into()),
            ..GroupDocument::default()
        };
        let group = doc.into_group(GroupId::new("g1"));
        assert!(group.week_start.is_none());

        let doc = GroupDocument {
            week_start: Some("Sábado".into()),
            ..GroupDocument::default()
        };
        assert_eq!(
            doc.into_group(GroupId::new("g2")).week_start,
            Some(Weekday::Saturday)
        );
    }
}

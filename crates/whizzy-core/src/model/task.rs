use serde::{Deserialize, Serialize};

use super::Weekday;

/// A chore from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogTask {
    pub id: &'static str,
    pub title: &'static str,
    pub points: u32,
}

impl CatalogTask {
    /// Stamp this chore with the day it is scheduled on.
    #[must_use]
    pub fn schedule(&self, day: Weekday) -> ScheduledTask {
        ScheduledTask {
            id: self.id.to_string(),
            title: self.title.to_string(),
            points: self.points,
            day: day.as_str().to_string(),
        }
    }
}

/// A chore stored in a group's task list.
///
/// `day` keeps the stamped weekday string exactly as stored so filtering
/// stays a plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub points: u32,
    #[serde(rename = "dia", default)]
    pub day: String,
}

#[cfg(test)]
mod tests {
    use super::{CatalogTask, ScheduledTask};
    use crate::model::Weekday;

    #[test]
    fn schedule_stamps_canonical_day_name() {
        let task = CatalogTask {
            id: "1",
            title: "Fregar los platos",
            points: 15,
        };
        let scheduled = task.schedule(Weekday::Wednesday);
        assert_eq!(scheduled.day, "Miércoles");
        assert_eq!(scheduled.points, 15);
    }

    #[test]
    fn stored_shape_uses_dia_key() {
        let json = r#"{"id":"3","title":"Poner la mesa","points":10,"dia":"Lunes"}"#;
        let task: ScheduledTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.day, "Lunes");
        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back["dia"], "Lunes");
    }
}

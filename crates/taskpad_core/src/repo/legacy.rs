//! Decoding of the legacy key-value task blob.
//!
//! The legacy representation is a JSON array of loosely typed records under
//! one key. Records may carry numeric ids, ISO-8601 or epoch timestamps and
//! omit fields added later (priority, category, due date, recurrence).

use crate::model::task::{EpochMs, Priority, Recurrence, Task, TaskId};
use crate::repo::task_gateway::LegacySkipReason;
use crate::schedule::parse_timestamp;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

/// Storage key of the legacy blob.
pub const LEGACY_TASKS_KEY: &str = "pwa-todo-tasks";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord {
    #[serde(default)]
    id: Value,
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    due_date: Option<LegacyTime>,
    #[serde(default)]
    recurrence: Option<Recurrence>,
    #[serde(default)]
    created_at: Option<LegacyTime>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyTime {
    Millis(i64),
    Text(String),
}

impl LegacyTime {
    /// Empty date inputs were stored as `""` and mean "no value".
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(value) if value.trim().is_empty())
    }

    fn to_epoch_ms(&self) -> Option<EpochMs> {
        match self {
            Self::Millis(value) => Some(*value),
            Self::Text(value) => parse_timestamp(value.trim()),
        }
    }
}

/// Decodes a legacy blob into validated tasks.
///
/// Ids that are not UUIDs (or repeat within the blob) are replaced with fresh
/// ones. Any undecodable entry rejects the whole blob.
pub(crate) fn decode_legacy_blob(blob: &str, now: EpochMs) -> Result<Vec<Task>, LegacySkipReason> {
    let value: Value =
        serde_json::from_str(blob).map_err(|_| LegacySkipReason::MalformedJson)?;
    let Value::Array(entries) = value else {
        return Err(LegacySkipReason::NotACollection);
    };

    let mut seen: HashSet<TaskId> = HashSet::with_capacity(entries.len());
    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let invalid = || LegacySkipReason::InvalidRecord { index };
        let record: LegacyRecord = serde_json::from_value(entry).map_err(|_| invalid())?;
        let task = record.into_task(now).ok_or_else(invalid)?;

        let task = if seen.insert(task.id) {
            task
        } else {
            let fresh = fresh_unseen_id(&seen);
            seen.insert(fresh);
            Task { id: fresh, ..task }
        };
        tasks.push(task);
    }
    Ok(tasks)
}

impl LegacyRecord {
    fn into_task(self, now: EpochMs) -> Option<Task> {
        let created_at = match present(&self.created_at) {
            Some(time) => time.to_epoch_ms()?,
            None => now,
        };
        let due_date = match present(&self.due_date) {
            Some(time) => Some(time.to_epoch_ms()?),
            None => None,
        };
        let category = self
            .category
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty());

        let task = Task {
            id: legacy_id(&self.id),
            text: self.text.trim().to_string(),
            completed: self.completed,
            priority: self.priority.unwrap_or_default(),
            category,
            due_date,
            recurrence: self.recurrence.unwrap_or_default(),
            created_at,
        };
        task.validate().ok()?;
        Some(task)
    }
}

fn present(time: &Option<LegacyTime>) -> Option<&LegacyTime> {
    time.as_ref().filter(|time| !time.is_blank())
}

fn legacy_id(value: &Value) -> TaskId {
    value
        .as_str()
        .and_then(|text| Uuid::parse_str(text).ok())
        .filter(|id| !id.is_nil())
        .unwrap_or_else(Uuid::new_v4)
}

fn fresh_unseen_id(seen: &HashSet<TaskId>) -> TaskId {
    loop {
        let id = Uuid::new_v4();
        if !seen.contains(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::decode_legacy_blob;
    use crate::model::task::{Priority, Recurrence};
    use crate::repo::task_gateway::LegacySkipReason;

    #[test]
    fn decodes_original_minimal_records() {
        let blob = r#"[
            {"id": 1706659200000, "text": " first ", "completed": true, "createdAt": "2024-01-31T00:00:00.000Z"},
            {"id": 1706659200001, "text": "second", "completed": false}
        ]"#;
        let tasks = decode_legacy_blob(blob, 42).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text, "first");
        assert!(tasks[0].completed);
        assert_eq!(tasks[0].created_at, 1_706_659_200_000);
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert_eq!(tasks[0].recurrence, Recurrence::None);
        assert_eq!(tasks[1].created_at, 42);
        assert_ne!(tasks[0].id, tasks[1].id);
    }

    #[test]
    fn keeps_uuid_ids_and_replaces_duplicates() {
        let blob = r#"[
            {"id": "11111111-2222-4333-8444-555555555555", "text": "a"},
            {"id": "11111111-2222-4333-8444-555555555555", "text": "b"}
        ]"#;
        let tasks = decode_legacy_blob(blob, 0).unwrap();
        assert_eq!(tasks[0].id.to_string(), "11111111-2222-4333-8444-555555555555");
        assert_ne!(tasks[1].id, tasks[0].id);
    }

    #[test]
    fn blank_date_strings_mean_absent() {
        let blob = r#"[
            {"id": 1, "text": "keep me", "dueDate": ""},
            {"id": 2, "text": "and me", "dueDate": "  ", "createdAt": ""}
        ]"#;
        let tasks = decode_legacy_blob(blob, 77).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].due_date, None);
        assert_eq!(tasks[1].due_date, None);
        assert_eq!(tasks[1].created_at, 77);
    }

    #[test]
    fn unparsable_date_strings_still_reject_the_blob() {
        assert_eq!(
            decode_legacy_blob(r#"[{"text": "a", "dueDate": "someday"}]"#, 0).unwrap_err(),
            LegacySkipReason::InvalidRecord { index: 0 }
        );
    }

    #[test]
    fn rejects_non_arrays_and_bad_entries() {
        assert_eq!(
            decode_legacy_blob(r#"{"text": "x"}"#, 0).unwrap_err(),
            LegacySkipReason::NotACollection
        );
        assert_eq!(
            decode_legacy_blob("not json", 0).unwrap_err(),
            LegacySkipReason::MalformedJson
        );
        assert_eq!(
            decode_legacy_blob(r#"[{"text": "ok"}, {"text": "   "}]"#, 0).unwrap_err(),
            LegacySkipReason::InvalidRecord { index: 1 }
        );
    }
}

//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted by gateways.
//! - Define the draft/category inputs accepted by the store `add` path.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `text` is non-empty after trimming.
//! - `category`, when set, is non-empty after trimming.
//! - Timestamps are Unix epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// Task importance used by priority sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: high=3, medium=2, low=1.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Rule deciding whether completing a task spawns a successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn is_recurring(self) -> bool {
        self != Self::None
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Validation failures for task records and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task id is the nil UUID.
    NilId,
    /// Text is empty after trimming.
    EmptyText,
    /// Category was set (or requested as custom) but is blank.
    EmptyCategory,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyText => write!(f, "task text must not be blank"),
            Self::EmptyCategory => write!(f, "task category must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// Serialized as a flat camelCase record; this is also the shape of legacy
/// blobs, so field names must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: Option<String>,
    /// Deadline in epoch milliseconds.
    pub due_date: Option<EpochMs>,
    pub recurrence: Recurrence,
    /// Creation time in epoch milliseconds. Immutable after creation.
    pub created_at: EpochMs,
}

impl Task {
    /// Creates an active task with default priority and no schedule.
    pub fn new(id: TaskId, text: impl Into<String>, created_at: EpochMs) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            priority: Priority::default(),
            category: None,
            due_date: None,
            recurrence: Recurrence::None,
            created_at,
        }
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `NilId` for a nil UUID.
    /// - `EmptyText` when `text` is blank.
    /// - `EmptyCategory` when `category` is `Some` but blank.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        if self
            .category
            .as_deref()
            .is_some_and(|label| label.trim().is_empty())
        {
            return Err(TaskValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Builds the successor for a completed recurring task.
    ///
    /// Everything is copied except id, completion flag, creation time and the
    /// due date, which the caller has already advanced.
    pub fn successor(&self, id: TaskId, created_at: EpochMs, due_date: EpochMs) -> Self {
        Self {
            id,
            completed: false,
            created_at,
            due_date: Some(due_date),
            ..self.clone()
        }
    }
}

/// Category requested by the add form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryChoice {
    #[default]
    None,
    /// One of the preset labels offered by the UI.
    Preset(String),
    /// Free-form label typed by the user.
    Custom(String),
}

impl CategoryChoice {
    /// Resolves the choice into a stored category label.
    ///
    /// A blank custom label is a validation error; a blank preset is treated
    /// as uncategorized.
    pub fn resolve(&self) -> Result<Option<String>, TaskValidationError> {
        match self {
            Self::None => Ok(None),
            Self::Preset(label) => {
                let trimmed = label.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Self::Custom(label) => {
                let trimmed = label.trim();
                if trimmed.is_empty() {
                    return Err(TaskValidationError::EmptyCategory);
                }
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

/// User input for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub priority: Priority,
    pub category: CategoryChoice,
    pub due_date: Option<EpochMs>,
    pub recurrence: Recurrence,
}

impl TaskDraft {
    /// Creates a draft with default priority and no category/schedule.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: CategoryChoice) -> Self {
        self.category = category;
        self
    }

    pub fn with_due_date(mut self, due_date: EpochMs) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Trims and validates the draft into a task for the given identity.
    ///
    /// # Errors
    /// - `EmptyText` when text is blank after trimming.
    /// - `EmptyCategory` when a custom category is blank after trimming.
    pub fn into_task(
        self,
        id: TaskId,
        created_at: EpochMs,
    ) -> Result<Task, TaskValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        let category = self.category.resolve()?;

        let task = Task {
            id,
            text: text.to_string(),
            completed: false,
            priority: self.priority,
            category,
            due_date: self.due_date,
            recurrence: self.recurrence,
            created_at,
        };
        task.validate()?;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryChoice, Priority, Task, TaskDraft, TaskValidationError};
    use uuid::Uuid;

    #[test]
    fn draft_trims_text_and_custom_category() {
        let task = TaskDraft::new("  buy milk  ")
            .with_category(CategoryChoice::Custom("  Errands ".to_string()))
            .into_task(Uuid::new_v4(), 10)
            .unwrap();
        assert_eq!(task.text, "buy milk");
        assert_eq!(task.category.as_deref(), Some("Errands"));
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn blank_custom_category_is_rejected_but_blank_preset_is_uncategorized() {
        let err = TaskDraft::new("x")
            .with_category(CategoryChoice::Custom("   ".to_string()))
            .into_task(Uuid::new_v4(), 0)
            .unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyCategory);

        let task = TaskDraft::new("x")
            .with_category(CategoryChoice::Preset(String::new()))
            .into_task(Uuid::new_v4(), 0)
            .unwrap();
        assert_eq!(task.category, None);
    }

    #[test]
    fn successor_resets_identity_and_completion_only() {
        let mut task = Task::new(Uuid::new_v4(), "water plants", 100);
        task.completed = true;
        task.category = Some("Home".to_string());
        task.due_date = Some(1_000);

        let next_id = Uuid::new_v4();
        let next = task.successor(next_id, 200, 2_000);
        assert_eq!(next.id, next_id);
        assert!(!next.completed);
        assert_eq!(next.created_at, 200);
        assert_eq!(next.due_date, Some(2_000));
        assert_eq!(next.category, task.category);
        assert_eq!(next.text, task.text);
    }

    #[test]
    fn priority_rank_orders_high_above_low() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }
}

//! Pure derivation of the display projection.
//!
//! # Responsibility
//! - Filter by category, sort by the active mode, annotate overdue state and
//!   due-date labels, and summarize counts.
//!
//! # Invariants
//! - Functions never mutate their inputs.
//! - Sorting is stable; equal keys keep input order.
//! - Overdue state is evaluated against the supplied `now` on every call.

use crate::model::task::{EpochMs, Task};
use crate::schedule::{format_due_date, Clock, SystemClock};
use std::cmp::{Ordering, Reverse};

/// Sentinel value for "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Active category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact, case-sensitive category label.
    Label(String),
}

impl CategoryFilter {
    /// Parses a UI select value; `"all"` is the sentinel.
    pub fn from_value(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Label(value.to_string())
        }
    }

    pub fn as_value(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Label(label) => label.as_str(),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Label(label) => task.category.as_deref() == Some(label.as_str()),
        }
    }
}

/// Display ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Newest first.
    #[default]
    DateAdded,
    /// Highest priority first, then newest.
    Priority,
    /// Overdue first, then earliest due date, undated last.
    DueDate,
}

impl SortMode {
    /// Next mode in the sort toggle cycle.
    pub fn next(self) -> Self {
        match self {
            Self::DateAdded => Self::Priority,
            Self::Priority => Self::DueDate,
            Self::DueDate => Self::DateAdded,
        }
    }

    /// Label for the sort toggle.
    pub fn label(self) -> &'static str {
        match self {
            Self::DateAdded => "Sort by Date Added",
            Self::Priority => "Sort by Priority",
            Self::DueDate => "Sort by Due Date",
        }
    }

    pub fn as_value(self) -> &'static str {
        match self {
            Self::DateAdded => "dateAdded",
            Self::Priority => "priority",
            Self::DueDate => "dueDate",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "dateAdded" => Some(Self::DateAdded),
            "priority" => Some(Self::Priority),
            "dueDate" => Some(Self::DueDate),
            _ => None,
        }
    }
}

/// UI-owned view settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSettings {
    pub category_filter: CategoryFilter,
    pub sort_mode: SortMode,
}

/// Why the projected list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The store holds no tasks at all.
    NoTasks,
    /// Tasks exist, but none match the active filter.
    NoMatches,
}

/// Counts for the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
    /// Incomplete tasks in the filtered set.
    pub active: usize,
    /// All tasks in the filtered set.
    pub total: usize,
    pub empty: Option<EmptyState>,
}

impl TaskSummary {
    /// `"{active} of {total} task(s)"`.
    pub fn count_label(&self) -> String {
        let noun = if self.total == 1 { "task" } else { "tasks" };
        format!("{} of {} {noun}", self.active, self.total)
    }
}

/// One annotated row of the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskViewItem {
    pub task: Task,
    pub overdue: bool,
    pub due_label: Option<String>,
}

/// Filtered, sorted, annotated projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub items: Vec<TaskViewItem>,
    pub summary: TaskSummary,
    pub settings: ViewSettings,
}

/// Keeps tasks matching `filter`, preserving input order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &CategoryFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Returns a sorted copy of `tasks`.
pub fn sort_tasks<'a>(tasks: &[&'a Task], mode: SortMode, now: EpochMs) -> Vec<&'a Task> {
    let mut sorted = tasks.to_vec();
    match mode {
        SortMode::DateAdded => sorted.sort_by_key(|task| Reverse(task.created_at)),
        SortMode::Priority => sorted.sort_by(|a, b| {
            b.priority
                .rank()
                .cmp(&a.priority.rank())
                .then_with(|| newest_first(a, b))
        }),
        SortMode::DueDate => sorted.sort_by(|a, b| {
            let overdue_first = is_overdue_at(b, now).cmp(&is_overdue_at(a, now));
            overdue_first
                .then_with(|| due_ascending(a.due_date, b.due_date))
                .then_with(|| newest_first(a, b))
        }),
    }
    sorted
}

/// Whether `task` is incomplete and its due date is strictly before `now`.
pub fn is_overdue_at(task: &Task, now: EpochMs) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < now)
}

/// `is_overdue_at` against the system clock.
pub fn is_overdue(task: &Task) -> bool {
    is_overdue_at(task, SystemClock.now_ms())
}

/// Summarizes the filtered set; `store_total` distinguishes the empty states.
pub fn summarize(filtered: &[&Task], store_total: usize) -> TaskSummary {
    let total = filtered.len();
    let active = filtered.iter().filter(|task| !task.completed).count();
    let empty = match (total, store_total) {
        (0, 0) => Some(EmptyState::NoTasks),
        (0, _) => Some(EmptyState::NoMatches),
        _ => None,
    };
    TaskSummary {
        active,
        total,
        empty,
    }
}

/// Builds the full display projection for `settings` at `now`.
pub fn project(tasks: &[Task], settings: &ViewSettings, now: EpochMs) -> TaskView {
    let filtered = filter_tasks(tasks, &settings.category_filter);
    let summary = summarize(&filtered, tasks.len());
    let items = sort_tasks(&filtered, settings.sort_mode, now)
        .into_iter()
        .map(|task| TaskViewItem {
            task: task.clone(),
            overdue: is_overdue_at(task, now),
            due_label: format_due_date(task.due_date),
        })
        .collect();

    TaskView {
        items,
        summary,
        settings: settings.clone(),
    }
}

fn newest_first(a: &Task, b: &Task) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

fn due_ascending(a: Option<EpochMs>, b: Option<EpochMs>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

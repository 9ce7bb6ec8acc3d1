//! Task store: canonical collection and its command/query surface.
//!
//! # Responsibility
//! - Own the in-memory task collection and every mutation of it.
//! - Persist the full collection through a `TaskGateway` after each mutation.
//! - Track view settings and the derived category index.
//!
//! # Invariants
//! - Task ids are unique across the live collection.
//! - Canonical order is insertion order; display order is a view concern.
//! - A mutation is persisted before the mutating call returns, so no two
//!   persists are ever in flight.
//! - Storage failures are logged and recorded, never rolled back and never
//!   propagated as panics.

use crate::model::task::{EpochMs, Task, TaskDraft, TaskId, TaskValidationError};
use crate::repo::task_gateway::{MigrationOutcome, StorageError, TaskGateway};
use crate::schedule::{next_due_date, Clock, SystemClock};
use crate::view::category::CategoryIndex;
use crate::view::engine::{project, CategoryFilter, SortMode, TaskView, ViewSettings};
use log::{debug, error, info, warn};
use uuid::Uuid;

/// Preset category labels offered regardless of usage.
pub const DEFAULT_PRESET_CATEGORIES: [&str; 3] = ["Work", "Personal", "Shopping"];

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStoreConfig {
    /// Labels always present in the category index, in display order.
    pub preset_categories: Vec<String>,
}

impl Default for TaskStoreConfig {
    fn default() -> Self {
        Self {
            preset_categories: DEFAULT_PRESET_CATEGORIES
                .iter()
                .map(|label| label.to_string())
                .collect(),
        }
    }
}

/// Change notification for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Added(TaskId),
    Changed(TaskId),
    Removed(TaskId),
}

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Toggled task after the flip.
    pub task: Task,
    /// Successor appended for a completed recurring task.
    pub successor: Option<Task>,
}

/// Owned task collection bound to one gateway and clock.
pub struct TaskStore<G: TaskGateway, C: Clock = SystemClock> {
    gateway: G,
    clock: C,
    config: TaskStoreConfig,
    tasks: Vec<Task>,
    categories: CategoryIndex,
    settings: ViewSettings,
    events: Vec<StoreEvent>,
    migration: Option<MigrationOutcome>,
    last_storage_error: Option<StorageError>,
}

impl<G: TaskGateway> TaskStore<G> {
    /// Loads a store with the system clock and default presets.
    pub fn load(gateway: G) -> Self {
        Self::load_with(gateway, SystemClock, TaskStoreConfig::default())
    }
}

impl<G: TaskGateway, C: Clock> TaskStore<G, C> {
    /// Opens the gateway, imports legacy data and loads the collection.
    ///
    /// Never fails: storage problems are logged, recorded in
    /// `last_storage_error()`, and the store starts empty.
    pub fn load_with(gateway: G, clock: C, config: TaskStoreConfig) -> Self {
        let mut store = Self {
            gateway,
            clock,
            config,
            tasks: Vec::new(),
            categories: CategoryIndex::default(),
            settings: ViewSettings::default(),
            events: Vec::new(),
            migration: None,
            last_storage_error: None,
        };
        store.bootstrap();
        store.refresh_categories();
        store
    }

    fn bootstrap(&mut self) {
        if let Err(err) = self.gateway.open() {
            self.record_storage_error("store_open", err);
            return;
        }

        match self.gateway.migrate_legacy(self.clock.now_ms()) {
            Ok(outcome) => self.migration = Some(outcome),
            Err(err) => self.record_storage_error("legacy_migrate", err),
        }

        match self.gateway.load_all() {
            Ok(tasks) => {
                info!(
                    "event=store_load module=store status=ok count={}",
                    tasks.len()
                );
                self.tasks = tasks;
            }
            Err(err) => self.record_storage_error("store_load", err),
        }
    }

    /// Adds a task from user input.
    ///
    /// # Errors
    /// Returns the validation error and leaves the collection untouched when
    /// the text is blank or a custom category is blank.
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, TaskValidationError> {
        let task = match draft.into_task(self.fresh_id(), self.clock.now_ms()) {
            Ok(task) => task,
            Err(err) => {
                debug!("event=task_add module=store status=rejected reason={err}");
                return Err(err);
            }
        };

        self.tasks.push(task.clone());
        self.events.push(StoreEvent::Added(task.id));
        self.refresh_categories();
        self.persist("task_add");
        info!("event=task_add module=store status=ok task_id={}", task.id);
        Ok(task)
    }

    /// Flips the completion flag of `id`; `None` when no such task exists.
    ///
    /// Completing a recurring task that has a due date appends exactly one
    /// successor. Un-completing never spawns.
    pub fn toggle(&mut self, id: TaskId) -> Option<ToggleOutcome> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let task = task.clone();
        self.events.push(StoreEvent::Changed(id));

        let successor = self.successor_for(&task);
        if let Some(next) = &successor {
            self.tasks.push(next.clone());
            self.events.push(StoreEvent::Added(next.id));
        }

        self.persist("task_toggle");
        info!(
            "event=task_toggle module=store status=ok task_id={id} completed={} successor={}",
            task.completed,
            successor
                .as_ref()
                .map_or_else(|| "none".to_string(), |next| next.id.to_string())
        );
        Some(ToggleOutcome { task, successor })
    }

    /// Removes the task `id`; `None` (and no persist) when absent.
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        self.events.push(StoreEvent::Removed(id));
        self.refresh_categories();
        self.persist("task_delete");
        info!("event=task_delete module=store status=ok task_id={id}");
        Some(removed)
    }

    /// Whether any task is completed; gates the clear-completed confirmation.
    pub fn has_completed(&self) -> bool {
        self.tasks.iter().any(|task| task.completed)
    }

    /// Removes every completed task and returns them.
    ///
    /// No-op without persisting when nothing is completed. Callers confirm
    /// with the user before invoking this.
    pub fn clear_completed(&mut self) -> Vec<Task> {
        if !self.has_completed() {
            return Vec::new();
        }

        let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.completed);
        self.tasks = kept;
        self.events
            .extend(removed.iter().map(|task| StoreEvent::Removed(task.id)));
        self.refresh_categories();
        self.persist("tasks_clear_completed");
        info!(
            "event=tasks_clear_completed module=store status=ok removed={}",
            removed.len()
        );
        removed
    }

    /// Category labels for filter options: presets, then dynamic labels.
    pub fn categories(&self) -> &[String] {
        self.categories.labels()
    }

    /// Sets the category filter; unknown labels fall back to `All`.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.settings.category_filter = self.categories.resolve(&filter);
    }

    pub fn set_sort(&mut self, mode: SortMode) {
        self.settings.sort_mode = mode;
    }

    /// Advances to the next sort mode and returns it.
    pub fn cycle_sort(&mut self) -> SortMode {
        self.settings.sort_mode = self.settings.sort_mode.next();
        self.settings.sort_mode
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    /// Current projection evaluated at the store clock's "now".
    pub fn view(&self) -> TaskView {
        self.view_at(self.clock.now_ms())
    }

    pub fn view_at(&self, now: EpochMs) -> TaskView {
        project(&self.tasks, &self.settings, now)
    }

    /// Canonical collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Takes pending change notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Most recent storage failure; cleared by the next successful write.
    pub fn last_storage_error(&self) -> Option<&StorageError> {
        self.last_storage_error.as_ref()
    }

    /// Legacy import result from startup, if the gateway was reachable.
    pub fn migration_outcome(&self) -> Option<&MigrationOutcome> {
        self.migration.as_ref()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    fn successor_for(&self, task: &Task) -> Option<Task> {
        if !task.completed || !task.recurrence.is_recurring() {
            return None;
        }
        let next_due = next_due_date(task.due_date?, task.recurrence)?;
        Some(task.successor(self.fresh_id(), self.clock.now_ms(), next_due))
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn fresh_id(&self) -> TaskId {
        loop {
            let id = Uuid::new_v4();
            if self.position(id).is_none() {
                return id;
            }
        }
    }

    fn refresh_categories(&mut self) {
        self.categories = CategoryIndex::build(&self.config.preset_categories, &self.tasks);
        self.settings.category_filter = self.categories.resolve(&self.settings.category_filter);
    }

    fn persist(&mut self, operation: &str) {
        match self.gateway.save_all(&self.tasks) {
            Ok(()) => self.last_storage_error = None,
            Err(err) => self.record_storage_error(operation, err),
        }
    }

    fn record_storage_error(&mut self, operation: &str, err: StorageError) {
        if matches!(err, StorageError::Write(_)) {
            warn!(
                "event={operation} module=store status=error error_code={} error={err} in_memory_count={}",
                err.code(),
                self.tasks.len()
            );
        } else {
            error!(
                "event={operation} module=store status=error error_code={} error={err}",
                err.code()
            );
        }
        self.last_storage_error = Some(err);
    }
}

use taskpad_core::{Priority, Recurrence, Task, TaskValidationError};
use uuid::Uuid;

#[test]
fn task_new_sets_defaults() {
    let task = Task::new(Uuid::new_v4(), "hello", 42);

    assert!(!task.id.is_nil());
    assert_eq!(task.text, "hello");
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.category, None);
    assert_eq!(task.due_date, None);
    assert_eq!(task.recurrence, Recurrence::None);
    assert_eq!(task.created_at, 42);
    assert!(task.validate().is_ok());
}

#[test]
fn task_serialization_uses_flat_camel_case_record() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut task = Task::new(id, "ship release", 1_700_000_000_000);
    task.priority = Priority::High;
    task.category = Some("Work".to_string());
    task.due_date = Some(1_700_086_400_000);
    task.recurrence = Recurrence::Monthly;

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["text"], "ship release");
    assert_eq!(json["completed"], false);
    assert_eq!(json["priority"], "high");
    assert_eq!(json["category"], "Work");
    assert_eq!(json["dueDate"], 1_700_086_400_000_i64);
    assert_eq!(json["recurrence"], "monthly");
    assert_eq!(json["createdAt"], 1_700_000_000_000_i64);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn absent_optional_fields_serialize_as_null() {
    let task = Task::new(Uuid::new_v4(), "plain", 0);
    let json = serde_json::to_value(&task).unwrap();
    assert!(json["category"].is_null());
    assert!(json["dueDate"].is_null());
}

#[test]
fn validate_rejects_broken_records() {
    let nil = Task::new(Uuid::nil(), "x", 0);
    assert_eq!(nil.validate().unwrap_err(), TaskValidationError::NilId);

    let blank = Task::new(Uuid::new_v4(), " \n ", 0);
    assert_eq!(blank.validate().unwrap_err(), TaskValidationError::EmptyText);

    let mut empty_category = Task::new(Uuid::new_v4(), "x", 0);
    empty_category.category = Some(String::new());
    assert_eq!(
        empty_category.validate().unwrap_err(),
        TaskValidationError::EmptyCategory
    );
}

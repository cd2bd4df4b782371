//! Standard test fixtures for consistent testing
//!
//! Provides pre-built test data including:
//! - The two-task shopping/report scenario
//! - Mixed pending/done sets
//! - Titles that would break string-built statements

use todo_core::{NewTodo, Todo};

/// Create a basic pending todo
pub fn create_test_todo() -> Todo {
    Todo::new(1, "buy milk")
}

/// Create the standard creation payload
pub fn create_new_todo() -> NewTodo {
    NewTodo::new(1, "buy milk")
}

/// Create multiple unique todos, every third one done
pub fn create_test_todos(count: usize) -> Vec<Todo> {
    (1..=count)
        .map(|i| Todo {
            id: i as i64,
            title: format!("Test todo {i}"),
            done: i % 3 == 0,
        })
        .collect()
}

/// One pending and one done todo
pub fn create_mixed_todos() -> Vec<Todo> {
    vec![
        Todo::new(1, "buy milk"),
        Todo::new(2, "write report").toggled(),
    ]
}

/// Titles containing quoting and statement separators
pub fn hostile_titles() -> Vec<&'static str> {
    vec![
        "it's done",
        "say \"hello\"",
        "x'); DROP TABLE todos; --",
        "100% ; DELETE FROM todos",
        "back\\slash",
        "émoji ✓ and ünïcode",
    ]
}

//! Custom assertion helpers for testing
//!
//! Provides specialized assertions for:
//! - Order-independent comparison of list results
//! - Decode failures inside list results

use std::collections::BTreeMap;
use todo_core::{RowResult, Todo, TodoId};

/// Decoded records of a list result, panicking on any decode failure
pub fn decoded(rows: Vec<RowResult>) -> Vec<Todo> {
    rows.into_iter()
        .map(|row| row.unwrap_or_else(|e| panic!("Unexpected decode failure: {e}")))
        .collect()
}

/// Index records by id; list order is not guaranteed
pub fn by_id(todos: &[Todo]) -> BTreeMap<TodoId, Todo> {
    todos.iter().map(|t| (t.id, t.clone())).collect()
}

/// Assert two record sets are equal ignoring order
pub fn assert_same_todos(actual: &[Todo], expected: &[Todo]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Record counts differ: {actual:?} vs {expected:?}"
    );
    assert_eq!(by_id(actual), by_id(expected), "Record sets differ");
}

/// Assert the list contains exactly one record with this id and return it
pub fn assert_single_with_id(todos: &[Todo], id: TodoId) -> Todo {
    let matches: Vec<&Todo> = todos.iter().filter(|t| t.id == id).collect();
    assert_eq!(
        matches.len(),
        1,
        "Expected exactly one record with id {id}, found {}: {todos:?}",
        matches.len()
    );
    matches[0].clone()
}

/// Assert the list holds no record with this id
pub fn assert_absent(todos: &[Todo], id: TodoId) {
    assert!(
        todos.iter().all(|t| t.id != id),
        "Expected no record with id {id}, found: {todos:?}"
    );
}

/// Count decode failures in a list result
pub fn decode_failures(rows: &[RowResult]) -> usize {
    rows.iter().filter(|row| row.is_err()).count()
}

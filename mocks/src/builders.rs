//! Builder pattern implementations for easy test data construction
//!
//! Provides fluent builders for:
//! - Todo construction with sensible defaults
//! - NewTodo payloads

use todo_core::{NewTodo, Todo, TodoId};

/// Builder for constructing Todo instances in tests
pub struct TodoBuilder {
    todo: Todo,
}

impl Default for TodoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        Self {
            todo: Todo::new(1, "Test todo"),
        }
    }

    /// Set todo ID
    pub fn with_id(mut self, id: TodoId) -> Self {
        self.todo.id = id;
        self
    }

    /// Set todo title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.todo.title = title.into();
        self
    }

    /// Mark the todo as done
    pub fn done(mut self) -> Self {
        self.todo.done = true;
        self
    }

    /// Build the final Todo
    pub fn build(self) -> Todo {
        self.todo
    }
}

/// Builder for constructing NewTodo instances in tests
pub struct NewTodoBuilder {
    new_todo: NewTodo,
}

impl Default for NewTodoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewTodoBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        Self {
            new_todo: NewTodo::new(1, "New test todo"),
        }
    }

    /// Set id
    pub fn with_id(mut self, id: TodoId) -> Self {
        self.new_todo.id = id;
        self
    }

    /// Set title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.new_todo.title = title.into();
        self
    }

    /// Build the final NewTodo
    pub fn build(self) -> NewTodo {
        self.new_todo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_builder() {
        let todo = TodoBuilder::new().with_id(9).with_title("x").done().build();
        assert_eq!(todo, Todo { id: 9, title: "x".to_string(), done: true });
    }

    #[test]
    fn test_new_todo_builder_defaults() {
        let new_todo = NewTodoBuilder::new().with_id(3).build();
        assert_eq!(new_todo.id, 3);
        assert_eq!(new_todo.title, "New test todo");
    }
}

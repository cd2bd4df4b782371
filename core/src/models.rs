use serde::{Deserialize, Serialize};

/// Caller-chosen identifier of a todo record.
///
/// Ids are never generated by the store: the user picks one when adding a task,
/// and it is the only key accepted by toggle and delete.
pub type TodoId = i64;

/// A single todo record as stored in the `todos` table.
///
/// # Examples
///
/// ```rust
/// use todo_core::models::{ListFilter, Todo};
///
/// let todo = Todo::new(1, "buy milk");
/// assert!(!todo.done);
/// assert!(ListFilter::Pending.matches(&todo));
/// assert!(!ListFilter::Done.matches(&todo));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Todo {
    /// Unique, caller-supplied key
    pub id: TodoId,
    /// Free-form label, immutable after creation
    pub title: String,
    /// Completion flag, flipped by toggle
    pub done: bool,
}

impl Todo {
    /// Create a pending todo, the shape every record has right after creation
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
        }
    }

    /// Return a copy with `done` flipped
    pub fn toggled(&self) -> Self {
        Self {
            done: !self.done,
            ..self.clone()
        }
    }
}

/// Data transfer object for creating new todos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    pub id: TodoId,
    pub title: String,
}

impl NewTodo {
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

impl From<NewTodo> for Todo {
    fn from(new: NewTodo) -> Self {
        Todo::new(new.id, new.title)
    }
}

/// Selector narrowing a list operation.
///
/// Parsing is case-sensitive and total: `pending` and `done` select their
/// subsets, anything else (including `Done` or an empty string) means `All`.
#[derive(Debug, Clone, Copy, Default, Hash, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListFilter {
    #[default]
    All,
    Pending,
    Done,
}

impl ListFilter {
    /// Parse a filter token, falling back to `All` for unknown values
    pub fn parse(token: &str) -> Self {
        match token {
            "pending" => ListFilter::Pending,
            "done" => ListFilter::Done,
            _ => ListFilter::All,
        }
    }

    /// In-memory equivalent of the filter's `WHERE` clause
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Pending => !todo.done,
            ListFilter::Done => todo.done,
        }
    }

    /// Value of the `done` column selected by this filter, `None` for no clause
    pub fn done_value(&self) -> Option<bool> {
        match self {
            ListFilter::All => None,
            ListFilter::Pending => Some(false),
            ListFilter::Done => Some(true),
        }
    }
}

impl std::fmt::Display for ListFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListFilter::All => write!(f, "all"),
            ListFilter::Pending => write!(f, "pending"),
            ListFilter::Done => write!(f, "done"),
        }
    }
}

impl std::fmt::Display for Todo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = if self.done { 'x' } else { ' ' };
        write!(f, "[{mark}] {}  {}", self.id, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_todo_is_pending() {
        let todo = Todo::new(7, "water plants");
        assert_eq!(todo.id, 7);
        assert_eq!(todo.title, "water plants");
        assert!(!todo.done);

        let from_new: Todo = NewTodo::new(7, "water plants").into();
        assert_eq!(from_new, todo);
    }

    #[test]
    fn test_toggled_is_an_involution() {
        let todo = Todo::new(1, "a");
        assert!(todo.toggled().done);
        assert_eq!(todo.toggled().toggled(), todo);
    }

    #[test]
    fn test_filter_parsing_is_case_sensitive() {
        assert_eq!(ListFilter::parse("pending"), ListFilter::Pending);
        assert_eq!(ListFilter::parse("done"), ListFilter::Done);
        assert_eq!(ListFilter::parse("all"), ListFilter::All);
        assert_eq!(ListFilter::parse("Done"), ListFilter::All);
        assert_eq!(ListFilter::parse("PENDING"), ListFilter::All);
        assert_eq!(ListFilter::parse(""), ListFilter::All);
        assert_eq!(ListFilter::parse("whatever"), ListFilter::All);
    }

    #[test]
    fn test_filter_matches_partition() {
        let pending = Todo::new(1, "p");
        let done = Todo::new(2, "d").toggled();

        for todo in [&pending, &done] {
            assert!(ListFilter::All.matches(todo));
            assert_ne!(
                ListFilter::Pending.matches(todo),
                ListFilter::Done.matches(todo)
            );
        }
        assert_eq!(ListFilter::All.done_value(), None);
        assert_eq!(ListFilter::Pending.done_value(), Some(false));
        assert_eq!(ListFilter::Done.done_value(), Some(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(Todo::new(1, "buy milk").to_string(), "[ ] 1  buy milk");
        assert_eq!(
            Todo::new(2, "write report").toggled().to_string(),
            "[x] 2  write report"
        );
        assert_eq!(ListFilter::Pending.to_string(), "pending");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Todo::new(3, "x")).unwrap();
        assert_eq!(json, r#"{"id":3,"title":"x","done":false}"#);
        let filter: ListFilter = serde_json::from_str(r#""done""#).unwrap();
        assert_eq!(filter, ListFilter::Done);
    }
}

use async_trait::async_trait;
use tracing::debug;
use crate::{
    error::{DecodeError, Result, TodoError},
    models::{ListFilter, NewTodo, Todo, TodoId},
};

/// Outcome of decoding one row of a list result
pub type RowResult = std::result::Result<Todo, DecodeError>;

/// Gateway between the lifecycle operations and the persistent store.
///
/// Implementations own exactly one connection, acquired when they are
/// constructed and released by [`close`](TodoRepository::close). All values
/// reach the store as bound parameters.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert a new record with `done = false`
    ///
    /// # Returns
    /// * `Ok(Todo)` - The stored record
    /// * `Err(TodoError::Conflict)` - If a record with that id already exists; nothing is written
    /// * `Err(TodoError::Connection)` - If the store is unreachable or the connection was closed
    /// * `Err(TodoError::Database)` - If the statement fails for any other reason
    async fn create(&self, todo: NewTodo) -> Result<Todo>;

    /// List records matching the filter, in store-native order
    ///
    /// No ordering is guaranteed. Each element is either a decoded record or
    /// the decode failure for that row.
    ///
    /// # Returns
    /// * `Ok(Vec<RowResult>)` - One entry per row (may be empty)
    /// * `Err(TodoError::Connection)` - If the store is unreachable or the connection was closed
    async fn list(&self, filter: ListFilter) -> Result<Vec<RowResult>>;

    /// Flip `done` on a single record
    ///
    /// # Returns
    /// * `Ok(rows)` - Rows affected: 1 if the record exists, 0 otherwise
    async fn toggle(&self, id: TodoId) -> Result<u64>;

    /// Remove a single record
    ///
    /// # Returns
    /// * `Ok(rows)` - Rows affected: 1 if the record existed, 0 otherwise
    async fn delete(&self, id: TodoId) -> Result<u64>;

    /// Round-trip to the store to verify the connection is usable
    async fn health_check(&self) -> Result<()>;

    /// Release the connection
    ///
    /// # Returns
    /// * `Ok(true)` - The connection was open and has now been released
    /// * `Ok(false)` - The connection had already been released
    async fn close(&self) -> Result<bool>;

    /// Toggle every id in order, one independent statement per id
    async fn toggle_batch(&self, ids: &[TodoId]) -> BatchReport {
        let mut report = BatchReport::new(BatchKind::Toggle);
        for &id in ids {
            report.record(id, self.toggle(id).await);
        }
        debug!(kind = "toggle", ids = ids.len(), applied = report.applied_count(), "Batch finished");
        report
    }

    /// Delete every id in order, one independent statement per id
    async fn delete_batch(&self, ids: &[TodoId]) -> BatchReport {
        let mut report = BatchReport::new(BatchKind::Delete);
        for &id in ids {
            report.record(id, self.delete(id).await);
        }
        debug!(kind = "delete", ids = ids.len(), applied = report.applied_count(), "Batch finished");
        report
    }
}

/// Which per-id operation a batch ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Toggle,
    Delete,
}

impl BatchKind {
    /// Past-tense verb used when rendering an applied outcome
    pub fn verb(&self) -> &'static str {
        match self {
            BatchKind::Toggle => "toggled",
            BatchKind::Delete => "deleted",
        }
    }
}

/// Result of one id inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The statement affected the record
    Applied,
    /// No record with that id exists; not an error
    NotFound,
    /// The statement failed; the rest of the batch still ran
    Failed(TodoError),
}

impl ItemOutcome {
    /// Classify the result of a single-id primitive
    pub fn from_rows_affected(result: Result<u64>) -> Self {
        match result {
            Ok(0) => ItemOutcome::NotFound,
            Ok(_) => ItemOutcome::Applied,
            Err(e) => ItemOutcome::Failed(e),
        }
    }
}

/// Per-id outcomes of a batch, in the order the ids were given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub kind: BatchKind,
    pub outcomes: Vec<(TodoId, ItemOutcome)>,
}

impl BatchReport {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            outcomes: Vec::new(),
        }
    }

    /// Append the outcome of one id
    pub fn record(&mut self, id: TodoId, result: Result<u64>) {
        self.outcomes.push((id, ItemOutcome::from_rows_affected(result)));
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == ItemOutcome::Applied)
            .count()
    }

    /// Ids that matched no record
    pub fn not_found(&self) -> Vec<TodoId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == ItemOutcome::NotFound)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids whose statement failed, with the error
    pub fn failures(&self) -> Vec<(TodoId, &TodoError)> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                ItemOutcome::Failed(e) => Some((*id, e)),
                _ => None,
            })
            .collect()
    }

    /// Outcome of the first occurrence of `id`
    pub fn outcome_for(&self, id: TodoId) -> Option<&ItemOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, outcome)| outcome)
    }

    /// True when every id was applied
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| *outcome == ItemOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Minimal in-crate store used to exercise the provided batch methods
    #[derive(Default)]
    struct MapRepository {
        todos: Mutex<HashMap<TodoId, Todo>>,
        failing: Option<TodoId>,
    }

    #[async_trait]
    impl TodoRepository for MapRepository {
        async fn create(&self, todo: NewTodo) -> Result<Todo> {
            let mut todos = self.todos.lock().await;
            if todos.contains_key(&todo.id) {
                return Err(TodoError::Conflict(todo.id));
            }
            let todo = Todo::from(todo);
            todos.insert(todo.id, todo.clone());
            Ok(todo)
        }

        async fn list(&self, filter: ListFilter) -> Result<Vec<RowResult>> {
            let todos = self.todos.lock().await;
            Ok(todos
                .values()
                .filter(|t| filter.matches(t))
                .cloned()
                .map(Ok)
                .collect())
        }

        async fn toggle(&self, id: TodoId) -> Result<u64> {
            if self.failing == Some(id) {
                return Err(TodoError::Database("boom".to_string()));
            }
            let mut todos = self.todos.lock().await;
            Ok(match todos.get_mut(&id) {
                Some(todo) => {
                    todo.done = !todo.done;
                    1
                }
                None => 0,
            })
        }

        async fn delete(&self, id: TodoId) -> Result<u64> {
            Ok(self.todos.lock().await.remove(&id).map_or(0, |_| 1))
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn close(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_batch_continues_past_missing_and_failing_ids() {
        let repo = MapRepository {
            failing: Some(4),
            ..Default::default()
        };
        repo.create(NewTodo::new(1, "a")).await.unwrap();
        repo.create(NewTodo::new(4, "b")).await.unwrap();
        repo.create(NewTodo::new(5, "c")).await.unwrap();

        let report = repo.toggle_batch(&[1, 3, 4, 5]).await;
        assert_eq!(report.kind, BatchKind::Toggle);
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.outcome_for(1), Some(&ItemOutcome::Applied));
        assert_eq!(report.outcome_for(3), Some(&ItemOutcome::NotFound));
        assert!(matches!(report.outcome_for(4), Some(ItemOutcome::Failed(_))));
        assert_eq!(report.outcome_for(5), Some(&ItemOutcome::Applied));
        assert_eq!(report.applied_count(), 2);
        assert_eq!(report.not_found(), vec![3]);
        assert_eq!(report.failures().len(), 1);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_delete_batch_reports_not_found_on_repeat() {
        let repo = MapRepository::default();
        repo.create(NewTodo::new(1, "a")).await.unwrap();

        let first = repo.delete_batch(&[1]).await;
        assert!(first.is_complete());
        assert_eq!(first.kind.verb(), "deleted");

        let second = repo.delete_batch(&[1]).await;
        assert_eq!(second.outcome_for(1), Some(&ItemOutcome::NotFound));
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(ItemOutcome::from_rows_affected(Ok(1)), ItemOutcome::Applied);
        assert_eq!(ItemOutcome::from_rows_affected(Ok(0)), ItemOutcome::NotFound);
        assert_eq!(
            ItemOutcome::from_rows_affected(Err(TodoError::connection_closed())),
            ItemOutcome::Failed(TodoError::connection_closed())
        );
    }
}

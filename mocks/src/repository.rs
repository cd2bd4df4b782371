//! Mock implementation of TodoRepository trait
//!
//! Provides a thread-safe mock repository with:
//! - Error injection, for the next call or for specific ids
//! - Call tracking for verification
//! - Per-row decode failure simulation
//! - Simulated round-trip latency
//! - Connection release tracking

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use async_trait::async_trait;
use todo_core::{
    DecodeError, ListFilter, NewTodo, Result, RowResult, Todo, TodoError, TodoId, TodoRepository,
};

/// Mock implementation of TodoRepository for testing
///
/// Records are kept in insertion order, which stands in for the store-native
/// order of a real table.
#[derive(Clone, Default)]
pub struct MockTodoRepository {
    todos: Arc<Mutex<Vec<Todo>>>,
    error_injection: Arc<Mutex<Option<TodoError>>>,
    id_errors: Arc<Mutex<HashMap<TodoId, TodoError>>>,
    malformed_ids: Arc<Mutex<HashSet<TodoId>>>,
    call_history: Arc<Mutex<Vec<String>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    closed: Arc<Mutex<bool>>,
    close_calls: Arc<Mutex<usize>>,
}

impl MockTodoRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mock repository with pre-populated todos
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let repo = Self::new();
        *repo.todos.lock() = todos;
        repo
    }

    /// Inject error for next operation
    pub fn inject_error(&self, error: TodoError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Clear error injection
    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Make every toggle/delete of `id` fail with `error`
    pub fn inject_error_for(&self, id: TodoId, error: TodoError) {
        self.id_errors.lock().insert(id, error);
    }

    /// Make the row for `id` undecodable in list results
    pub fn inject_decode_failure(&self, id: TodoId) {
        self.malformed_ids.lock().insert(id);
    }

    /// Delay every data operation by `latency`, like a slow store
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Current contents, bypassing call tracking
    pub fn snapshot(&self) -> Vec<Todo> {
        self.todos.lock().clone()
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    /// Total number of trait calls received
    pub fn call_count(&self) -> usize {
        self.call_history.lock().len()
    }

    /// Number of calls to one method
    pub fn calls_to(&self, method: &str) -> usize {
        let prefix = format!("{method}(");
        self.call_history
            .lock()
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.call_history.lock().clear();
    }

    /// Whether `close` has released the connection
    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }

    /// How many times `close` was called, including no-op repeats
    pub fn close_calls(&self) -> usize {
        *self.close_calls.lock()
    }

    /// Assert method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            history.iter().any(|call| call.contains(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Assert that no store operation was issued at all
    pub fn assert_no_calls(&self) {
        let history = self.call_history.lock();
        assert!(
            history.is_empty(),
            "Expected no store calls, got: {:?}",
            *history
        );
    }

    /// Check if an error should be injected, consuming it if so
    fn check_error_injection(&self) -> Result<()> {
        if *self.closed.lock() {
            return Err(TodoError::connection_closed());
        }
        let mut error_opt = self.error_injection.lock();
        if let Some(error) = error_opt.take() {
            return Err(error);
        }
        Ok(())
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_id_error(&self, id: TodoId) -> Result<()> {
        match self.id_errors.lock().get(&id) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Record method call in history
    fn record_call(&self, method: &str) {
        self.call_history.lock().push(format!("{method}()"));
    }

    /// Record method call with parameters in history
    fn record_call_with_params(&self, method: &str, params: &str) {
        self.call_history.lock().push(format!("{method}({params})"));
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<Todo> {
        self.record_call_with_params("create", &format!("id={}", todo.id));
        self.simulate_latency().await;
        self.check_error_injection()?;

        let mut todos = self.todos.lock();
        if todos.iter().any(|t| t.id == todo.id) {
            return Err(TodoError::Conflict(todo.id));
        }

        let todo = Todo::from(todo);
        todos.push(todo.clone());
        Ok(todo)
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<RowResult>> {
        self.record_call_with_params("list", &format!("filter={filter}"));
        self.simulate_latency().await;
        self.check_error_injection()?;

        let todos = self.todos.lock();
        let malformed = self.malformed_ids.lock();
        Ok(todos
            .iter()
            .filter(|todo| filter.matches(todo))
            .enumerate()
            .map(|(index, todo)| {
                if malformed.contains(&todo.id) {
                    Err(DecodeError::new(index + 1, "column 'title': unexpected null"))
                } else {
                    Ok(todo.clone())
                }
            })
            .collect())
    }

    async fn toggle(&self, id: TodoId) -> Result<u64> {
        self.record_call_with_params("toggle", &format!("id={id}"));
        self.simulate_latency().await;
        self.check_error_injection()?;
        self.check_id_error(id)?;

        let mut todos = self.todos.lock();
        match todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.done = !todo.done;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: TodoId) -> Result<u64> {
        self.record_call_with_params("delete", &format!("id={id}"));
        self.simulate_latency().await;
        self.check_error_injection()?;
        self.check_id_error(id)?;

        let mut todos = self.todos.lock();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        Ok((before - todos.len()) as u64)
    }

    async fn health_check(&self) -> Result<()> {
        self.record_call("health_check");
        self.check_error_injection()?;
        Ok(())
    }

    async fn close(&self) -> Result<bool> {
        self.record_call("close");
        *self.close_calls.lock() += 1;

        let mut closed = self.closed.lock();
        if *closed {
            return Ok(false);
        }
        *closed = true;
        Ok(true)
    }
}

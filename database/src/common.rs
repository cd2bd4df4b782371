use std::future::Future;
use std::time::Duration;

use sqlx::Connection;
use todo_core::{
    error::{DecodeError, Result, TodoError},
    models::TodoId,
};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

/// Timeouts applied by every repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Upper bound for establishing the connection
    pub connect_timeout: Duration,
    /// Upper bound for a single statement round-trip
    pub statement_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            statement_timeout: Duration::from_secs(30),
        }
    }
}

/// The single long-lived connection owned by a repository.
///
/// The connection is released at most once; after [`release`](Self::release)
/// every [`acquire`](Self::acquire) fails with a connection error.
#[derive(Debug)]
pub struct ConnectionSlot<C> {
    inner: Mutex<Option<C>>,
}

impl<C: Connection> ConnectionSlot<C> {
    pub fn new(connection: C) -> Self {
        Self {
            inner: Mutex::new(Some(connection)),
        }
    }

    /// Borrow the connection exclusively for one operation
    pub async fn acquire(&self) -> Result<MappedMutexGuard<'_, C>> {
        let guard = self.inner.lock().await;
        MutexGuard::try_map(guard, |slot| slot.as_mut())
            .map_err(|_| TodoError::connection_closed())
    }

    /// Close the connection, returning `false` if it was already released
    pub async fn release(&self) -> Result<bool> {
        let taken = self.inner.lock().await.take();
        match taken {
            Some(connection) => {
                connection.close().await.map_err(sqlx_error_to_todo_error)?;
                tracing::info!("Store connection released");
                Ok(true)
            }
            None => {
                tracing::debug!("Store connection already released");
                Ok(false)
            }
        }
    }

    pub async fn is_open(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

/// Bound a store round-trip, surfacing expiry as a connection error
pub async fn with_timeout<T, F>(operation: &str, timeout: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation = operation,
                timeout_ms = timeout.as_millis() as u64,
                "Store operation timed out"
            );
            Err(TodoError::timed_out(operation, timeout))
        }
    }
}

/// Convert SQLx error to TodoError
pub fn sqlx_error_to_todo_error(err: sqlx::Error) -> TodoError {
    match &err {
        sqlx::Error::Database(db_err) => {
            TodoError::Database(format!("Database constraint error: {}", db_err.message()))
        }
        sqlx::Error::Io(io_err) => TodoError::Connection(format!("I/O error: {io_err}")),
        sqlx::Error::Tls(tls_err) => TodoError::Connection(format!("TLS error: {tls_err}")),
        sqlx::Error::Protocol(message) => {
            TodoError::Connection(format!("Protocol error: {message}"))
        }
        sqlx::Error::PoolTimedOut => TodoError::Connection("Connection timeout".to_string()),
        sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => TodoError::connection_closed(),
        sqlx::Error::Configuration(cfg_err) => {
            TodoError::Configuration(format!("Invalid connection settings: {cfg_err}"))
        }
        _ => TodoError::Database(format!("Database operation failed: {err}")),
    }
}

/// Convert an INSERT failure, mapping unique violations to a conflict on `id`
pub fn insert_error_to_todo_error(err: sqlx::Error, id: TodoId) -> TodoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return TodoError::Conflict(id);
        }
    }
    sqlx_error_to_todo_error(err)
}

/// Render a column decode failure for a [`DecodeError`]
pub fn column_error(column: &str, err: sqlx::Error) -> String {
    match err {
        sqlx::Error::ColumnDecode { source, .. } => format!("column '{column}': {source}"),
        other => format!("column '{column}': {other}"),
    }
}

/// Unwrap a nullable column read, treating NULL as a decode failure
///
/// Columns are read as `Option<T>` because some drivers decode NULL text as an
/// empty string instead of failing.
pub fn required<T>(
    row: usize,
    column: &str,
    value: std::result::Result<Option<T>, sqlx::Error>,
) -> std::result::Result<T, DecodeError> {
    match value {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(DecodeError::new(
            row,
            format!("column '{column}': unexpected null"),
        )),
        Err(e) => Err(DecodeError::new(row, column_error(column, e))),
    }
}

//! Database crate for the todo tracker
//!
//! This crate provides the SQLite and PostgreSQL implementations of the
//! `TodoRepository` trait. Each repository owns exactly one connection for the
//! lifetime of the session and passes every value as a bound parameter.
//!
//! # Features
//!
//! - SQLite (file or in-memory) and PostgreSQL backends over `sqlx`
//! - Bounded connect and statement timeouts reported as connection errors
//! - Per-row decoding so one malformed row never hides the rest of a listing
//! - Idempotent connection release
//!
//! # Usage
//!
//! ```rust
//! use database::SqliteTodoRepository;
//! use todo_core::{ListFilter, NewTodo, TodoRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = SqliteTodoRepository::new(":memory:").await?;
//!     repo.ensure_schema().await?;
//!
//!     repo.create(NewTodo::new(1, "buy milk")).await?;
//!     let rows = repo.list(ListFilter::All).await?;
//!     assert_eq!(rows.len(), 1);
//!
//!     repo.close().await?;
//!     Ok(())
//! }
//! ```

mod common;
mod postgres;
mod sqlite;

pub use common::{ConnectionSlot, StoreOptions};
pub use postgres::{PgSettings, PostgresTodoRepository};
pub use sqlite::SqliteTodoRepository;

// Re-export commonly used types from todo-core for convenience
pub use todo_core::{
    error::{DecodeError, Result, TodoError},
    models::{ListFilter, NewTodo, Todo, TodoId},
    repository::{BatchKind, BatchReport, ItemOutcome, RowResult, TodoRepository},
};

/// Create a span for store operations
#[macro_export]
macro_rules! store_span {
    ($operation:expr) => {
        tracing::debug_span!("store_operation", operation = $operation)
    };
    ($operation:expr, $($fields:tt)+) => {
        tracing::debug_span!("store_operation", operation = $operation, $($fields)+)
    };
}

//! Todo Core Library
//!
//! This crate provides the record model, error taxonomy, and the gateway trait
//! for the todo tracker. The storage backends, the mocks, and the command-line
//! interpreter all depend on the types defined here.
//!
//! # Architecture
//!
//! - [`models`] - The todo record and the list filter
//! - [`error`] - Error types and result handling
//! - [`repository`] - Gateway trait and per-id batch outcomes
//! - [`validation`] - Parsing and validation of user-supplied values
//!
//! # Example
//!
//! ```rust
//! use todo_core::{validation::TodoValidator, ListFilter};
//!
//! let ids = TodoValidator::parse_id_list("done", "1,2").unwrap();
//! assert_eq!(ids, vec![1, 2]);
//! assert_eq!(ListFilter::parse("pending"), ListFilter::Pending);
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

// Re-export commonly used types at the crate root for convenience
pub use error::{DecodeError, Result, TodoError};
pub use models::{ListFilter, NewTodo, Todo, TodoId};
pub use repository::{BatchKind, BatchReport, ItemOutcome, RowResult, TodoRepository};
pub use validation::TodoValidator;

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

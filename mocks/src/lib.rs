//! Mock implementations and test utilities for the todo tracker
//!
//! This crate provides the testing infrastructure shared by the other crates:
//! - A mock `TodoRepository` with call tracking and error injection
//! - Fixtures and builders for records
//! - Order-independent assertion helpers
//! - Random data generators and property-based testing strategies
//! - The repository contract suite

pub mod assertions;
pub mod builders;
pub mod contracts;
pub mod fixtures;
pub mod generators;
pub mod repository;

pub use assertions::*;
pub use builders::*;
pub use contracts::*;
pub use fixtures::*;
pub use generators::*;
pub use repository::MockTodoRepository;

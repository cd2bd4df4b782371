//! Command-line task tracker
//!
//! This library holds everything behind the `todo` binary: configuration
//! loading, telemetry, store setup, the permissive command parser, help text,
//! and the REPL session that runs parsed commands against a [`TodoRepository`].
//!
//! [`TodoRepository`]: todo_core::TodoRepository

pub mod command;
pub mod config;
pub mod help;
pub mod session;
pub mod setup;
pub mod telemetry;

pub use command::{parse_args, parse_line, Action, HelpTopic, ParsedLine};
pub use config::{Config, StoreTarget};
pub use session::{Flow, Session, StoreHandle};
pub use setup::{create_repository, ensure_database_directory, open_store};
pub use telemetry::init_telemetry;

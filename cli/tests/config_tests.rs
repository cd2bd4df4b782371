use std::io::Write;

use tempfile::NamedTempFile;
use todo_cli::config::{Config, LogFormat};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_config_file_layers_over_defaults() {
    let file = write_config(
        r#"
[database]
statement_timeout = 5
init_schema = true

[session]
prompt = "tasks> "

[logging]
format = "json"
"#,
    );

    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.database.statement_timeout, 5);
    assert!(config.database.init_schema);
    assert_eq!(config.session.prompt, "tasks> ");
    assert_eq!(config.logging.format, LogFormat::Json);

    // Untouched keys keep their defaults
    assert_eq!(config.database.connect_timeout, 10);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let result = Config::from_file("/definitely/not/here/todo.toml");
    assert!(result.is_err());
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let file = write_config("[database]\nport = \"not a number\"\n");
    assert!(Config::from_file(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_sqlite_url_from_file_resolves_target() {
    let file = write_config("[database]\nurl = \"sqlite://todos.db\"\n");
    let mut config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    // A DATABASE_URL in the test environment would win; pin the value
    config.database.url = Some("sqlite://todos.db".to_string());

    assert!(config.validate().is_ok());
    assert_eq!(config.store_target().unwrap().describe(), "sqlite://todos.db");
}

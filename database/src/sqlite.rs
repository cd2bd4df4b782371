use crate::common::{
    insert_error_to_todo_error, required, sqlx_error_to_todo_error, with_timeout,
    ConnectionSlot, StoreOptions,
};
use crate::store_span;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Row};
use std::str::FromStr;
use std::time::Duration;
use todo_core::{
    error::{Result, TodoError},
    models::{ListFilter, NewTodo, Todo, TodoId},
    repository::{RowResult, TodoRepository},
};
use tracing::Instrument;

/// SQLite implementation of the TodoRepository trait
///
/// Holds one `SqliteConnection` for its whole lifetime, which also keeps an
/// in-memory database alive between statements.
#[derive(Debug)]
pub struct SqliteTodoRepository {
    conn: ConnectionSlot<SqliteConnection>,
    options: StoreOptions,
}

impl SqliteTodoRepository {
    /// Connect with default timeouts
    ///
    /// # Examples
    /// ```rust,no_run
    /// use database::SqliteTodoRepository;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// // In-memory database for testing
    /// let repo = SqliteTodoRepository::new(":memory:").await?;
    /// repo.ensure_schema().await?;
    ///
    /// // File-based database
    /// let repo = SqliteTodoRepository::new("sqlite:///tmp/todos.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::connect(database_url, StoreOptions::default()).await
    }

    /// Open the connection described by `database_url`
    ///
    /// Accepts `:memory:`, `sqlite::memory:`, `sqlite://<path>` or a bare path.
    /// File databases are created if missing.
    pub async fn connect(database_url: &str, options: StoreOptions) -> Result<Self> {
        let base_options = if database_url == ":memory:" || database_url == "sqlite::memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(sqlx_error_to_todo_error)?
        } else {
            let path = database_url
                .strip_prefix("sqlite://")
                .unwrap_or(database_url);
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        };
        let connect_options = base_options
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let connection = with_timeout("connect", options.connect_timeout, async {
            connect_options
                .connect()
                .await
                .map_err(sqlx_error_to_todo_error)
        })
        .await?;

        tracing::info!(database_url = %database_url, "Connected to SQLite store");
        Ok(Self {
            conn: ConnectionSlot::new(connection),
            options,
        })
    }

    /// Create the `todos` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        with_timeout("ensure_schema", self.options.statement_timeout, async {
            let mut conn = self.conn.acquire().await?;
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS todos (
                    id INTEGER PRIMARY KEY NOT NULL,
                    title TEXT NOT NULL,
                    done BOOLEAN NOT NULL DEFAULT FALSE
                )
                "#,
            )
            .execute(&mut *conn)
            .await
            .map_err(sqlx_error_to_todo_error)?;
            Ok(())
        })
        .await?;

        tracing::info!("Todo schema ready");
        Ok(())
    }

    /// Run a raw statement on the owned connection
    ///
    /// Intended for tests that need to shape the table directly.
    pub async fn execute_raw(&self, sql: &str) -> Result<u64> {
        let mut conn = self.conn.acquire().await?;
        let done = sqlx::query(sql)
            .execute(&mut *conn)
            .await
            .map_err(sqlx_error_to_todo_error)?;
        Ok(done.rows_affected())
    }

    fn build_list_query(filter: ListFilter) -> sqlx::QueryBuilder<'static, sqlx::Sqlite> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Sqlite> =
            sqlx::QueryBuilder::new("SELECT id, title, done FROM todos");
        if let Some(done) = filter.done_value() {
            query_builder.push(" WHERE done = ");
            query_builder.push_bind(done);
        }
        query_builder
    }
}

/// Convert SQLite row to Todo; `row` is the one-based position in the result
fn row_to_todo(row: usize, sqlite_row: &SqliteRow) -> RowResult {
    let id: TodoId = required(row, "id", sqlite_row.try_get("id"))?;
    let title: String = required(row, "title", sqlite_row.try_get("title"))?;
    let done: bool = required(row, "done", sqlite_row.try_get("done"))?;
    Ok(Todo { id, title, done })
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<Todo> {
        let span = store_span!("create", id = todo.id);
        with_timeout("create", self.options.statement_timeout, async {
            let mut conn = self.conn.acquire().await?;
            let row = sqlx::query(
                "INSERT INTO todos (id, title, done) VALUES (?, ?, ?) RETURNING id, title, done",
            )
            .bind(todo.id)
            .bind(&todo.title)
            .bind(false)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| insert_error_to_todo_error(e, todo.id))?;

            row_to_todo(1, &row).map_err(TodoError::from)
        })
        .instrument(span)
        .await
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<RowResult>> {
        let span = store_span!("list", filter = %filter);
        with_timeout("list", self.options.statement_timeout, async {
            let mut conn = self.conn.acquire().await?;
            let mut query_builder = Self::build_list_query(filter);
            let rows = query_builder
                .build()
                .fetch_all(&mut *conn)
                .await
                .map_err(sqlx_error_to_todo_error)?;

            tracing::debug!(rows = rows.len(), "List query returned");
            Ok(rows
                .iter()
                .enumerate()
                .map(|(index, row)| row_to_todo(index + 1, row))
                .collect())
        })
        .instrument(span)
        .await
    }

    async fn toggle(&self, id: TodoId) -> Result<u64> {
        let span = store_span!("toggle", id = id);
        with_timeout("toggle", self.options.statement_timeout, async {
            let mut conn = self.conn.acquire().await?;
            let result = sqlx::query("UPDATE todos SET done = NOT done WHERE id = ?")
                .bind(id)
                .execute(&mut *conn)
                .await
                .map_err(sqlx_error_to_todo_error)?;
            Ok(result.rows_affected())
        })
        .instrument(span)
        .await
    }

    async fn delete(&self, id: TodoId) -> Result<u64> {
        let span = store_span!("delete", id = id);
        with_timeout("delete", self.options.statement_timeout, async {
            let mut conn = self.conn.acquire().await?;
            let result = sqlx::query("DELETE FROM todos WHERE id = ?")
                .bind(id)
                .execute(&mut *conn)
                .await
                .map_err(sqlx_error_to_todo_error)?;
            Ok(result.rows_affected())
        })
        .instrument(span)
        .await
    }

    async fn health_check(&self) -> Result<()> {
        with_timeout("health_check", self.options.statement_timeout, async {
            let mut conn = self.conn.acquire().await?;
            sqlx::query("SELECT 1")
                .fetch_one(&mut *conn)
                .await
                .map_err(sqlx_error_to_todo_error)?;
            Ok(())
        })
        .await
    }

    async fn close(&self) -> Result<bool> {
        self.conn.release().await
    }
}

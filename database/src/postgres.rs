use crate::common::{
    insert_error_to_todo_error, required, sqlx_error_to_todo_error, with_timeout,
    ConnectionSlot, StoreOptions,
};
use crate::store_span;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{ConnectOptions, Row};
use std::str::FromStr;
use todo_core::{
    error::{Result, TodoError},
    models::{ListFilter, NewTodo, Todo, TodoId},
    repository::{RowResult, TodoRepository},
};
use tracing::Instrument;

/// Connection parameters for a PostgreSQL store, usually read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
}

impl PgSettings {
    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

/// PostgreSQL implementation of the TodoRepository trait
#[derive(Debug)]
pub struct PostgresTodoRepository {
    conn: ConnectionSlot<PgConnection>,
    options: StoreOptions,
}

impl PostgresTodoRepository {
    /// Connect using discrete host/port/credential settings
    pub async fn connect(settings: &PgSettings, options: StoreOptions) -> Result<Self> {
        tracing::info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            "Connecting to PostgreSQL store"
        );
        Self::connect_with(settings.connect_options(), options).await
    }

    /// Connect using a `postgres://` URL
    pub async fn connect_url(database_url: &str, options: StoreOptions) -> Result<Self> {
        let connect_options =
            PgConnectOptions::from_str(database_url).map_err(sqlx_error_to_todo_error)?;
        Self::connect_with(connect_options, options).await
    }

    async fn connect_with(connect_options: PgConnectOptions, options: StoreOptions) -> Result<Self> {
        let connection = with_timeout("connect", options.connect_timeout, async {
            connect_options
                .connect()
                .await
                .map_err(sqlx_error_to_todo_error)
        })
        .await?;

        tracing::info!("Connected to PostgreSQL store");
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
                    id BIGINT PRIMARY KEY,
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
        .await
    }

    fn build_list_query(filter: ListFilter) -> sqlx::QueryBuilder<'static, sqlx::Postgres> {
        let mut query_builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new("SELECT id, title, done FROM todos");
        if let Some(done) = filter.done_value() {
            query_builder.push(" WHERE done = ");
            query_builder.push_bind(done);
        }
        query_builder
    }
}

/// Convert PostgreSQL row to Todo
///
/// `id` is accepted as either BIGINT or INTEGER since the table is not
/// created by this program in production.
fn row_to_todo(row: usize, pg_row: &PgRow) -> RowResult {
    let id: TodoId = match pg_row.try_get::<Option<i64>, _>("id") {
        Ok(id) => required(row, "id", Ok(id))?,
        Err(_) => required(row, "id", pg_row.try_get::<Option<i32>, _>("id"))?.into(),
    };
    let title: String = required(row, "title", pg_row.try_get("title"))?;
    let done: bool = required(row, "done", pg_row.try_get("done"))?;
    Ok(Todo { id, title, done })
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    async fn create(&self, todo: NewTodo) -> Result<Todo> {
        let span = store_span!("create", id = todo.id);
        with_timeout("create", self.options.statement_timeout, async {
            let mut conn = self.conn.acquire().await?;
            let row = sqlx::query(
                "INSERT INTO todos (id, title, done) VALUES ($1, $2, $3) RETURNING id, title, done",
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
            let result = sqlx::query("UPDATE todos SET done = NOT done WHERE id = $1")
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
            let result = sqlx::query("DELETE FROM todos WHERE id = $1")
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

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Execute;

    #[test]
    fn test_list_query_uses_numbered_placeholder() {
        let mut pending = PostgresTodoRepository::build_list_query(ListFilter::Pending);
        assert_eq!(
            pending.build().sql(),
            "SELECT id, title, done FROM todos WHERE done = $1"
        );

        let mut all = PostgresTodoRepository::build_list_query(ListFilter::All);
        assert_eq!(all.build().sql(), "SELECT id, title, done FROM todos");
    }

    #[test]
    fn test_settings_to_connect_options() {
        let settings = PgSettings {
            host: "db.internal".to_string(),
            port: 6543,
            user: "todo".to_string(),
            password: Some("s3cret".to_string()),
            database: "todos".to_string(),
        };
        let options = settings.connect_options();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "todo");
        assert_eq!(options.get_database(), Some("todos"));
    }

    #[tokio::test]
    async fn test_connect_url_rejects_malformed_url() {
        let result = PostgresTodoRepository::connect_url("postgres://[", StoreOptions::default()).await;
        assert!(result.is_err());
    }
}

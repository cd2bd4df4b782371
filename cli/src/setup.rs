use anyhow::{Context, Result};
use database::{PostgresTodoRepository, SqliteTodoRepository, TodoRepository};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, StoreTarget};
use crate::session::StoreHandle;

/// Open the store described by `target` and verify it answers
///
/// The connection is released again if schema setup or the health check fails.
pub async fn create_repository(
    target: &StoreTarget,
    database: &DatabaseConfig,
    options: database::StoreOptions,
) -> todo_core::Result<Arc<dyn TodoRepository>> {
    info!(store = %target.describe(), "Opening store");

    let repository: Arc<dyn TodoRepository> = match target {
        StoreTarget::Sqlite(url) => {
            let repo = SqliteTodoRepository::connect(url, options).await?;
            if database.init_schema {
                info!("Ensuring todos table exists");
                let schema = repo.ensure_schema().await;
                release_on_failure(&repo, "schema setup", schema).await?;
            }
            Arc::new(repo)
        }
        StoreTarget::PostgresUrl(url) => {
            let repo = PostgresTodoRepository::connect_url(url, options).await?;
            if database.init_schema {
                info!("Ensuring todos table exists");
                let schema = repo.ensure_schema().await;
                release_on_failure(&repo, "schema setup", schema).await?;
            }
            Arc::new(repo)
        }
        StoreTarget::Postgres(settings) => {
            let repo = PostgresTodoRepository::connect(settings, options).await?;
            if database.init_schema {
                info!("Ensuring todos table exists");
                let schema = repo.ensure_schema().await;
                release_on_failure(&repo, "schema setup", schema).await?;
            }
            Arc::new(repo)
        }
    };

    let health = repository.health_check().await;
    release_on_failure(repository.as_ref(), "health check", health).await?;

    info!("Store ready");
    Ok(repository)
}

/// Close `repository` before handing back a failed setup step's error
async fn release_on_failure(
    repository: &dyn TodoRepository,
    step: &str,
    result: todo_core::Result<()>,
) -> todo_core::Result<()> {
    if let Err(e) = result {
        warn!(error = %e, step, "Store setup failed");
        if let Err(close_err) = repository.close().await {
            warn!(error = %close_err, "Failed to release store after failed setup");
        }
        return Err(e);
    }
    Ok(())
}

/// Connect, falling back to a degraded session when the store is unreachable
pub async fn open_store(
    target: &StoreTarget,
    database: &DatabaseConfig,
    options: database::StoreOptions,
) -> StoreHandle {
    match create_repository(target, database, options).await {
        Ok(repository) => StoreHandle::Ready(repository),
        Err(e) => {
            warn!(error = %e, "Continuing without a store");
            StoreHandle::Unavailable(e.to_string())
        }
    }
}

/// Ensure the parent directory of an on-disk SQLite database exists
pub fn ensure_database_directory(target: &StoreTarget) -> Result<()> {
    let StoreTarget::Sqlite(url) = target else {
        return Ok(());
    };
    let Some(db_path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };

    let db_path = Path::new(db_path);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory: {}", parent.display());
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;

            // Owner-only access on Unix
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let permissions = std::fs::Permissions::from_mode(0o700);
                std::fs::set_permissions(parent, permissions)
                    .context("Failed to set directory permissions")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use database::ListFilter;
    use tempfile::TempDir;

    fn sqlite_config(url: String) -> Config {
        let mut config = Config::default();
        config.database.url = Some(url);
        config.database.init_schema = true;
        config
    }

    #[tokio::test]
    async fn test_create_repository_with_file_url() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("todo.db").display());
        let config = sqlite_config(url);
        let target = config.store_target().unwrap();

        let repo = create_repository(&target, &config.database, config.store_options())
            .await
            .unwrap();
        assert!(repo.list(ListFilter::All).await.unwrap().is_empty());
        assert!(repo.close().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_table_without_init_schema_still_connects() {
        let mut config = sqlite_config(":memory:".to_string());
        config.database.init_schema = false;
        let target = config.store_target().unwrap();

        let repo = create_repository(&target, &config.database, config.store_options())
            .await
            .unwrap();
        assert!(repo.list(ListFilter::All).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_store_gives_degraded_handle() {
        let mut config = Config::default();
        config.database.url = Some("postgres://todo@127.0.0.1:1/todo".to_string());
        config.database.connect_timeout = 2;
        let target = config.store_target().unwrap();

        let handle = open_store(&target, &config.database, config.store_options()).await;
        assert!(matches!(handle, StoreHandle::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_failed_setup_step_releases_connection() {
        let mock = mocks::MockTodoRepository::new();
        let failure = Err(todo_core::TodoError::Database("no such table".to_string()));

        let result = release_on_failure(&mock, "schema setup", failure).await;
        assert!(result.is_err());
        assert!(mock.is_closed());

        let other = mocks::MockTodoRepository::new();
        release_on_failure(&other, "health check", Ok(())).await.unwrap();
        assert!(!other.is_closed());
    }

    #[test]
    fn test_ensure_database_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("subdir").join("todo.db");
        let target = StoreTarget::Sqlite(format!("sqlite://{}", db_path.display()));

        ensure_database_directory(&target).unwrap();
        assert!(db_path.parent().unwrap().exists());

        // Non-file targets are left alone
        ensure_database_directory(&StoreTarget::Sqlite(":memory:".to_string())).unwrap();
    }
}

//! Every store backend must satisfy the shared repository contract

use database::{
    ListFilter, PostgresTodoRepository, SqliteTodoRepository, StoreOptions, TodoRepository,
};
use mocks::{assert_same_todos, decoded, store_state_strategy, test_repository_contract};
use proptest::prelude::*;

#[tokio::test]
async fn test_sqlite_repository_contract() {
    let repo = SqliteTodoRepository::new(":memory:").await.unwrap();
    repo.ensure_schema().await.unwrap();

    test_repository_contract(&repo).await;
    assert!(repo.close().await.unwrap());
}

/// Runs only when `TODO_TEST_POSTGRES_URL` points at a disposable database
#[tokio::test]
async fn test_postgres_repository_contract() {
    let Ok(url) = std::env::var("TODO_TEST_POSTGRES_URL") else {
        return;
    };

    let repo = PostgresTodoRepository::connect_url(&url, StoreOptions::default())
        .await
        .unwrap();
    repo.ensure_schema().await.unwrap();
    for id in [1, 2] {
        repo.delete(id).await.unwrap();
    }
    for id in 100..700 {
        repo.delete(id).await.unwrap();
    }

    test_repository_contract(&repo).await;
    repo.close().await.unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_pending_and_done_partition_all((todos, flags) in store_state_strategy(12)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let repo = SqliteTodoRepository::new(":memory:").await.unwrap();
            repo.ensure_schema().await.unwrap();

            for (todo, mark_done) in todos.iter().zip(&flags) {
                repo.create(todo.clone()).await.unwrap();
                if *mark_done {
                    assert_eq!(repo.toggle(todo.id).await.unwrap(), 1);
                }
            }

            let all = decoded(repo.list(ListFilter::All).await.unwrap());
            let pending = decoded(repo.list(ListFilter::Pending).await.unwrap());
            let done = decoded(repo.list(ListFilter::Done).await.unwrap());

            assert_eq!(all.len(), todos.len());
            assert!(pending.iter().all(|t| !t.done));
            assert!(done.iter().all(|t| t.done));
            assert_eq!(done.len(), flags.iter().filter(|f| **f).count());

            let mut union = pending.clone();
            union.extend(done.iter().cloned());
            assert_same_todos(&union, &all);

            repo.close().await.unwrap();
        });
    }
}

//! Contract test helpers for validating trait implementations
//!
//! Provides standardized tests that any implementation of `TodoRepository`
//! should pass. Every helper expects an empty store and uses its own id
//! range so the suite can run against a single shared repository.

use crate::{assert_absent, assert_same_todos, assert_single_with_id, decoded, hostile_titles};
use todo_core::{ItemOutcome, ListFilter, NewTodo, Todo, TodoError, TodoRepository};

/// Test any TodoRepository implementation with comprehensive contract tests
pub async fn test_repository_contract<R: TodoRepository>(repo: &R) {
    test_health_check_contract(repo).await;
    test_create_contract(repo).await;
    test_duplicate_contract(repo).await;
    test_toggle_contract(repo).await;
    test_delete_contract(repo).await;
    test_filter_partition_contract(repo).await;
    test_bound_parameters_contract(repo).await;
    test_scenario_contract(repo).await;
}

/// Test health check contract
pub async fn test_health_check_contract<R: TodoRepository>(repo: &R) {
    assert!(
        repo.health_check().await.is_ok(),
        "Health check should pass for healthy repository"
    );
}

/// Test creation contract: the new record is listed exactly once, pending
pub async fn test_create_contract<R: TodoRepository>(repo: &R) {
    let created = repo
        .create(NewTodo::new(101, "contract create"))
        .await
        .expect("Create should succeed");
    assert_eq!(created, Todo::new(101, "contract create"));

    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    let listed = assert_single_with_id(&all, 101);
    assert_eq!(listed, Todo::new(101, "contract create"));
}

/// Test duplicate id contract: conflict, store unchanged
pub async fn test_duplicate_contract<R: TodoRepository>(repo: &R) {
    repo.create(NewTodo::new(201, "original"))
        .await
        .expect("Create should succeed");
    let before = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));

    let duplicate = repo.create(NewTodo::new(201, "duplicate")).await;
    match duplicate {
        Err(TodoError::Conflict(id)) => assert_eq!(id, 201),
        other => panic!("Expected Conflict error, got: {other:?}"),
    }

    let after = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    assert_same_todos(&after, &before);
    assert_eq!(assert_single_with_id(&after, 201).title, "original");
}

/// Test toggle contract: involution, missing ids are NotFound
pub async fn test_toggle_contract<R: TodoRepository>(repo: &R) {
    repo.create(NewTodo::new(301, "toggle me"))
        .await
        .expect("Create should succeed");

    assert_eq!(repo.toggle(301).await.expect("Toggle should succeed"), 1);
    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    assert!(assert_single_with_id(&all, 301).done);

    assert_eq!(repo.toggle(301).await.expect("Toggle should succeed"), 1);
    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    assert!(!assert_single_with_id(&all, 301).done, "Toggle twice should restore done");

    assert_eq!(repo.toggle(399).await.expect("Toggle of missing id is not an error"), 0);

    let report = repo.toggle_batch(&[399, 301]).await;
    assert_eq!(report.outcome_for(399), Some(&ItemOutcome::NotFound));
    assert_eq!(report.outcome_for(301), Some(&ItemOutcome::Applied));
}

/// Test delete contract: removal, then NotFound on repeat
pub async fn test_delete_contract<R: TodoRepository>(repo: &R) {
    repo.create(NewTodo::new(401, "delete me"))
        .await
        .expect("Create should succeed");

    let report = repo.delete_batch(&[401]).await;
    assert_eq!(report.outcome_for(401), Some(&ItemOutcome::Applied));

    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    assert_absent(&all, 401);

    let again = repo.delete_batch(&[401]).await;
    assert_eq!(again.outcome_for(401), Some(&ItemOutcome::NotFound));
}

/// Test filter contract: pending and done partition all
pub async fn test_filter_partition_contract<R: TodoRepository>(repo: &R) {
    for id in 501..=504 {
        repo.create(NewTodo::new(id, format!("partition {id}")))
            .await
            .expect("Create should succeed");
    }
    repo.toggle_batch(&[502, 504]).await;

    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    let pending = decoded(repo.list(ListFilter::Pending).await.expect("List should succeed"));
    let done = decoded(repo.list(ListFilter::Done).await.expect("List should succeed"));

    assert!(pending.iter().all(|t| !t.done));
    assert!(done.iter().all(|t| t.done));
    assert!(pending.iter().all(|p| done.iter().all(|d| d.id != p.id)));

    let mut union = pending.clone();
    union.extend(done.iter().cloned());
    assert_same_todos(&union, &all);
}

/// Test that titles reach the store verbatim
pub async fn test_bound_parameters_contract<R: TodoRepository>(repo: &R) {
    for (offset, title) in hostile_titles().into_iter().enumerate() {
        let id = 600 + offset as i64;
        let created = repo
            .create(NewTodo::new(id, title))
            .await
            .expect("Create should succeed for any title");
        assert_eq!(created.title, title);
    }

    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    for (offset, title) in hostile_titles().into_iter().enumerate() {
        let todo = assert_single_with_id(&all, 600 + offset as i64);
        assert_eq!(todo.title, title);
    }
}

/// Test the add/list/toggle/delete walkthrough on ids 1 and 2
pub async fn test_scenario_contract<R: TodoRepository>(repo: &R) {
    repo.create(NewTodo::new(1, "buy milk")).await.expect("Create should succeed");
    repo.create(NewTodo::new(2, "write report")).await.expect("Create should succeed");

    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    assert_single_with_id(&all, 1);
    assert_single_with_id(&all, 2);

    let report = repo.toggle_batch(&[1, 2]).await;
    assert!(report.is_complete());

    let done = decoded(repo.list(ListFilter::Done).await.expect("List should succeed"));
    assert!(assert_single_with_id(&done, 1).done);
    assert!(assert_single_with_id(&done, 2).done);

    let report = repo.delete_batch(&[1]).await;
    assert!(report.is_complete());

    let all = decoded(repo.list(ListFilter::All).await.expect("List should succeed"));
    assert_absent(&all, 1);
    assert_eq!(
        assert_single_with_id(&all, 2),
        Todo { id: 2, title: "write report".to_string(), done: true }
    );
}

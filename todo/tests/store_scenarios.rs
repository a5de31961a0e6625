//! End-to-end scenarios for the todo store running on the tokio runtime.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use futures::future::BoxFuture;
use todo_store::{
    Todo, TodoAction, TodoEnvironment, TodoId, TodoLoader, TodoState, TodoStore, mock_todos,
};
use todo_store_core::environment::Clock;
use todo_store_runtime::StoreError;
use todo_store_testing::{ManualClock, init_test_tracing, test_clock};

// ============================================================================
// Test Fixtures
// ============================================================================

fn test_store() -> TodoStore {
    init_test_tracing();
    TodoStore::new(TodoEnvironment::mock(Arc::new(test_clock())))
}

fn seeded_store() -> TodoStore {
    init_test_tracing();
    TodoStore::with_state(
        TodoState::with_todos(mock_todos(test_clock().now())),
        TodoEnvironment::mock(Arc::new(test_clock())),
    )
}

// ============================================================================
// Fetch
// ============================================================================

#[tokio::test(start_paused = true)]
async fn fetch_replaces_with_mock_set() {
    let store = test_store();

    store.fetch_todos().await.unwrap();

    assert_eq!(store.todos().await, mock_todos(test_clock().now()));
    assert!(!store.loading().await);
}

#[tokio::test(start_paused = true)]
async fn loading_is_set_while_fetch_in_flight() {
    let store = test_store();

    let background = store.clone();
    let fetch = tokio::spawn(async move { background.fetch_todos().await });

    // Let the fetch reach its delay
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.loading().await);
    assert!(store.todos().await.is_empty());

    fetch.await.unwrap().unwrap();
    assert!(!store.loading().await);
    assert_eq!(store.todos().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fetch_discards_prior_additions() {
    let store = test_store();

    store.add_todo("buy milk").await.unwrap();
    store.add_todo("walk dog").await.unwrap();
    assert_eq!(store.todos().await.len(), 2);

    store.fetch_todos().await.unwrap();

    let todos = store.todos().await;
    assert_eq!(todos.len(), 2);
    assert!(todos.iter().all(|t| t.content != "buy milk"));
}

#[tokio::test(start_paused = true)]
async fn overlapping_fetches_last_write_wins() {
    init_test_tracing();
    let clock = ManualClock::new(test_clock().now());
    let store = TodoStore::new(TodoEnvironment::mock(Arc::new(clock.clone())));

    let first = store.clone();
    let first = tokio::spawn(async move { first.fetch_todos().await });
    tokio::time::sleep(Duration::from_millis(400)).await;

    let second = store.clone();
    let second = tokio::spawn(async move { second.fetch_todos().await });

    // First load lands at 800 ms, second at 1200 ms
    tokio::time::sleep(Duration::from_millis(500)).await;
    first.await.unwrap().unwrap();
    assert_eq!(store.todos().await.len(), 2);
    assert!(!store.loading().await);

    store.add_todo("between loads").await.unwrap();
    clock.advance(chrono::Duration::seconds(60));

    second.await.unwrap().unwrap();
    assert_eq!(store.todos().await, mock_todos(clock.now()));
}

#[tokio::test(start_paused = true)]
async fn fetch_timeout_still_applies_result() {
    let store = test_store();

    let result = store
        .fetch_todos_with_timeout(Duration::from_millis(100))
        .await;
    assert!(matches!(result, Err(StoreError::Timeout)));
    assert!(store.loading().await);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(!store.loading().await);
    assert_eq!(store.todos().await.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fetch_within_timeout_succeeds() {
    let store = test_store();

    store
        .fetch_todos_with_timeout(Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(store.todos().await.len(), 2);
}

/// Loader whose load panics, standing in for a broken user-supplied source
struct ExplodingLoader;

fn explode() -> Vec<Todo> {
    panic!("loader exploded")
}

impl TodoLoader for ExplodingLoader {
    fn load(&self) -> BoxFuture<'static, Vec<Todo>> {
        Box::pin(async { explode() })
    }
}

fn exploding_store() -> TodoStore {
    init_test_tracing();
    TodoStore::with_state(
        TodoState::with_todos(mock_todos(test_clock().now())),
        TodoEnvironment::new(Arc::new(test_clock()), Arc::new(ExplodingLoader)),
    )
}

#[tokio::test]
async fn panicking_loader_fails_fetch_and_clears_loading() {
    let store = exploding_store();
    let before = store.todos().await;
    let mut rx = store.subscribe();

    let result = store.fetch_todos().await;

    assert!(matches!(result, Err(StoreError::TaskJoinError(_))));
    assert!(!store.loading().await);
    assert_eq!(store.todos().await, before);

    assert_eq!(rx.recv().await.unwrap(), TodoAction::FetchTodos);
    assert!(matches!(
        rx.recv().await.unwrap(),
        TodoAction::FetchFailed { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn panicking_loader_fails_fetch_with_timeout() {
    let store = exploding_store();

    let result = store
        .fetch_todos_with_timeout(Duration::from_secs(2))
        .await;

    assert!(matches!(result, Err(StoreError::TaskJoinError(_))));
    assert!(!store.loading().await);

    // The store still serves later operations
    store.add_todo("after the failure").await.unwrap();
    assert_eq!(store.todos().await.len(), 3);
}

// ============================================================================
// Toggle / Delete / Add
// ============================================================================

#[tokio::test]
async fn toggle_seeded_record() {
    let store = seeded_store();

    store.toggle_todo("1").await.unwrap();

    let state = store.snapshot().await;
    assert!(!state.get(&TodoId::from("1")).unwrap().is_completed);
}

#[tokio::test]
async fn toggle_twice_restores() {
    let store = seeded_store();
    let before = store.snapshot().await;

    store.toggle_todo("2").await.unwrap();
    store.toggle_todo("2").await.unwrap();

    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn toggle_nonexistent_changes_nothing() {
    let store = seeded_store();
    let before = store.snapshot().await;

    store.toggle_todo("nonexistent").await.unwrap();

    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn delete_seeded_record() {
    let store = seeded_store();

    store.delete_todo("2").await.unwrap();

    let todos = store.todos().await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id.as_str(), "1");
}

#[tokio::test]
async fn delete_nonexistent_changes_nothing() {
    let store = seeded_store();

    store.delete_todo("42").await.unwrap();

    assert_eq!(store.todos().await.len(), 2);
}

#[tokio::test]
async fn add_to_empty() {
    let store = test_store();

    store.add_todo("buy milk").await.unwrap();

    let todos = store.todos().await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].content, "buy milk");
    assert!(!todos[0].is_completed);
    assert_eq!(todos[0].created_at, test_clock().now().timestamp_millis());
}

#[tokio::test]
async fn adds_with_fixed_clock_get_unique_ids() {
    let store = test_store();

    for i in 0..5 {
        store.add_todo(format!("task {i}")).await.unwrap();
    }

    let todos = store.todos().await;
    let mut ids: Vec<_> = todos.iter().map(|t| t.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
    assert_eq!(todos[0].content, "task 4");
}

#[tokio::test]
async fn concurrent_adds_all_land() {
    let store = test_store();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.add_todo(format!("task {i}")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.todos().await.len(), 10);
}

// ============================================================================
// Observation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn subscribers_see_applied_actions() {
    let store = test_store();
    let mut rx = store.subscribe();

    store.fetch_todos().await.unwrap();
    store.toggle_todo("1").await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), TodoAction::FetchTodos);
    assert_eq!(
        rx.recv().await.unwrap(),
        TodoAction::TodosLoaded {
            todos: mock_todos(test_clock().now()),
        }
    );
    assert_eq!(
        rx.recv().await.unwrap(),
        TodoAction::ToggleTodo {
            id: TodoId::from("1"),
        }
    );
}

#[tokio::test]
async fn record_shape_is_camel_case() {
    let store = test_store();
    store.add_todo("buy milk").await.unwrap();

    let todos: Vec<Todo> = store.todos().await;
    let json = serde_json::to_value(&todos[0]).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "id": "1735689600000",
            "content": "buy milk",
            "isCompleted": false,
            "createdAt": 1_735_689_600_000_i64,
        })
    );
}

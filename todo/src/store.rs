//! The todo store: one owner of the todo list, shared by handle.
//!
//! [`TodoStore`] wraps the generic runtime [`Store`] with the four todo
//! operations and read accessors. Construct it once and clone it into each
//! consumer; clones share the same state.

use crate::config::TodoConfig;
use crate::error::ConfigError;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Todo, TodoAction, TodoId, TodoState};
use std::sync::Arc;
use std::time::Duration;
use todo_store_core::environment::Clock;
use todo_store_runtime::{Store, StoreError};
use tokio::sync::broadcast;

/// The runtime store specialized to the todo domain
pub type TodoRuntime = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Handle to the todo list
#[derive(Clone)]
pub struct TodoStore {
    inner: TodoRuntime,
}

impl TodoStore {
    /// Creates an empty store
    #[must_use]
    pub fn new(env: TodoEnvironment) -> Self {
        Self::with_state(TodoState::new(), env)
    }

    /// Creates a store starting from `state`
    #[must_use]
    pub fn with_state(state: TodoState, env: TodoEnvironment) -> Self {
        Self {
            inner: Store::new(state, TodoReducer::new(), env),
        }
    }

    /// Creates an empty store with a mock loader configured from `config`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `config` is out of range.
    pub fn with_config(config: &TodoConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let env = TodoEnvironment::from_config(config, clock);

        Ok(Self {
            inner: Store::with_broadcast_capacity(
                TodoState::new(),
                TodoReducer::new(),
                env,
                config.broadcast_capacity,
            ),
        })
    }

    /// Replace the list with freshly loaded records
    ///
    /// Resolves once the records are in place and `loading` is back to
    /// `false` (unless another fetch is still in flight).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskJoinError`] if the loader panicked. The
    /// list is left untouched and `loading` is cleared.
    pub async fn fetch_todos(&self) -> Result<(), StoreError> {
        let mut handle = self.inner.send(TodoAction::FetchTodos).await?;
        let outcome = handle.wait().await;
        self.settle_fetch(outcome).await
    }

    /// Like [`TodoStore::fetch_todos`], but stop waiting after `timeout`
    ///
    /// The load keeps running on timeout and its records are still applied
    /// when they arrive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the load did not land in time, or
    /// [`StoreError::TaskJoinError`] as for [`TodoStore::fetch_todos`].
    pub async fn fetch_todos_with_timeout(&self, timeout: Duration) -> Result<(), StoreError> {
        let mut handle = self.inner.send(TodoAction::FetchTodos).await?;
        let outcome = handle.wait_with_timeout(timeout).await;
        self.settle_fetch(outcome).await
    }

    /// A dead load never sends `TodosLoaded`, so clear `loading` here
    async fn settle_fetch(&self, outcome: Result<(), StoreError>) -> Result<(), StoreError> {
        if let Err(StoreError::TaskJoinError(error)) = &outcome {
            self.inner
                .send(TodoAction::FetchFailed {
                    reason: error.to_string(),
                })
                .await?;
        }
        outcome
    }

    /// Flip the completion flag of `id`; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the runtime.
    pub async fn toggle_todo(&self, id: impl Into<TodoId>) -> Result<(), StoreError> {
        self.inner
            .send(TodoAction::ToggleTodo { id: id.into() })
            .await
            .map(drop)
    }

    /// Remove `id`; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the runtime.
    pub async fn delete_todo(&self, id: impl Into<TodoId>) -> Result<(), StoreError> {
        self.inner
            .send(TodoAction::DeleteTodo { id: id.into() })
            .await
            .map(drop)
    }

    /// Add an open todo at the head of the list
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the runtime.
    pub async fn add_todo(&self, content: impl Into<String>) -> Result<(), StoreError> {
        self.inner
            .send(TodoAction::AddTodo {
                content: content.into(),
            })
            .await
            .map(drop)
    }

    /// Current todos, head first
    pub async fn todos(&self) -> Vec<Todo> {
        self.inner.state(|s| s.todos.clone()).await
    }

    /// Whether a fetch is in flight
    pub async fn loading(&self) -> bool {
        self.inner.state(|s| s.loading).await
    }

    /// Copy of the full state
    pub async fn snapshot(&self) -> TodoState {
        self.inner.state(Clone::clone).await
    }

    /// Observe every action after it has been applied
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodoAction> {
        self.inner.subscribe_actions()
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use todo_store_testing::test_clock;

    fn test_store() -> TodoStore {
        TodoStore::new(TodoEnvironment::mock(Arc::new(test_clock())))
    }

    #[tokio::test]
    async fn starts_empty_and_idle() {
        let store = test_store();
        assert!(store.todos().await.is_empty());
        assert!(!store.loading().await);
    }

    #[tokio::test]
    async fn add_buy_milk() {
        let store = test_store();
        store.add_todo("buy milk").await.unwrap();

        let todos = store.todos().await;
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].content, "buy milk");
        assert!(!todos[0].is_completed);
    }

    #[tokio::test]
    async fn with_config_rejects_zero_capacity() {
        let config = TodoConfig::default().with_broadcast_capacity(0);
        let result = TodoStore::with_config(&config, Arc::new(test_clock()));
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn with_config_uses_configured_delay() {
        let config = TodoConfig::default().with_fetch_delay(Duration::from_millis(30));
        let store = TodoStore::with_config(&config, Arc::new(test_clock())).unwrap();

        let start = tokio::time::Instant::now();
        store.fetch_todos().await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_millis(800));
        assert_eq!(store.todos().await.len(), 2);
    }
}

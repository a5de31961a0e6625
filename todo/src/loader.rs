//! Sources of todo records for [`TodoAction::FetchTodos`](crate::TodoAction::FetchTodos).
//!
//! The reducer never performs I/O itself; it asks the environment's
//! [`TodoLoader`] for a future and hands that to the runtime as an effect.

use crate::types::{Todo, TodoId};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use todo_store_core::environment::Clock;

/// Default simulated latency of [`MockTodoLoader`]
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_millis(800);

/// Produces the records that replace the collection on fetch
///
/// Loading cannot fail; a loader backed by real I/O maps its failures to
/// whatever records it wants shown.
pub trait TodoLoader: Send + Sync {
    /// Start a load
    fn load(&self) -> BoxFuture<'static, Vec<Todo>>;
}

/// Loader that waits a fixed delay, then returns [`mock_todos`]
#[derive(Clone)]
pub struct MockTodoLoader {
    delay: Duration,
    clock: Arc<dyn Clock>,
}

impl MockTodoLoader {
    /// Creates a mock loader with the given latency
    #[must_use]
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { delay, clock }
    }

    /// Simulated latency
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl std::fmt::Debug for MockTodoLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTodoLoader")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl TodoLoader for MockTodoLoader {
    fn load(&self) -> BoxFuture<'static, Vec<Todo>> {
        let delay = self.delay;
        let clock = Arc::clone(&self.clock);

        Box::pin(async move {
            tracing::debug!(delay_ms = delay.as_millis(), "Simulating todo fetch");
            tokio::time::sleep(delay).await;
            // Timestamps are taken when the "response" arrives
            mock_todos(clock.now())
        })
    }
}

/// The fixed two-record set returned by [`MockTodoLoader`]
///
/// Record `"1"` is completed and 100 s old, record `"2"` is open and 50 s old.
#[must_use]
pub fn mock_todos(now: DateTime<Utc>) -> Vec<Todo> {
    let now = now.timestamp_millis();
    vec![
        Todo::new(TodoId::from("1"), "事务1", now - 100_000).completed(true),
        Todo::new(TodoId::from("2"), "事务2", now - 50_000),
    ]
}

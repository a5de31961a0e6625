//! Reducer logic for the todo list.
//!
//! Toggle, delete and add are applied synchronously. Fetch flips the
//! loading flag and returns a future effect whose result comes back as
//! [`TodoAction::TodosLoaded`].

use crate::config::TodoConfig;
use crate::loader::{DEFAULT_FETCH_DELAY, MockTodoLoader, TodoLoader};
use crate::types::{TodoAction, TodoState};
use std::sync::Arc;
use todo_store_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for ids and timestamps of added todos
    pub clock: Arc<dyn Clock>,
    /// Source of records for fetches
    pub loader: Arc<dyn TodoLoader>,
}

impl TodoEnvironment {
    /// Creates an environment from explicit dependencies
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, loader: Arc<dyn TodoLoader>) -> Self {
        Self { clock, loader }
    }

    /// Environment with a [`MockTodoLoader`] using the default delay
    #[must_use]
    pub fn mock(clock: Arc<dyn Clock>) -> Self {
        let loader = MockTodoLoader::new(DEFAULT_FETCH_DELAY, Arc::clone(&clock));
        Self::new(clock, Arc::new(loader))
    }

    /// Environment with a [`MockTodoLoader`] configured from `config`
    #[must_use]
    pub fn from_config(config: &TodoConfig, clock: Arc<dyn Clock>) -> Self {
        let loader = MockTodoLoader::new(config.fetch_delay, Arc::clone(&clock));
        Self::new(clock, Arc::new(loader))
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::FetchTodos => {
                // Overlapping fetches are allowed; the last one to land wins
                if state.loading {
                    tracing::debug!("Fetch started while another is in flight");
                }
                state.loading = true;

                let load = env.loader.load();
                smallvec![Effect::future(async move {
                    Some(TodoAction::TodosLoaded { todos: load.await })
                })]
            },

            TodoAction::TodosLoaded { todos } => {
                tracing::info!(count = todos.len(), "Todos loaded");
                state.replace_all(todos);
                SmallVec::new()
            },

            TodoAction::FetchFailed { reason } => {
                tracing::warn!(%reason, "Fetch failed, keeping current todos");
                state.loading = false;
                SmallVec::new()
            },

            TodoAction::ToggleTodo { id } => {
                match state.toggle(&id) {
                    Ok(is_completed) => tracing::debug!(%id, is_completed, "Toggled todo"),
                    Err(error) => tracing::debug!(%error, "Toggle ignored"),
                }
                SmallVec::new()
            },

            TodoAction::DeleteTodo { id } => {
                match state.remove(&id) {
                    Ok(_) => tracing::debug!(%id, "Deleted todo"),
                    Err(error) => tracing::debug!(%error, "Delete ignored"),
                }
                SmallVec::new()
            },

            TodoAction::AddTodo { content } => {
                let now = env.clock.now().timestamp_millis();
                let id = state.add(content, now).id.clone();
                tracing::debug!(%id, "Added todo");
                SmallVec::new()
            },
        }
    }
}

//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of records plus a loading flag.
//! Records can be bulk-loaded, toggled, deleted, and added at the head.

use crate::error::TodoError;
use serde::{Deserialize, Serialize};

/// Identifier of a todo, unique within the live collection
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Creates an id from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id derived from a millisecond timestamp
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo record
///
/// Serializes as `{ "id", "content", "isCompleted", "createdAt" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Free text describing the task
    pub content: String,
    /// Whether the task is done
    pub is_completed: bool,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
}

impl Todo {
    /// Creates an open todo
    #[must_use]
    pub fn new(id: TodoId, content: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            content: content.into(),
            is_completed: false,
            created_at,
        }
    }

    /// Marks the todo as done or open
    #[must_use]
    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Flips the completion flag
    pub const fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }
}

/// State of the todo list
///
/// `todos` is ordered newest-first for records added through
/// [`TodoState::add`]; loaded records keep the loader's order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// All todos, head first
    pub todos: Vec<Todo>,
    /// A load is in flight
    pub loading: bool,
}

impl TodoState {
    /// Creates an empty, idle state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: Vec::new(),
            loading: false,
        }
    }

    /// Creates an idle state holding `todos`
    #[must_use]
    pub const fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            loading: false,
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.is_completed).count()
    }

    /// Returns a todo by id
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Flips the completion flag of the todo with `id`
    ///
    /// Returns the new flag value.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no todo has `id`; state is untouched.
    pub fn toggle(&mut self, id: &TodoId) -> Result<bool, TodoError> {
        let todo = self
            .todos
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.clone()))?;
        todo.toggle();
        Ok(todo.is_completed)
    }

    /// Removes the todo with `id`
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::NotFound`] if no todo has `id`; state is untouched.
    pub fn remove(&mut self, id: &TodoId) -> Result<Todo, TodoError> {
        let index = self
            .todos
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.clone()))?;
        Ok(self.todos.remove(index))
    }

    /// Inserts a new open todo at the head
    ///
    /// The id is `now_millis` as a string, or the next larger millisecond
    /// value that is not taken yet.
    pub fn add(&mut self, content: impl Into<String>, now_millis: i64) -> &Todo {
        let id = self.next_free_id(now_millis);
        self.todos.insert(0, Todo::new(id, content, now_millis));
        &self.todos[0]
    }

    /// Replaces the whole collection and leaves the loading state
    pub fn replace_all(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
        self.loading = false;
    }

    fn next_free_id(&self, millis: i64) -> TodoId {
        let mut candidate = millis;
        loop {
            let id = TodoId::from_millis(candidate);
            if !self.exists(&id) {
                return id;
            }
            candidate = candidate.saturating_add(1);
        }
    }
}

/// Actions accepted by the todo reducer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    /// Start a load; the result arrives as [`TodoAction::TodosLoaded`]
    FetchTodos,

    /// A load finished with these records
    TodosLoaded {
        /// Records replacing the collection
        todos: Vec<Todo>,
    },

    /// A load died before producing records; the list is left as it was
    FetchFailed {
        /// Why the load failed
        reason: String,
    },

    /// Flip the completion flag of a todo
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Remove a todo
    DeleteTodo {
        /// Todo to remove
        id: TodoId,
    },

    /// Add a todo at the head of the list
    AddTodo {
        /// Text of the new todo
        content: String,
    },
}

//! In-memory todo list store with a mock loader.
//!
//! The list is owned by a [`TodoStore`] and changed through four operations:
//!
//! - fetch: replace the list with records from the [`TodoLoader`]
//! - toggle: flip one record's completion flag
//! - delete: remove one record
//! - add: insert a new record at the head
//!
//! Lookups by unknown id leave the list untouched. Every applied action is
//! published to subscribers so a UI can re-render.
//!
//! # Quick Start
//!
//! ```no_run
//! use todo_store::{TodoEnvironment, TodoStore};
//! use todo_store_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = TodoStore::new(TodoEnvironment::mock(Arc::new(SystemClock)));
//!
//! store.fetch_todos().await?;
//! store.toggle_todo("1").await?;
//! store.add_todo("buy milk").await?;
//!
//! for todo in store.todos().await {
//!     println!("[{}] {}", if todo.is_completed { "x" } else { " " }, todo.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod reducer;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::TodoConfig;
pub use error::{ConfigError, TodoError};
pub use loader::{MockTodoLoader, TodoLoader, mock_todos};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use store::TodoStore;
pub use types::{Todo, TodoAction, TodoId, TodoState};

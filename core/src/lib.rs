//! # Todo Store Core
//!
//! Core traits and types for the todo store.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a store
//! - **Action**: All possible inputs to a reducer (user intents and loaded results)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_core::*;
//!
//! impl Reducer for NoteReducer {
//!     type State = NoteState;
//!     type Action = NoteAction;
//!     type Environment = NoteEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut NoteState,
//!         action: NoteAction,
//!         env: &NoteEnvironment,
//!     ) -> SmallVec<[Effect<NoteAction>; 4]> {
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates state in place and returns effect descriptions for the
        /// runtime to execute. Most reducers return zero or one effect, so the
        /// result lives inline without a heap allocation.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe work for the runtime to run after the reducer returns.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Boxed future producing an optional feedback action
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are not executed by the reducer. The Store spawns them and
    /// feeds any produced action back through the reducer.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Async computation whose `Some` output is fed back into the reducer
        Future(EffectFuture<Action>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap a future producing an optional feedback action
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Returns `true` for `Effect::None`
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

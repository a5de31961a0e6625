//! # Todo Store Runtime
//!
//! Runtime implementation for the reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Runs effect futures and feeds actions back to reducers
//! - **Action Broadcast**: Publishes every reduced action to observers
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action and wait for its effects
//! let mut handle = store.send(Action::DoSomething).await?;
//! handle.wait().await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_store_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};
use tokio::task::JoinError;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// An effect task failed
        ///
        /// This typically means the effect's future panicked. Any action it
        /// would have produced was never reduced.
        #[error("Task failed during effect execution: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),

        /// Timeout waiting for effects to complete
        #[error("Timeout waiting for effects")]
        Timeout,
    }
}

pub use error::StoreError;

/// Default capacity of the action broadcast channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects spawned by
/// one action. An effect counts as finished once any action it produced has
/// been reduced.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from Action::Start are now complete
/// ```
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
    failure: Arc<Mutex<Option<JoinError>>>,
}

impl EffectHandle {
    /// Create a new handle together with its internal tracking context
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let failure = Arc::new(Mutex::new(None));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
            failure: Arc::clone(&failure),
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
            failure,
        };

        (handle, tracking)
    }

    /// Wait for all effects to complete
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskJoinError`] if an effect task panicked or
    /// was cancelled. Only the first failure is reported.
    pub async fn wait(&mut self) -> Result<(), StoreError> {
        while self.effects.load(Ordering::SeqCst) > 0 {
            // Sender lives in the tracking context; once every effect has
            // dropped it the channel closes and the counter is zero.
            if self.completion.changed().await.is_err() {
                break;
            }
        }

        let failure = self.failure.lock().ok().and_then(|mut slot| slot.take());
        match failure {
            Some(error) => Err(StoreError::TaskJoinError(error)),
            None => Ok(()),
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// The effects themselves keep running when the deadline passes; only
    /// the wait is abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete, or [`StoreError::TaskJoinError`] as for
    /// [`EffectHandle::wait`].
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
    failure: Arc<Mutex<Option<JoinError>>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            self.notifier.send_replace(());
        }
    }

    /// Keep the first failure for the handle to report
    fn record_failure(&self, error: JoinError) {
        if let Ok(mut slot) = self.failure.lock() {
            if slot.is_none() {
                *slot = Some(error);
            }
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, DEFAULT_BROADCAST_CAPACITY, DecrementGuard, Effect, EffectHandle, EffectTracking,
        Reducer, RwLock, StoreError,
    };
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Action broadcast (observers see every reduced action)
    ///
    /// Cloning a Store is cheap and yields a handle to the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast channel holds [`DEFAULT_BROADCAST_CAPACITY`]
        /// actions; use [`Store::with_broadcast_capacity`] for more.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(
                initial_state,
                reducer,
                environment,
                DEFAULT_BROADCAST_CAPACITY,
            )
        }

        /// Create a new store with a custom action broadcast capacity
        ///
        /// Slow subscribers that fall more than `capacity` actions behind
        /// receive `RecvError::Lagged` and skip ahead.
        ///
        /// # Panics
        ///
        /// Panics if `capacity` is zero.
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Publishes the action to subscribers, still under the lock
        /// 4. Starts the returned effects asynchronously
        ///
        /// Subscribers therefore see actions in exactly the order they were
        /// reduced. Effects may produce more actions, which go through the
        /// same path.
        ///
        /// # Errors
        ///
        /// Currently infallible; the `Result` leaves room for admission
        /// control without breaking callers.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            tracing::debug!("Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();
            let observed = action.clone();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                tracing::trace!("Reducer completed, returned {} effects", effects.len());

                // No receivers is fine: nobody is observing yet
                let _ = self.action_broadcast.send(observed);
                effects
            };

            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }
            tracing::debug!("Action processing completed, returning handle");

            Ok(handle)
        }

        /// Subscribe to all actions processed by this store
        ///
        /// The receiver gets a clone of every action after the reducer has
        /// applied it, including actions fed back by effects. State read
        /// through [`Store::state`] after receiving an action already
        /// reflects it.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Execute an effect, recording it against `tracking`
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    let store = self.clone();
                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking.clone());

                        // Run the future in its own task so a panic surfaces
                        // as a JoinError instead of vanishing with this task
                        match tokio::spawn(fut).await {
                            Ok(Some(action)) => {
                                tracing::trace!("Effect::Future produced an action, sending to store");
                                let _ = store.send(action).await;
                            },
                            Ok(None) => {
                                tracing::trace!("Effect::Future completed with no action");
                            },
                            Err(error) => {
                                tracing::error!(%error, "Effect::Future failed");
                                metrics::counter!("store.effects.failed").increment(1);
                                tracking.record_failure(error);
                            },
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

//! One-shot deferred values.
//!
//! This module provides [`Deferred`], a cloneable handle to a value that is
//! delivered at most once:
//!
//! - [`Deferred::new`] - Create a pending deferred
//! - [`Deferred::resolve`] / [`Deferred::reject`] - Fire it exactly once
//! - [`Deferred::on_success`] / [`Deferred::on_failure`] - Observe the firing
//! - [`Deferred::wait`] - Await the result as a future
//!
//! A deferred moves through a three-state lifecycle: pending, then either
//! succeeded or failed. The transition is one-shot and irreversible, and the
//! completion value never changes once set, so observers may read it any
//! number of times.
//!
//! # Example
//!
//! ```rust
//! use deferred_testkit::Deferred;
//!
//! let deferred: Deferred<i32> = Deferred::new();
//! assert!(!deferred.is_fired());
//!
//! deferred.resolve(42).unwrap();
//! assert!(deferred.is_fired());
//!
//! // Firing twice is an error, not a silent overwrite.
//! assert!(deferred.resolve(7).is_err());
//! ```

use std::fmt;
use std::sync::Arc;
use std::task::Waker;

use parking_lot::Mutex;

use crate::error::{Error, Result};

mod failure;
mod wait;

pub use failure::Failure;
pub use wait::Wait;

/// Completion state of a deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    /// Not fired yet.
    Pending,
    /// Fired with a success value.
    Succeeded,
    /// Fired with a failure.
    Failed,
}

/// A read-only view of a deferred's completion, as seen by [`Deferred::inspect`].
#[derive(Debug, Clone, Copy)]
pub enum Completion<'a, T> {
    /// Not fired yet.
    Pending,
    /// Fired with a success value.
    Succeeded(&'a T),
    /// Fired with a failure.
    Failed(&'a Failure),
}

enum State<T> {
    Pending,
    Succeeded(T),
    Failed(Failure),
}

struct Inner<T> {
    state: State<T>,
    on_success: Option<Box<dyn FnOnce(&T) + Send>>,
    on_failure: Option<Box<dyn FnOnce(&Failure) + Send>>,
    success_registered: bool,
    failure_registered: bool,
    wakers: Vec<Waker>,
}

struct Shared<T> {
    inner: Mutex<Inner<T>>,
}

/// A value that will become available at most once, asynchronously.
///
/// `Deferred` is a cloneable handle; all clones observe the same completion.
/// The producer fires it exactly once with [`resolve`](Deferred::resolve) or
/// [`reject`](Deferred::reject), and observers read it through
/// [`state`](Deferred::state), [`inspect`](Deferred::inspect), the registered
/// callbacks, or by awaiting [`wait`](Deferred::wait).
///
/// At most one success callback and one failure callback may ever be
/// registered. Callbacks observe the stored result by reference and never
/// consume it; the deferred's lock is held while a callback runs, so a
/// callback must not call back into the same deferred.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::Deferred;
/// use std::sync::Arc;
/// use parking_lot::Mutex;
///
/// let deferred: Deferred<&'static str> = Deferred::new();
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// deferred.on_success(move |value| sink.lock().push(*value)).unwrap();
///
/// deferred.resolve("hello").unwrap();
/// assert_eq!(*seen.lock(), vec!["hello"]);
/// ```
pub struct Deferred<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Deferred<T> {
    /// Create a new, pending deferred.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(State::Pending)
    }

    /// Create a deferred that has already fired successfully with `value`.
    #[must_use]
    pub fn succeeded(value: T) -> Self {
        Self::with_state(State::Succeeded(value))
    }

    /// Create a deferred that has already fired with `failure`.
    #[must_use]
    pub fn failed(failure: Failure) -> Self {
        Self::with_state(State::Failed(failure))
    }

    fn with_state(state: State<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state,
                    on_success: None,
                    on_failure: None,
                    success_registered: false,
                    failure_registered: false,
                    wakers: Vec::new(),
                }),
            }),
        }
    }

    /// Fire the deferred with a success value.
    ///
    /// Delivers the value to the registered success callback (if any) and
    /// wakes every pending waiter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyCompleted`] if the deferred has already fired;
    /// the original result is left intact.
    pub fn resolve(&self, value: T) -> Result<()> {
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;
        if !matches!(inner.state, State::Pending) {
            return Err(Error::AlreadyCompleted);
        }
        if let Some(callback) = inner.on_success.take() {
            callback(&value);
        }
        inner.state = State::Succeeded(value);
        let wakers = std::mem::take(&mut inner.wakers);
        drop(guard);
        for waker in wakers {
            waker.wake();
        }
        Ok(())
    }

    /// Fire the deferred with a failure.
    ///
    /// Delivers the failure to the registered failure callback (if any) and
    /// wakes every pending waiter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyCompleted`] if the deferred has already fired;
    /// the original result is left intact.
    pub fn reject(&self, failure: Failure) -> Result<()> {
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;
        if !matches!(inner.state, State::Pending) {
            return Err(Error::AlreadyCompleted);
        }
        if let Some(callback) = inner.on_failure.take() {
            callback(&failure);
        }
        inner.state = State::Failed(failure);
        let wakers = std::mem::take(&mut inner.wakers);
        drop(guard);
        for waker in wakers {
            waker.wake();
        }
        Ok(())
    }

    /// Register the success callback.
    ///
    /// If the deferred has already fired successfully, the callback runs
    /// immediately with the stored value. If it has already failed, the
    /// callback is accepted but never runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CallbackAlreadyRegistered`] if a success callback was
    /// registered before.
    pub fn on_success<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(&T) + Send + 'static,
    {
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;
        if inner.success_registered {
            return Err(Error::CallbackAlreadyRegistered("success"));
        }
        inner.success_registered = true;
        match &inner.state {
            State::Pending => inner.on_success = Some(Box::new(callback)),
            State::Succeeded(value) => callback(value),
            State::Failed(_) => {}
        }
        Ok(())
    }

    /// Register the failure callback.
    ///
    /// If the deferred has already failed, the callback runs immediately with
    /// the stored failure. If it has already succeeded, the callback is
    /// accepted but never runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CallbackAlreadyRegistered`] if a failure callback was
    /// registered before.
    pub fn on_failure<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce(&Failure) + Send + 'static,
    {
        let mut guard = self.shared.inner.lock();
        let inner = &mut *guard;
        if inner.failure_registered {
            return Err(Error::CallbackAlreadyRegistered("failure"));
        }
        inner.failure_registered = true;
        match &inner.state {
            State::Pending => inner.on_failure = Some(Box::new(callback)),
            State::Failed(failure) => callback(failure),
            State::Succeeded(_) => {}
        }
        Ok(())
    }

    /// Get the current completion state.
    #[must_use]
    pub fn state(&self) -> DeferredState {
        match self.shared.inner.lock().state {
            State::Pending => DeferredState::Pending,
            State::Succeeded(_) => DeferredState::Succeeded,
            State::Failed(_) => DeferredState::Failed,
        }
    }

    /// Check whether the deferred has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.state() != DeferredState::Pending
    }

    /// Inspect the completion without disturbing it.
    ///
    /// The closure receives a [`Completion`] view borrowing the stored result.
    /// Inspection is strictly read-only: it does not register or consume
    /// callbacks, and repeated inspections of a fired deferred see the same
    /// result. The deferred's lock is held while the closure runs, so the
    /// closure must not call back into the same deferred.
    pub fn inspect<R>(&self, f: impl FnOnce(Completion<'_, T>) -> R) -> R {
        let guard = self.shared.inner.lock();
        f(match &guard.state {
            State::Pending => Completion::Pending,
            State::Succeeded(value) => Completion::Succeeded(value),
            State::Failed(failure) => Completion::Failed(failure),
        })
    }

    /// Create a future that resolves once the deferred fires.
    ///
    /// See [`Wait`]. The future clones the stored result on completion, so
    /// the deferred itself stays readable.
    #[must_use]
    pub fn wait(&self) -> Wait<T> {
        Wait::new(Arc::clone(&self.shared))
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inspect(|completion| match completion {
            Completion::Pending => write!(f, "Deferred(pending)"),
            Completion::Succeeded(value) => write!(f, "Deferred(succeeded: {value:?})"),
            Completion::Failed(failure) => write!(f, "Deferred(failed: {failure:?})"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct StubError(&'static str);

    impl fmt::Display for StubError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for StubError {}

    #[test]
    fn new_deferred_is_pending() {
        let deferred: Deferred<i32> = Deferred::new();
        assert_eq!(deferred.state(), DeferredState::Pending);
        assert!(!deferred.is_fired());
    }

    #[test]
    fn resolve_transitions_to_succeeded() {
        let deferred = Deferred::new();
        deferred.resolve(42).unwrap();
        assert_eq!(deferred.state(), DeferredState::Succeeded);
        deferred.inspect(|completion| match completion {
            Completion::Succeeded(value) => assert_eq!(*value, 42),
            other => panic!("expected succeeded, got {other:?}"),
        });
    }

    #[test]
    fn reject_transitions_to_failed() {
        let deferred: Deferred<i32> = Deferred::new();
        deferred.reject(Failure::new(StubError("boom"))).unwrap();
        assert_eq!(deferred.state(), DeferredState::Failed);
    }

    #[test]
    fn double_fire_is_an_error_and_keeps_first_result() {
        let deferred = Deferred::new();
        deferred.resolve(1).unwrap();
        assert!(matches!(deferred.resolve(2), Err(Error::AlreadyCompleted)));
        assert!(matches!(
            deferred.reject(Failure::new(StubError("late"))),
            Err(Error::AlreadyCompleted)
        ));
        deferred.inspect(|completion| match completion {
            Completion::Succeeded(value) => assert_eq!(*value, 1),
            other => panic!("expected succeeded, got {other:?}"),
        });
    }

    #[test]
    fn success_callback_receives_value_on_fire() {
        let deferred = Deferred::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        deferred.on_success(move |value| sink.lock().push(*value)).unwrap();
        assert!(seen.lock().is_empty());
        deferred.resolve(7).unwrap();
        assert_eq!(*seen.lock(), vec![7]);
    }

    #[test]
    fn failure_callback_receives_failure_on_fire() {
        let deferred: Deferred<i32> = Deferred::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        deferred
            .on_failure(move |failure| sink.lock().push(failure.clone()))
            .unwrap();
        let failure = Failure::new(StubError("boom"));
        deferred.reject(failure.clone()).unwrap();
        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ptr_eq(&failure));
    }

    #[test]
    fn callback_registered_after_fire_runs_immediately() {
        let deferred = Deferred::succeeded(9);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        deferred.on_success(move |value| sink.lock().push(*value)).unwrap();
        assert_eq!(*seen.lock(), vec![9]);
    }

    #[test]
    fn second_callback_registration_is_an_error() {
        let deferred: Deferred<i32> = Deferred::new();
        deferred.on_success(|_| {}).unwrap();
        assert!(matches!(
            deferred.on_success(|_| {}),
            Err(Error::CallbackAlreadyRegistered("success"))
        ));
        deferred.on_failure(|_| {}).unwrap();
        assert!(matches!(
            deferred.on_failure(|_| {}),
            Err(Error::CallbackAlreadyRegistered("failure"))
        ));
    }

    #[test]
    fn failure_callback_never_runs_on_success() {
        let deferred = Deferred::new();
        deferred.on_failure(|_| panic!("failure callback on a success")).unwrap();
        deferred.resolve(1).unwrap();
    }

    #[test]
    fn clones_share_completion() {
        let deferred: Deferred<i32> = Deferred::new();
        let observer = deferred.clone();
        deferred.resolve(3).unwrap();
        assert_eq!(observer.state(), DeferredState::Succeeded);
    }

    #[test]
    fn debug_rendering_tracks_state() {
        let deferred: Deferred<i32> = Deferred::new();
        assert_eq!(format!("{deferred:?}"), "Deferred(pending)");
        deferred.resolve(42).unwrap();
        assert_eq!(format!("{deferred:?}"), "Deferred(succeeded: 42)");

        let failed: Deferred<i32> = Deferred::failed(Failure::new(StubError("boom")));
        assert!(format!("{failed:?}").starts_with("Deferred(failed: "));
    }
}

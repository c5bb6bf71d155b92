//! Awaiting a deferred.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::future::FusedFuture;

use super::{Failure, Shared, State};

/// Future returned by [`Deferred::wait`](super::Deferred::wait).
///
/// Resolves to `Ok(value)` or `Err(failure)` once the deferred fires,
/// cloning the stored result so the deferred stays readable. Any number of
/// `Wait` futures may observe the same deferred concurrently.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::Deferred;
///
/// let deferred = Deferred::new();
/// let wait = deferred.wait();
///
/// deferred.resolve("done").unwrap();
/// assert_eq!(futures::executor::block_on(wait), Ok("done"));
/// ```
#[must_use = "futures do nothing unless polled"]
pub struct Wait<T> {
    shared: Arc<Shared<T>>,
    terminated: bool,
}

impl<T> Wait<T> {
    pub(super) fn new(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared,
            terminated: false,
        }
    }
}

impl<T: Clone> Future for Wait<T> {
    type Output = Result<T, Failure>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut guard = this.shared.inner.lock();
        let inner = &mut *guard;
        match &inner.state {
            State::Pending => {
                if !inner.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    inner.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
            State::Succeeded(value) => {
                let value = value.clone();
                this.terminated = true;
                Poll::Ready(Ok(value))
            }
            State::Failed(failure) => {
                let failure = failure.clone();
                this.terminated = true;
                Poll::Ready(Err(failure))
            }
        }
    }
}

impl<T: Clone> FusedFuture for Wait<T> {
    fn is_terminated(&self) -> bool {
        self.terminated
    }
}

#[cfg(test)]
mod tests {
    use crate::deferred::Deferred;
    use crate::Failure;
    use futures::task::noop_waker;
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use futures_core::future::FusedFuture;

    #[derive(Debug)]
    struct StubError;

    impl fmt::Display for StubError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "stub")
        }
    }

    impl std::error::Error for StubError {}

    fn poll_once<F: Future>(future: &mut F) -> Poll<F::Output>
    where
        F: Unpin,
    {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        Pin::new(future).poll(&mut cx)
    }

    #[test]
    fn pending_until_fired() {
        let deferred: Deferred<i32> = Deferred::new();
        let mut wait = deferred.wait();
        assert!(poll_once(&mut wait).is_pending());
        assert!(!wait.is_terminated());

        deferred.resolve(5).unwrap();
        assert_eq!(poll_once(&mut wait), Poll::Ready(Ok(5)));
        assert!(wait.is_terminated());
    }

    #[test]
    fn ready_with_failure() {
        let deferred: Deferred<i32> = Deferred::new();
        let mut wait = deferred.wait();
        let failure = Failure::new(StubError);
        deferred.reject(failure.clone()).unwrap();

        match poll_once(&mut wait) {
            Poll::Ready(Err(observed)) => assert!(observed.ptr_eq(&failure)),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn multiple_waiters_all_complete() {
        let deferred: Deferred<i32> = Deferred::new();
        let mut first = deferred.wait();
        let mut second = deferred.wait();
        assert!(poll_once(&mut first).is_pending());
        assert!(poll_once(&mut second).is_pending());

        deferred.resolve(11).unwrap();
        assert_eq!(poll_once(&mut first), Poll::Ready(Ok(11)));
        assert_eq!(poll_once(&mut second), Poll::Ready(Ok(11)));
    }

    #[test]
    fn waiting_does_not_consume_the_result() {
        let deferred = Deferred::succeeded(3);
        assert_eq!(futures::executor::block_on(deferred.wait()), Ok(3));
        assert_eq!(futures::executor::block_on(deferred.wait()), Ok(3));
    }
}

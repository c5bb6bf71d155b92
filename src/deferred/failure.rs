//! Failure wrapper for failed deferreds.
//!
//! A [`Failure`] captures an error together with the trace recorded at the
//! moment it was wrapped, so a diagnostic rendering is available however far
//! from the failure site the deferred is eventually inspected.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

struct FailureInner {
    error: Box<dyn StdError + Send + Sync>,
    type_name: &'static str,
    trace: Backtrace,
}

/// An error captured together with its originating trace.
///
/// `Failure` is cheap to clone; clones share the captured error and trace,
/// and [`ptr_eq`](Failure::ptr_eq) tells whether two handles refer to the
/// same capture.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::Failure;
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Broken;
///
/// impl fmt::Display for Broken {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "it broke")
///     }
/// }
///
/// impl std::error::Error for Broken {}
///
/// let failure = Failure::new(Broken);
/// assert_eq!(failure.type_name(), "Broken");
/// assert!(failure.downcast_ref::<Broken>().is_some());
/// ```
#[derive(Clone)]
pub struct Failure {
    inner: Arc<FailureInner>,
}

impl Failure {
    /// Wrap an error, capturing the current backtrace.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(FailureInner {
                error: Box::new(error),
                type_name: std::any::type_name::<E>(),
                trace: Backtrace::capture(),
            }),
        }
    }

    /// The wrapped error.
    #[must_use]
    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner.error
    }

    /// Downcast the wrapped error to a concrete type.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.error.downcast_ref::<E>()
    }

    /// The unqualified type name of the wrapped error.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner
            .type_name
            .rsplit("::")
            .next()
            .unwrap_or(self.inner.type_name)
    }

    /// The backtrace captured when the error was wrapped.
    #[must_use]
    pub fn trace(&self) -> &Backtrace {
        &self.inner.trace
    }

    /// Render the error type, message, and trace as diagnostic text.
    #[must_use]
    pub fn render_traceback(&self) -> String {
        format!(
            "{}: {}\nstack backtrace:\n{}",
            self.type_name(),
            self.inner.error,
            self.inner.trace
        )
    }

    /// Check whether two handles refer to the same captured failure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Failures compare by identity: two handles are equal only when they refer
/// to the same capture.
impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Failure {}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failure({}: {})", self.type_name(), self.inner.error)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner.error, f)
    }
}

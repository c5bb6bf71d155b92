// Allow must_use_candidate for matcher factory functions since returning the matcher
// without using it is the common pattern for test setup
#![allow(clippy::must_use_candidate)]

//! Matchers over the completion state of a deferred.
//!
//! - [`no_result`] - the deferred has not fired yet
//! - [`successful`] - the deferred fired successfully and its value satisfies
//!   an inner matcher
//!
//! Both matchers are pure observers: they never register, consume, or disturb
//! the deferred's callbacks, so a deferred can be asserted on and then fired
//! with its real observers still in place.

use std::fmt::Debug;

use crate::deferred::{Completion, Deferred};

use super::{Content, MatchResult, Matcher, Mismatch};

/// Create a matcher for deferreds that have not fired yet.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::{assert_that, Deferred};
/// use deferred_testkit::matchers::no_result;
///
/// let deferred: Deferred<i32> = Deferred::new();
/// assert_that!(deferred, no_result());
///
/// // The assertion left the deferred untouched; it still fires normally.
/// deferred.resolve(42).unwrap();
/// ```
pub fn no_result() -> NoResult {
    NoResult
}

/// Matcher that matches deferreds which have not fired.
pub struct NoResult;

impl<T: Debug> Matcher<Deferred<T>> for NoResult {
    fn matches(&self, deferred: &Deferred<T>) -> MatchResult {
        // Render the deferred before taking its lock in inspect.
        let subject = format!("{deferred:?}");
        deferred.inspect(|completion| match completion {
            Completion::Pending => MatchResult::Match,
            Completion::Succeeded(value) => MatchResult::Mismatch(Mismatch::new(format!(
                "{subject} has already fired with {value:?}"
            ))),
            Completion::Failed(failure) => MatchResult::Mismatch(Mismatch::new(format!(
                "{subject} has already fired with {failure:?}"
            ))),
        })
    }

    fn describe(&self) -> String {
        "has not fired".to_string()
    }
}

/// Create a matcher for deferreds that fired successfully with a matching
/// value.
///
/// The inner matcher is applied to the success value and its outcome is
/// propagated verbatim. A pending deferred mismatches with "has not fired";
/// a failed deferred mismatches with a `"traceback"` detail rendered from
/// the failure.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::{assert_that, Deferred};
/// use deferred_testkit::matchers::{eq, successful};
///
/// let deferred = Deferred::succeeded(42);
/// assert_that!(deferred, successful(eq(42)));
/// ```
pub fn successful<M>(matcher: M) -> Successful<M> {
    Successful { matcher }
}

/// Matcher that matches successfully-fired deferreds through an inner
/// matcher.
pub struct Successful<M> {
    matcher: M,
}

impl<T: Debug, M: Matcher<T>> Matcher<Deferred<T>> for Successful<M> {
    fn matches(&self, deferred: &Deferred<T>) -> MatchResult {
        // Render the deferred before taking its lock in inspect.
        let subject = format!("{deferred:?}");
        deferred.inspect(|completion| match completion {
            Completion::Pending => {
                MatchResult::Mismatch(Mismatch::new(format!("{subject} has not fired")))
            }
            Completion::Failed(failure) => MatchResult::Mismatch(
                Mismatch::new(format!(
                    "Success result expected on {subject}, found failure result instead: {failure:?}"
                ))
                .with_detail("traceback", Content::traceback(failure)),
            ),
            Completion::Succeeded(value) => self.matcher.matches(value),
        })
    }

    fn describe(&self) -> String {
        format!("fired successfully with a value that {}", self.matcher.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::Failure;
    use crate::matchers::eq;
    use std::fmt;

    #[derive(Debug)]
    struct RuntimeError(&'static str);

    impl fmt::Display for RuntimeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for RuntimeError {}

    #[test]
    fn no_result_matches_unfired() {
        let deferred: Deferred<i32> = Deferred::new();
        assert_eq!(no_result().matches(&deferred), MatchResult::Match);
    }

    #[test]
    fn no_result_mismatches_succeeded() {
        let deferred = Deferred::succeeded(42);
        let mismatch = no_result().matches(&deferred).into_mismatch().unwrap();
        assert_eq!(
            mismatch.describe(),
            format!("{deferred:?} has already fired with 42")
        );
        assert!(mismatch.details().is_empty());
    }

    #[test]
    fn no_result_mismatches_failed() {
        let failure = Failure::new(RuntimeError("arbitrary failure"));
        let deferred: Deferred<i32> = Deferred::failed(failure.clone());
        let mismatch = no_result().matches(&deferred).into_mismatch().unwrap();
        assert_eq!(
            mismatch.describe(),
            format!("{deferred:?} has already fired with {failure:?}")
        );
        assert!(mismatch.details().is_empty());
    }

    #[test]
    fn successful_matches_through_inner_matcher() {
        let deferred = Deferred::succeeded(42);
        assert_eq!(successful(eq(42)).matches(&deferred), MatchResult::Match);
    }

    #[test]
    fn successful_propagates_inner_mismatch_verbatim() {
        let deferred = Deferred::succeeded(42);
        let inner = eq(0);
        assert_eq!(successful(eq(0)).matches(&deferred), inner.matches(&42));
    }

    #[test]
    fn successful_mismatches_unfired() {
        let deferred: Deferred<i32> = Deferred::new();
        let mismatch = successful(eq(0)).matches(&deferred).into_mismatch().unwrap();
        assert_eq!(mismatch.describe(), format!("{deferred:?} has not fired"));
        assert!(mismatch.details().is_empty());
    }

    #[test]
    fn successful_mismatches_failed_with_traceback_detail() {
        let failure = Failure::new(RuntimeError("arbitrary failure"));
        let deferred: Deferred<i32> = Deferred::failed(failure.clone());
        let mismatch = successful(eq(0)).matches(&deferred).into_mismatch().unwrap();
        assert_eq!(
            mismatch.describe(),
            format!(
                "Success result expected on {deferred:?}, found failure result instead: {failure:?}"
            )
        );
        assert_eq!(mismatch.details().len(), 1);
        assert_eq!(
            mismatch.details()["traceback"],
            Content::traceback(&failure)
        );
        assert_eq!(
            mismatch.details()["traceback"].content_type(),
            "text/x-traceback"
        );
    }

    #[test]
    fn matching_twice_yields_identical_results() {
        let deferred = Deferred::succeeded(42);
        assert_eq!(
            no_result().matches(&deferred),
            no_result().matches(&deferred)
        );
        assert_eq!(
            successful(eq(0)).matches(&deferred),
            successful(eq(0)).matches(&deferred)
        );
    }
}

// Allow must_use_candidate for matcher factory functions since returning the matcher
// without using it is the common pattern for test setup
#![allow(clippy::must_use_candidate)]

//! Built-in value matchers.
//!
//! These cover the generic comparisons a deferred's success value is usually
//! checked with: [`eq`], [`anything`], [`satisfies`], plus the [`not`] and
//! [`all_of`] combinators.

use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Content, MatchResult, Matcher, Mismatch};

/// Create an equality matcher.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::matchers::{eq, Matcher};
///
/// assert!(eq(42).matches(&42).is_match());
/// assert!(!eq(42).matches(&0).is_match());
/// ```
pub fn eq<T: PartialEq + Debug>(expected: T) -> EqMatcher<T> {
    EqMatcher { expected }
}

/// Matcher for equality.
pub struct EqMatcher<T> {
    expected: T,
}

impl<T: PartialEq + Debug> Matcher<T> for EqMatcher<T> {
    fn matches(&self, value: &T) -> MatchResult {
        if *value == self.expected {
            MatchResult::Match
        } else {
            MatchResult::Mismatch(Mismatch::new(format!(
                "{:?} does not equal {:?}",
                value, self.expected
            )))
        }
    }

    fn describe(&self) -> String {
        format!("equals {:?}", self.expected)
    }
}

/// Create a matcher that always matches.
pub fn anything<T>() -> AnythingMatcher<T> {
    AnythingMatcher {
        _phantom: PhantomData,
    }
}

/// Matcher that matches anything.
pub struct AnythingMatcher<T> {
    _phantom: PhantomData<T>,
}

impl<T> Matcher<T> for AnythingMatcher<T> {
    fn matches(&self, _value: &T) -> MatchResult {
        MatchResult::Match
    }

    fn describe(&self) -> String {
        "anything".to_string()
    }
}

/// Create a predicate-based matcher.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::matchers::{satisfies, Matcher};
///
/// let m = satisfies(|x: &i32| x % 2 == 0, "is even");
/// assert!(m.matches(&4).is_match());
/// assert!(!m.matches(&3).is_match());
/// ```
pub fn satisfies<T, F>(predicate: F, description: &str) -> PredicateMatcher<T, F>
where
    F: Fn(&T) -> bool,
{
    PredicateMatcher {
        predicate,
        description: description.to_string(),
        _phantom: PhantomData,
    }
}

/// Matcher based on a predicate function.
pub struct PredicateMatcher<T, F> {
    predicate: F,
    description: String,
    _phantom: PhantomData<T>,
}

impl<T: Debug, F: Fn(&T) -> bool> Matcher<T> for PredicateMatcher<T, F> {
    fn matches(&self, value: &T) -> MatchResult {
        if (self.predicate)(value) {
            MatchResult::Match
        } else {
            MatchResult::Mismatch(Mismatch::new(format!(
                "{:?} does not satisfy: {}",
                value, self.description
            )))
        }
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Create a negating matcher.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::matchers::{eq, not, Matcher};
///
/// assert!(not(eq(0)).matches(&1).is_match());
/// assert!(!not(eq(0)).matches(&0).is_match());
/// ```
pub fn not<T, M: Matcher<T> + 'static>(matcher: M) -> NotMatcher<T> {
    NotMatcher {
        inner: Box::new(matcher),
    }
}

/// Matcher that negates another matcher.
pub struct NotMatcher<T: ?Sized> {
    inner: Box<dyn Matcher<T>>,
}

impl<T: Debug> Matcher<T> for NotMatcher<T> {
    fn matches(&self, value: &T) -> MatchResult {
        match self.inner.matches(value) {
            MatchResult::Match => MatchResult::Mismatch(Mismatch::new(format!(
                "{:?} unexpectedly matched: {}",
                value,
                self.inner.describe()
            ))),
            MatchResult::Mismatch(_) => MatchResult::Match,
        }
    }

    fn describe(&self) -> String {
        format!("not {}", self.inner.describe())
    }
}

/// Create a matcher that matches when all inner matchers match.
///
/// The mismatch carries each failing matcher's own mismatch as a detail.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::matchers::{all_of, satisfies, Matcher};
///
/// // Distinct matcher types must be boxed to share a vector.
/// let positive: Box<dyn Matcher<i32>> = Box::new(satisfies(|x: &i32| *x > 0, "is positive"));
/// let small: Box<dyn Matcher<i32>> = Box::new(satisfies(|x: &i32| *x < 100, "is small"));
///
/// let m = all_of(vec![positive, small]);
/// assert!(m.matches(&50).is_match());
/// assert!(!m.matches(&150).is_match());
/// ```
pub fn all_of<T, M>(matchers: Vec<M>) -> AllOfMatcher<T>
where
    M: Matcher<T> + 'static,
{
    AllOfMatcher {
        matchers: matchers
            .into_iter()
            .map(|m| Box::new(m) as Box<dyn Matcher<T>>)
            .collect(),
    }
}

/// Matcher that requires all inner matchers to match.
pub struct AllOfMatcher<T: ?Sized> {
    matchers: Vec<Box<dyn Matcher<T>>>,
}

impl<T> Matcher<T> for AllOfMatcher<T> {
    fn matches(&self, value: &T) -> MatchResult {
        let mut failures = Vec::new();
        for matcher in &self.matchers {
            if let MatchResult::Mismatch(mismatch) = matcher.matches(value) {
                failures.push((matcher.describe(), mismatch));
            }
        }
        if failures.is_empty() {
            return MatchResult::Match;
        }
        let descriptions: Vec<_> = failures
            .iter()
            .map(|(_, mismatch)| mismatch.describe().to_string())
            .collect();
        let mut combined = Mismatch::new(format!("failed: {}", descriptions.join("; ")));
        for (expectation, mismatch) in failures {
            combined = combined.with_detail(expectation, Content::text(mismatch.describe()));
        }
        MatchResult::Mismatch(combined)
    }

    fn describe(&self) -> String {
        let descriptions: Vec<_> = self.matchers.iter().map(|m| m.describe()).collect();
        format!("all of [{}]", descriptions.join(", "))
    }
}

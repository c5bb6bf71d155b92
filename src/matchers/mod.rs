//! Structured matchers for test assertions.
//!
//! This module provides a matcher system whose outcomes are structured
//! objects rather than bare booleans:
//!
//! - [`Matcher`] trait for custom matchers
//! - [`MatchResult`] - explicit match / mismatch outcome
//! - [`Mismatch`] - a failed match with a description and labelled details
//! - Built-in matchers: [`eq`], [`anything`], [`satisfies`], [`not`], [`all_of`]
//! - Deferred matchers: [`no_result`], [`successful`]
//!
//! # Example
//!
//! ```rust
//! use deferred_testkit::{assert_that, Deferred};
//! use deferred_testkit::matchers::{eq, no_result, successful};
//!
//! let deferred: Deferred<i32> = Deferred::new();
//! assert_that!(deferred, no_result());
//!
//! deferred.resolve(42).unwrap();
//! assert_that!(deferred, successful(eq(42)));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::deferred::Failure;

mod basic;
mod deferred;

pub use basic::{
    all_of, anything, eq, not, satisfies, AllOfMatcher, AnythingMatcher, EqMatcher, NotMatcher,
    PredicateMatcher,
};
pub use deferred::{no_result, successful, NoResult, Successful};

/// A matcher producing a structured outcome.
///
/// Implementations must be read-only observers of the value they match; a
/// second call on an unchanged value yields the same outcome.
///
/// # Implementing Custom Matchers
///
/// ```rust
/// use deferred_testkit::matchers::{MatchResult, Matcher, Mismatch};
///
/// struct IsEven;
///
/// impl Matcher<i32> for IsEven {
///     fn matches(&self, value: &i32) -> MatchResult {
///         if value % 2 == 0 {
///             MatchResult::Match
///         } else {
///             MatchResult::Mismatch(Mismatch::new(format!("{value} is odd")))
///         }
///     }
///
///     fn describe(&self) -> String {
///         "is even".to_string()
///     }
/// }
///
/// assert!(IsEven.matches(&4).is_match());
/// assert!(!IsEven.matches(&3).is_match());
/// ```
pub trait Matcher<T: ?Sized> {
    /// Match the value, returning a structured outcome.
    fn matches(&self, value: &T) -> MatchResult;

    /// Describe what this matcher expects.
    fn describe(&self) -> String;
}

/// Outcome of a match.
///
/// Success is an explicit variant, not an absence of value, so outcomes can
/// be compared and propagated exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// The value matched.
    Match,
    /// The value did not match; the mismatch explains why.
    Mismatch(Mismatch),
}

impl MatchResult {
    /// Returns `true` if the value matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }

    /// Borrow the mismatch, if any.
    #[must_use]
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Match => None,
            Self::Mismatch(mismatch) => Some(mismatch),
        }
    }

    /// Consume the outcome, returning the mismatch if any.
    #[must_use]
    pub fn into_mismatch(self) -> Option<Mismatch> {
        match self {
            Self::Match => None,
            Self::Mismatch(mismatch) => Some(mismatch),
        }
    }
}

/// A failed match: a human-readable description plus labelled diagnostic
/// details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    description: String,
    details: BTreeMap<String, Content>,
}

impl Mismatch {
    /// Create a mismatch with a description and no details.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            details: BTreeMap::new(),
        }
    }

    /// Attach a labelled detail.
    #[must_use]
    pub fn with_detail(mut self, label: impl Into<String>, content: Content) -> Self {
        self.details.insert(label.into(), content);
        self
    }

    /// The human-readable description.
    #[must_use]
    pub fn describe(&self) -> &str {
        &self.description
    }

    /// The labelled details.
    #[must_use]
    pub fn details(&self) -> &BTreeMap<String, Content> {
        &self.details
    }

    /// Render all details as indented text, one block per label.
    ///
    /// Returns an empty string when there are no details.
    #[must_use]
    pub fn render_details(&self) -> String {
        let mut rendered = String::new();
        for (label, content) in &self.details {
            rendered.push_str(&format!("\n  {label}:\n"));
            for line in content.as_text().lines() {
                rendered.push_str(&format!("    {line}\n"));
            }
        }
        rendered
    }
}

/// Renderable diagnostic content attached to a [`Mismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    content_type: String,
    text: String,
}

impl Content {
    /// Plain-text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain".to_string(),
            text: text.into(),
        }
    }

    /// Traceback content rendered from a captured failure.
    #[must_use]
    pub fn traceback(failure: &Failure) -> Self {
        Self {
            content_type: "text/x-traceback".to_string(),
            text: failure.render_traceback(),
        }
    }

    /// The content type label.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The content as text.
    #[must_use]
    pub fn as_text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// Allow boxed matchers to nest inside combinators.
impl<T: ?Sized> Matcher<T> for Box<dyn Matcher<T>> {
    fn matches(&self, value: &T) -> MatchResult {
        (**self).matches(value)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Run a matcher against a value, pairing any mismatch with the matcher's
/// expectation.
///
/// Backs the [`assert_that!`] macro. Matching and describing go through one
/// generic call so the matched type is inferred from the value; matchers
/// whose impls are generic over the matched type (such as [`no_result`])
/// stay unambiguous.
pub fn check<T: ?Sized, M: Matcher<T>>(value: &T, matcher: &M) -> Option<(Mismatch, String)> {
    match matcher.matches(value) {
        MatchResult::Match => None,
        MatchResult::Mismatch(mismatch) => Some((mismatch, matcher.describe())),
    }
}

/// Assert that a value matches a matcher.
///
/// # Panics
///
/// Panics with the mismatch description (and any rendered details) if the
/// value doesn't match.
///
/// # Example
///
/// ```rust
/// use deferred_testkit::{assert_that, matchers::eq};
///
/// assert_that!(42, eq(42));
/// ```
#[macro_export]
macro_rules! assert_that {
    ($value:expr, $matcher:expr) => {{
        let value = &$value;
        let matcher = &$matcher;
        if let Some((mismatch, expected)) = $crate::matchers::check(value, matcher) {
            panic!(
                "assertion failed: {}\n  expected: {}{}",
                mismatch.describe(),
                expected,
                mismatch.render_details(),
            );
        }
    }};
    ($value:expr, $matcher:expr, $($arg:tt)+) => {{
        let value = &$value;
        let matcher = &$matcher;
        if let Some((mismatch, expected)) = $crate::matchers::check(value, matcher) {
            panic!(
                "assertion failed: {}\n  expected: {}\n  message: {}{}",
                mismatch.describe(),
                expected,
                format_args!($($arg)+),
                mismatch.render_details(),
            );
        }
    }};
}

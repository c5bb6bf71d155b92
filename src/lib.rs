//! # deferred-testkit
//!
//! > One-shot deferred values and structured matchers for async test assertions
//!
//! **deferred-testkit** provides a [`Deferred`] container for values that
//! arrive at most once, and matchers that assert on its completion state
//! with structured, detail-carrying mismatch reports.
//!
//! ## Quick Start
//!
//! ```rust
//! use deferred_testkit::{assert_that, Deferred};
//! use deferred_testkit::matchers::{eq, no_result, successful};
//!
//! let deferred: Deferred<i32> = Deferred::new();
//!
//! // Nothing has fired yet.
//! assert_that!(deferred, no_result());
//!
//! // Fire the deferred, then assert on the delivered value.
//! deferred.resolve(42).unwrap();
//! assert_that!(deferred, successful(eq(42)));
//! ```
//!
//! ## Features
//!
//! - **One-shot deferreds** - pending, succeeded, or failed, never fired twice
//! - **Read-only matchers** - asserting never disturbs callbacks or state
//! - **Structured mismatches** - descriptions plus labelled diagnostic details
//! - **Failure capture** - errors wrapped with the trace from the failure site
//! - **Awaitable** - a deferred can be awaited from any executor

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod deferred;
pub mod error;
pub mod matchers;

/// Prelude for convenient imports
///
/// ```rust
/// use deferred_testkit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::deferred::{Completion, Deferred, DeferredState, Failure, Wait};
    pub use crate::error::{Error, Result};
    pub use crate::matchers::{
        anything, eq, no_result, not, satisfies, successful, MatchResult, Matcher, Mismatch,
    };
}

// Re-exports
pub use deferred::{Deferred, DeferredState, Failure};
pub use error::{Error, Result};

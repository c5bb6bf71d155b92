//! Error definitions
//!
//! This module provides error types for deferred-testkit.

use thiserror::Error;

/// Main error type for deferred-testkit
#[derive(Error, Debug)]
pub enum Error {
    /// A deferred was completed a second time.
    #[error("deferred has already been completed")]
    AlreadyCompleted,

    /// A completion callback of this kind was already registered.
    #[error("a {0} callback is already registered on this deferred")]
    CallbackAlreadyRegistered(&'static str),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for middleware-compose.

use thiserror::Error;

/// Boxed error produced by user middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for composing and running middleware chains.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The stack handed to a dynamic constructor was not a sequence of middleware.
    #[error("Type constraint violated: {0}")]
    TypeConstraint(String),

    /// A continuation tried to re-enter a position that was already entered.
    #[error("next() called more than once (position {position})")]
    DoubleInvocation {
        /// Stack position the rejected call pointed at.
        position: usize,
    },

    /// Failure raised by a middleware or terminal.
    #[error("Middleware failed: {0}")]
    Handler(#[source] BoxError),
}

impl ComposeError {
    /// Wrap an arbitrary error raised inside a middleware.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Handler(err.into())
    }

    /// Build a middleware failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Handler(message.into())
    }

    /// True if this is a rejected repeated `next()` call.
    pub fn is_double_invocation(&self) -> bool {
        matches!(self, Self::DoubleInvocation { .. })
    }
}

/// Result type alias using ComposeError.
pub type Result<T> = std::result::Result<T, ComposeError>;

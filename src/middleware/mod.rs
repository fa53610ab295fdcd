//! Middleware module - the handler trait and the continuation.
//!
//! Provides:
//! - [`Middleware`] - one step of a chain
//! - [`Next`] - continuation that enters the following position
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use middleware_compose::middleware::{middleware_fn, Next, SharedMiddleware};
//!
//! let timing: SharedMiddleware<(), u64> =
//!     middleware_fn(|_ctx: Arc<()>, next: Next<(), u64>| async move {
//!         let downstream = next.run().await?;
//!         Ok(downstream + 1)
//!     });
//! assert!(!timing.name().is_empty());
//! ```

mod handler;
mod next;

pub use handler::{
    middleware_fn, named_fn, BoxFuture, FnMiddleware, Middleware, SharedMiddleware,
};
pub use next::Next;

pub(crate) use next::{advance, RunState};

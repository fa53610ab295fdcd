//! # middleware-compose
//!
//! Compose an ordered stack of async middleware into a single runner.
//!
//! Each middleware receives the run's shared context and a [`Next`]
//! continuation. Awaiting `next.run()` enters the following position and
//! resumes once everything downstream has settled, so code after the await
//! runs on the way back up in reverse order.
//!
//! ## Guarantees
//!
//! - Positions are entered in increasing order, each at most once per run.
//!   A repeated `next.run()` fails with [`ComposeError::DoubleInvocation`].
//! - Every middleware of a run sees the same `Arc` context.
//! - Failures propagate upward until some middleware handles the `Err`.
//! - The stack is snapshotted when composed; runs never share a cursor.
//!
//! ## Example
//!
//! ```
//! use std::sync::Mutex;
//! use middleware_compose::Composer;
//!
//! #[derive(Default)]
//! struct Request {
//!     log: Mutex<Vec<&'static str>>,
//! }
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let chain = Composer::<Request, u16>::new()
//!     .with_named("logger", |ctx, next| async move {
//!         ctx.log.lock().unwrap().push("logger in");
//!         let status = next.run().await?;
//!         ctx.log.lock().unwrap().push("logger out");
//!         Ok(status)
//!     })
//!     .with_named("router", |ctx, _next| async move {
//!         ctx.log.lock().unwrap().push("router");
//!         Ok(200)
//!     })
//!     .build();
//!
//! let req = std::sync::Arc::new(Request::default());
//! assert_eq!(chain.run(req.clone()).await.unwrap(), 200);
//! assert_eq!(*req.log.lock().unwrap(), ["logger in", "router", "logger out"]);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod schema;

mod composer;

pub use composer::{compose, Composed, Composer};
pub use config::ComposeConfig;
pub use error::{ComposeError, Result};
pub use middleware::{middleware_fn, named_fn, BoxFuture, Middleware, Next, SharedMiddleware};

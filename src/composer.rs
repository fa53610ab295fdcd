//! Composer builder and the composed runner.
//!
//! The [`Composer`] provides a fluent API for assembling a stack. Building it
//! (or calling [`compose`] on a slice) snapshots the stack into a
//! [`Composed`] runner. Each call to [`Composed::run`] then:
//! 1. Wraps the context in a single `Arc`
//! 2. Creates a fresh cursor for this run
//! 3. Enters position 0 and returns its future
//!
//! # Example
//!
//! ```
//! use middleware_compose::Composer;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let chain = Composer::<(), i32>::new()
//!     .with(|_ctx, next| async move { Ok(next.run().await? + 1) })
//!     .with(|_ctx, next| async move { Ok(next.run().await? * 10) })
//!     .label("math")
//!     .build();
//!
//! let out = chain.run_with_fn((), |_ctx, _next| async { Ok(4) }).await.unwrap();
//! assert_eq!(out, 41);
//! # });
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tracing::Instrument;

use crate::config::ComposeConfig;
use crate::error::{ComposeError, Result};
use crate::middleware::{
    advance, BoxFuture, FnMiddleware, Middleware, Next, RunState, SharedMiddleware,
};
use crate::schema::ChainSchema;

/// Compose a stack into a runner.
///
/// The slice is copied; pushing to the source vector afterwards does not
/// change the returned runner.
pub fn compose<C, T>(stack: &[SharedMiddleware<C, T>]) -> Composed<C, T>
where
    C: 'static,
    T: 'static,
{
    Composed::new(stack.into(), &ComposeConfig::default())
}

/// Builder for assembling a middleware stack.
pub struct Composer<C, T> {
    stack: Vec<SharedMiddleware<C, T>>,
    config: ComposeConfig,
}

impl<C, T> Composer<C, T>
where
    C: Send + Sync + 'static,
    T: Default + Send + 'static,
{
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            config: ComposeConfig::default(),
        }
    }

    /// Append a closure middleware.
    pub fn with<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Arc<C>, Next<C, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.stack.push(Arc::new(FnMiddleware::<F, C, T>::new(handler)));
        self
    }

    /// Append a closure middleware under an explicit name.
    pub fn with_named<F, Fut>(mut self, name: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: Fn(Arc<C>, Next<C, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.stack
            .push(Arc::new(FnMiddleware::<F, C, T>::named(name, handler)));
        self
    }

    /// Append an already shared middleware (including another [`Composed`]).
    pub fn with_middleware(mut self, middleware: SharedMiddleware<C, T>) -> Self {
        self.stack.push(middleware);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ComposeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the chain label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    /// Number of middleware added so far.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Check if no middleware was added.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Freeze the stack into a runner.
    pub fn build(self) -> Composed<C, T> {
        Composed::new(self.stack.into(), &self.config)
    }

    /// Compose a stack that was assembled without static types.
    ///
    /// Accepts either a `Vec<SharedMiddleware<C, T>>` or a
    /// `Vec<Box<dyn Any + Send + Sync>>` whose elements are all
    /// `SharedMiddleware<C, T>`. Anything else is a
    /// [`ComposeError::TypeConstraint`].
    pub fn from_any(stack: &dyn Any) -> Result<Composed<C, T>> {
        if let Some(typed) = stack.downcast_ref::<Vec<SharedMiddleware<C, T>>>() {
            return Ok(compose(typed));
        }

        let items = stack
            .downcast_ref::<Vec<Box<dyn Any + Send + Sync>>>()
            .ok_or_else(|| {
                ComposeError::TypeConstraint("middleware stack must be a Vec".to_string())
            })?;

        let mut collected = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let middleware = (**item)
                .downcast_ref::<SharedMiddleware<C, T>>()
                .ok_or_else(|| {
                    ComposeError::TypeConstraint(format!(
                        "stack element {} is not a middleware",
                        position
                    ))
                })?;
            collected.push(Arc::clone(middleware));
        }

        Ok(compose(&collected))
    }
}

impl<C, T> Default for Composer<C, T>
where
    C: Send + Sync + 'static,
    T: Default + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A composed chain, ready to run.
///
/// Cloning shares the same immutable stack. Every run gets its own cursor,
/// so runs on the same `Composed` never interfere.
pub struct Composed<C, T> {
    stack: Arc<[SharedMiddleware<C, T>]>,
    label: Arc<str>,
    instrument: bool,
}

impl<C, T> Composed<C, T>
where
    C: 'static,
    T: 'static,
{
    fn new(stack: Arc<[SharedMiddleware<C, T>]>, config: &ComposeConfig) -> Self {
        Self {
            stack,
            label: Arc::from(config.label.as_str()),
            instrument: config.instrument,
        }
    }

    /// Number of middleware in the stack.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Chain label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Middleware names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.stack.iter().map(|m| m.name().to_string()).collect()
    }

    /// Describe the chain.
    pub fn schema(&self) -> ChainSchema {
        let mut schema = ChainSchema::new(&self.label);
        for middleware in self.stack.iter() {
            schema.add_handler(middleware.name());
        }
        schema
    }
}

impl<C, T> Composed<C, T>
where
    C: Send + Sync + 'static,
    T: Default + Send + 'static,
{
    /// Run the chain without a terminal.
    ///
    /// Proceeding past the last middleware yields `T::default()`.
    pub fn run(&self, ctx: impl Into<Arc<C>>) -> BoxFuture<'static, Result<T>> {
        self.start(ctx.into(), None)
    }

    /// Run the chain with a terminal entered after the last middleware.
    pub fn run_with(
        &self,
        ctx: impl Into<Arc<C>>,
        terminal: SharedMiddleware<C, T>,
    ) -> BoxFuture<'static, Result<T>> {
        self.start(ctx.into(), Some(terminal))
    }

    /// Run the chain with a closure as terminal.
    pub fn run_with_fn<F, Fut>(
        &self,
        ctx: impl Into<Arc<C>>,
        terminal: F,
    ) -> BoxFuture<'static, Result<T>>
    where
        F: Fn(Arc<C>, Next<C, T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.start(ctx.into(), Some(Arc::new(FnMiddleware::<F, C, T>::new(terminal))))
    }

    fn start(
        &self,
        ctx: Arc<C>,
        terminal: Option<SharedMiddleware<C, T>>,
    ) -> BoxFuture<'static, Result<T>> {
        let state = RunState::new(
            Arc::clone(&self.stack),
            terminal,
            ctx,
            Arc::clone(&self.label),
        );

        if !self.instrument {
            return advance(&state, 0);
        }

        let span = tracing::debug_span!(
            "compose_run",
            chain = %self.label,
            len = self.stack.len()
        );
        let fut = span.in_scope(|| advance(&state, 0));
        Box::pin(fut.instrument(span))
    }
}

impl<C, T> Clone for Composed<C, T>
where
    C: 'static,
    T: 'static,
{
    fn clone(&self) -> Self {
        Self {
            stack: Arc::clone(&self.stack),
            label: Arc::clone(&self.label),
            instrument: self.instrument,
        }
    }
}

impl<C, T> std::fmt::Debug for Composed<C, T>
where
    C: 'static,
    T: 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composed")
            .field("label", &self.label)
            .field("handlers", &self.names())
            .finish()
    }
}

/// A composed chain used as a single middleware: its own stack runs with the
/// outer continuation as terminal.
impl<C, T> Middleware<C, T> for Composed<C, T>
where
    C: Send + Sync + 'static,
    T: Default + Send + 'static,
{
    fn call(&self, ctx: Arc<C>, next: Next<C, T>) -> BoxFuture<'static, Result<T>> {
        self.start(ctx, Some(Arc::new(Resume { next })))
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Terminal that hands control back to an enclosing chain.
struct Resume<C, T> {
    next: Next<C, T>,
}

impl<C, T> Middleware<C, T> for Resume<C, T>
where
    C: Send + Sync + 'static,
    T: Default + Send + 'static,
{
    fn call(&self, _ctx: Arc<C>, _next: Next<C, T>) -> BoxFuture<'static, Result<T>> {
        self.next.run()
    }

    fn name(&self) -> &str {
        "resume"
    }
}

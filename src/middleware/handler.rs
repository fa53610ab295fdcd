//! Middleware trait and closure adapter.
//!
//! Anything implementing [`Middleware`] can sit in a stack. Closures are
//! adapted through [`FnMiddleware`], usually via [`middleware_fn`] or
//! [`named_fn`].

use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use super::Next;
use crate::error::Result;

/// Boxed future for middleware results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Shared, type-erased middleware as stored in a stack.
pub type SharedMiddleware<C, T> = Arc<dyn Middleware<C, T>>;

/// A unit of work in a chain.
///
/// `call` receives the run's context and the continuation for the next
/// position. A middleware may await `next.run()` once, ignore it, or return
/// its future directly; a second call is rejected.
pub trait Middleware<C, T>: Send + Sync + 'static {
    /// Handle one step of a run.
    fn call(&self, ctx: Arc<C>, next: Next<C, T>) -> BoxFuture<'static, Result<T>>;

    /// Name used in logs and schemas.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Wrapper turning a closure into a [`Middleware`].
pub struct FnMiddleware<F, C, T> {
    handler: F,
    name: Cow<'static, str>,
    _phantom: PhantomData<fn(Arc<C>) -> T>,
}

impl<F, C, T, Fut> FnMiddleware<F, C, T>
where
    F: Fn(Arc<C>, Next<C, T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    /// Wrap a closure, naming it after its type.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            name: Cow::Borrowed(std::any::type_name::<F>()),
            _phantom: PhantomData,
        }
    }

    /// Wrap a closure under an explicit name.
    pub fn named(name: impl Into<Cow<'static, str>>, handler: F) -> Self {
        Self {
            handler,
            name: name.into(),
            _phantom: PhantomData,
        }
    }
}

impl<F, C, T, Fut> Middleware<C, T> for FnMiddleware<F, C, T>
where
    F: Fn(Arc<C>, Next<C, T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    C: 'static,
    T: 'static,
{
    fn call(&self, ctx: Arc<C>, next: Next<C, T>) -> BoxFuture<'static, Result<T>> {
        Box::pin((self.handler)(ctx, next))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Share a closure as a stack entry.
pub fn middleware_fn<C, T, F, Fut>(handler: F) -> SharedMiddleware<C, T>
where
    F: Fn(Arc<C>, Next<C, T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    C: 'static,
    T: 'static,
{
    Arc::new(FnMiddleware::<F, C, T>::new(handler))
}

/// Share a named closure as a stack entry.
pub fn named_fn<C, T, F, Fut>(
    name: impl Into<Cow<'static, str>>,
    handler: F,
) -> SharedMiddleware<C, T>
where
    F: Fn(Arc<C>, Next<C, T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    C: 'static,
    T: 'static,
{
    Arc::new(FnMiddleware::<F, C, T>::named(name, handler))
}

//! Continuation passed to middleware, and the per-run dispatch state.
//!
//! Every run owns one [`RunState`]: the stack snapshot, the optional
//! terminal, the context and a cursor. The cursor stores the highest entered
//! position plus one, so `0` means nothing has been entered yet. Entering a
//! position at or below the cursor is rejected.
//!
//! The cursor check and the handler lookup happen when [`Next::run`] is
//! called, not when the returned future is first polled. Downstream handler
//! bodies still only execute once that future is awaited.

use std::fmt;
use std::future::ready;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{BoxFuture, SharedMiddleware};
use crate::error::{ComposeError, Result};

/// State shared by every continuation of a single run.
pub(crate) struct RunState<C, T> {
    stack: Arc<[SharedMiddleware<C, T>]>,
    terminal: Option<SharedMiddleware<C, T>>,
    ctx: Arc<C>,
    /// Highest entered position + 1.
    entered: AtomicUsize,
    label: Arc<str>,
}

impl<C, T> RunState<C, T> {
    pub(crate) fn new(
        stack: Arc<[SharedMiddleware<C, T>]>,
        terminal: Option<SharedMiddleware<C, T>>,
        ctx: Arc<C>,
        label: Arc<str>,
    ) -> Arc<Self> {
        Arc::new(Self {
            stack,
            terminal,
            ctx,
            entered: AtomicUsize::new(0),
            label,
        })
    }
}

/// Enter `position` of a run and return the future of whatever sits there.
pub(crate) fn advance<C, T>(
    state: &Arc<RunState<C, T>>,
    position: usize,
) -> BoxFuture<'static, Result<T>>
where
    C: Send + Sync + 'static,
    T: Default + Send + 'static,
{
    let claimed = state
        .entered
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |entered| {
            (position >= entered).then_some(position + 1)
        });

    if let Err(entered) = claimed {
        tracing::debug!(
            chain = %state.label,
            position,
            entered,
            "Rejected repeated next() call"
        );
        return Box::pin(ready(Err(ComposeError::DoubleInvocation { position })));
    }

    let handler = match state.stack.get(position) {
        Some(middleware) => Some(middleware),
        None if position == state.stack.len() => state.terminal.as_ref(),
        None => None,
    };

    let Some(handler) = handler else {
        tracing::trace!(chain = %state.label, position, "Ran past end of chain");
        return Box::pin(ready(Ok(T::default())));
    };

    tracing::trace!(
        chain = %state.label,
        position,
        middleware = handler.name(),
        "Entering middleware"
    );

    let next = Next {
        state: Arc::clone(state),
        position: position + 1,
    };
    handler.call(Arc::clone(&state.ctx), next)
}

/// Continuation handed to a middleware.
///
/// Cloning is cheap; all clones point at the same position of the same run,
/// so only the first `run()` across them succeeds.
pub struct Next<C, T> {
    state: Arc<RunState<C, T>>,
    position: usize,
}

impl<C, T> Next<C, T>
where
    C: Send + Sync + 'static,
    T: Default + Send + 'static,
{
    /// Hand control to the next position.
    ///
    /// Resolves to whatever the downstream chain produced. Calling this a
    /// second time for the same run position yields
    /// [`ComposeError::DoubleInvocation`].
    ///
    /// The position is claimed as soon as this is called, but downstream
    /// handler bodies only run while the returned future is polled. Dropping
    /// it without awaiting (`let _ = next.run();`) skips the rest of the
    /// chain and leaves the position used up. To run downstream and ignore
    /// its value, await it: `let _ = next.run().await;`.
    pub fn run(&self) -> BoxFuture<'static, Result<T>> {
        advance(&self.state, self.position)
    }
}

impl<C, T> Next<C, T> {
    /// Stack position this continuation enters. Equal to the stack length
    /// when it points at the terminal.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<C, T> Clone for Next<C, T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            position: self.position,
        }
    }
}

impl<C, T> fmt::Debug for Next<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("chain", &self.state.label)
            .field("position", &self.position)
            .field("stack_len", &self.state.stack.len())
            .finish()
    }
}

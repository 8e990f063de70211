//! Cleanup handlers released at shutdown.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Error detail returned by a failing closer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A resource whose release is attempted during shutdown.
///
/// Once registered, the application owns the closer and is responsible for
/// calling [`Closer::close`]. `close` may run more than once if the
/// application's closers are executed more than once, so implementations
/// should be idempotent or track their own state.
pub trait Closer: Send + Sync {
    /// Release the underlying resource.
    fn close(&self) -> Result<(), BoxError>;

    /// Name used in log entries.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A named closer backed by a closure. See [`closer_fn`].
pub struct FnCloser<F> {
    name: String,
    f: F,
}

impl<F, E> Closer for FnCloser<F>
where
    F: Fn() -> Result<(), E> + Send + Sync,
    E: Into<BoxError>,
{
    fn close(&self) -> Result<(), BoxError> {
        (self.f)().map_err(Into::into)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnCloser<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCloser").field("name", &self.name).finish()
    }
}

/// Wrap a closure as a named [`Closer`].
pub fn closer_fn<F, E>(name: impl Into<String>, f: F) -> FnCloser<F>
where
    F: Fn() -> Result<(), E> + Send + Sync,
    E: Into<BoxError>,
{
    FnCloser {
        name: name.into(),
        f,
    }
}

/// Ordered, append-only list of registered closers.
///
/// Appends are synchronized so closers may be registered from background
/// tasks started by the startup hook.
#[derive(Default)]
pub(crate) struct Registry {
    closers: Mutex<Vec<Arc<dyn Closer>>>,
}

impl Registry {
    pub(crate) fn extend<I>(&self, closers: I)
    where
        I: IntoIterator<Item = Arc<dyn Closer>>,
    {
        // A poisoned lock only means another registration panicked; the Vec
        // itself is still consistent.
        self.closers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(closers);
    }

    /// Copy of the registry in registration order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn Closer>> {
        self.closers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.closers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

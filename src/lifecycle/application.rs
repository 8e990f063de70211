//! The application lifecycle coordinator.

use std::fmt;
use std::sync::Arc;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

use crate::config::SignalConfig;
use crate::lifecycle::closer::{Closer, Registry};
use crate::lifecycle::shutdown::{exit_channel, Termination};
use crate::lifecycle::signals::SignalListener;
use crate::lifecycle::state::{Phase, PhaseCell};

/// Startup or shutdown hook. Receives the application that runs it, so a
/// startup hook can register closers.
pub type Hook = Box<dyn Fn(&Application) + Send + Sync>;

/// Runs a startup hook, waits for SIGINT/SIGTERM, then runs a shutdown hook.
///
/// When no shutdown hook is set, shutdown releases every registered closer
/// in reverse registration order. Call [`run`](Self::run) once per instance.
pub struct Application {
    on_start: Hook,
    on_shutdown: Option<Hook>,
    info: String,
    logger: Dispatch,
    signals: SignalConfig,
    closers: Registry,
    phase: PhaseCell,
}

impl Application {
    /// Create an application with a no-op startup hook, the default shutdown
    /// (execute closers) and the dispatcher that is the default at this
    /// point as logger.
    pub fn new(info: impl Into<String>) -> Self {
        Self {
            on_start: Box::new(|_: &Application| {}),
            on_shutdown: None,
            info: info.into(),
            logger: tracing::dispatcher::get_default(Dispatch::clone),
            signals: SignalConfig::default(),
            closers: Registry::default(),
            phase: PhaseCell::new(),
        }
    }

    /// Set the startup hook.
    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Application) + Send + Sync + 'static,
    {
        self.on_start = Box::new(hook);
        self
    }

    /// Set the shutdown hook. It replaces the default closer execution; call
    /// [`execute_closers`](Self::execute_closers) from it to keep that behavior.
    pub fn on_shutdown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Application) + Send + Sync + 'static,
    {
        self.on_shutdown = Some(Box::new(hook));
        self
    }

    /// Log through `logger` instead of the default dispatcher.
    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// Choose which termination signals end the run.
    pub fn with_signals(mut self, signals: SignalConfig) -> Self {
        self.signals = signals;
        self
    }

    /// Run until a termination signal arrives.
    ///
    /// Startup runs to completion before the signal listener starts, and
    /// the shutdown hook has returned by the time this resolves. Panics in
    /// either hook are not caught. If no signal ever arrives, this never
    /// resolves.
    ///
    /// After the first signal, SIGINT and SIGTERM are reset to their default
    /// action, so a second signal during shutdown or afterwards ends the
    /// process. Signals are therefore only observed by the first `run` in a
    /// process.
    pub async fn run(&self) -> Termination {
        let logger = self.logger.clone();
        self.run_phases().with_subscriber(logger).await
    }

    async fn run_phases(&self) -> Termination {
        self.phase.advance(Phase::Starting);
        tracing::info!(info = %self.info, "starting application");

        let (notifier, exit) = exit_channel();

        (self.on_start)(self);

        self.phase.advance(Phase::Running);
        tracing::info!("running, waiting for exit signal");

        let listener = SignalListener::subscribe(&self.signals).spawn(notifier);
        let termination = exit.wait().await;
        // Only still pending when the channel closed without a signal.
        listener.abort();

        self.phase.advance(Phase::ShuttingDown);
        match &self.on_shutdown {
            Some(hook) => hook(self),
            None => self.execute_closers(),
        }

        self.phase.advance(Phase::Terminated);
        tracing::info!(termination = %termination, "application stopped");
        termination
    }

    /// Register a single closer.
    pub fn add_closer<C>(&self, closer: C)
    where
        C: Closer + 'static,
    {
        self.closers.extend([Arc::new(closer) as Arc<dyn Closer>]);
    }

    /// Register closers, preserving their order. Safe to call concurrently.
    ///
    /// The application takes sole ownership of each closer.
    pub fn add_closers<I>(&self, closers: I)
    where
        I: IntoIterator<Item = Box<dyn Closer>>,
    {
        self.closers.extend(closers.into_iter().map(Arc::<dyn Closer>::from));
    }

    /// Release all registered closers, last registered first.
    ///
    /// A failing closer is logged and the remaining ones are still
    /// attempted. There is no "already executed" guard: a second call
    /// releases every closer again.
    pub fn execute_closers(&self) {
        let closers = self.closers.snapshot();
        tracing::dispatcher::with_default(&self.logger, || {
            tracing::debug!(count = closers.len(), "executing closers");
            for (position, closer) in closers.iter().enumerate().rev() {
                if let Err(e) = closer.close() {
                    tracing::error!(
                        closer = closer.name(),
                        position,
                        error = %e,
                        "unable to execute closer"
                    );
                }
            }
        });
    }

    /// Snapshot of the registered closers in registration order.
    pub fn closers(&self) -> Vec<Arc<dyn Closer>> {
        self.closers.snapshot()
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn logger(&self) -> &Dispatch {
        &self.logger
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("info", &self.info)
            .field("signals", &self.signals)
            .field("closers", &self.closers.len())
            .field("phase", &self.phase.get())
            .field("custom_shutdown", &self.on_shutdown.is_some())
            .finish()
    }
}

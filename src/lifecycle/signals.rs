//! OS signal handling.
//!
//! # Responsibilities
//! - Subscribe to SIGINT and SIGTERM (Ctrl-C only on non-Unix)
//! - Wait for the first one and report it as an exit notification
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Subscriptions are registered before the listener task is spawned
//! - Delivers exactly one notification, then restores the default action
//!   for the signals it handled, so a second SIGINT/SIGTERM ends the process

use std::fmt;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;

use crate::config::SignalConfig;
use crate::lifecycle::shutdown::{ExitNotifier, Termination};

/// Termination signal classes the listener reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Subscribed signal streams, consumed by the first signal received.
#[derive(Debug)]
pub(crate) struct SignalListener {
    #[cfg(unix)]
    interrupt: Option<tokio::signal::unix::Signal>,
    #[cfg(unix)]
    terminate: Option<tokio::signal::unix::Signal>,
    #[cfg(not(unix))]
    interrupt: bool,
}

impl SignalListener {
    /// Register handlers for the enabled signal kinds.
    ///
    /// A kind that fails to register is logged and skipped. Must be called
    /// from within a Tokio runtime.
    #[cfg(unix)]
    pub(crate) fn subscribe(config: &SignalConfig) -> Self {
        use tokio::signal::unix::{signal, SignalKind};

        let register = |enabled: bool, kind: SignalKind, name: TerminationSignal| {
            if !enabled {
                return None;
            }
            match signal(kind) {
                Ok(stream) => Some(stream),
                Err(e) => {
                    tracing::error!(signal = %name, error = %e, "failed to register signal handler");
                    None
                }
            }
        };

        Self {
            interrupt: register(config.interrupt, SignalKind::interrupt(), TerminationSignal::Interrupt),
            terminate: register(config.terminate, SignalKind::terminate(), TerminationSignal::Terminate),
        }
    }

    #[cfg(not(unix))]
    pub(crate) fn subscribe(config: &SignalConfig) -> Self {
        if config.terminate {
            tracing::debug!("SIGTERM is not available on this platform, only Ctrl-C is handled");
        }
        Self {
            interrupt: config.interrupt,
        }
    }

    /// Signal kinds with a live subscription.
    #[cfg(unix)]
    pub(crate) fn subscribed(&self) -> Vec<TerminationSignal> {
        let mut kinds = Vec::new();
        if self.interrupt.is_some() {
            kinds.push(TerminationSignal::Interrupt);
        }
        if self.terminate.is_some() {
            kinds.push(TerminationSignal::Terminate);
        }
        kinds
    }

    #[cfg(not(unix))]
    pub(crate) fn subscribed(&self) -> Vec<TerminationSignal> {
        if self.interrupt {
            vec![TerminationSignal::Interrupt]
        } else {
            Vec::new()
        }
    }

    /// Wait for the first enabled signal. Pends forever if none is enabled.
    #[cfg(unix)]
    pub(crate) async fn recv(mut self) -> TerminationSignal {
        async fn next(stream: &mut Option<tokio::signal::unix::Signal>) -> Option<()> {
            match stream {
                Some(stream) => stream.recv().await,
                None => std::future::pending().await,
            }
        }

        tokio::select! {
            Some(()) = next(&mut self.interrupt) => TerminationSignal::Interrupt,
            Some(()) = next(&mut self.terminate) => TerminationSignal::Terminate,
            else => std::future::pending().await,
        }
    }

    #[cfg(not(unix))]
    pub(crate) async fn recv(self) -> TerminationSignal {
        if self.interrupt {
            match tokio::signal::ctrl_c().await {
                Ok(()) => return TerminationSignal::Interrupt,
                Err(e) => {
                    tracing::error!(error = %e, "failed to listen for Ctrl-C");
                }
            }
        }
        std::future::pending().await
    }

    /// Spawn the listener task. It logs the first signal, restores the
    /// default disposition of every subscribed kind, sends a single
    /// notification and exits.
    ///
    /// The task inherits the caller's default dispatcher.
    pub(crate) fn spawn(self, notifier: ExitNotifier) -> JoinHandle<()> {
        let task = async move {
            let subscribed = self.subscribed();
            let signal = self.recv().await;
            tracing::info!(signal = %signal, "terminating application");
            for kind in subscribed {
                restore_default(kind);
            }
            if !notifier.notify(Termination::Signal(signal)) {
                tracing::debug!("exit notification dropped, nobody is waiting");
            }
        };
        tokio::spawn(task.with_current_subscriber())
    }
}

/// Put `kind` back to its default action (terminate the process).
///
/// Tokio keeps its process-wide handler installed after the streams are
/// dropped; without this every later signal would be swallowed. Tokio does
/// not reinstall a handler it registered before, so signals are not observed
/// by a second `run` in the same process.
#[cfg(unix)]
fn restore_default(kind: TerminationSignal) {
    use nix::sys::signal::{signal, SigHandler, Signal};

    let sig = match kind {
        TerminationSignal::Interrupt => Signal::SIGINT,
        TerminationSignal::Terminate => Signal::SIGTERM,
    };
    // SAFETY: SIG_DFL installs no user code as handler, so there is no
    // async-signal-safety requirement to uphold.
    match unsafe { signal(sig, SigHandler::SigDfl) } {
        Ok(_) => tracing::debug!(signal = %kind, "restored default signal action"),
        Err(e) => {
            tracing::warn!(signal = %kind, error = %e, "failed to restore default signal action")
        }
    }
}

// Ctrl-C handling on other platforms is not process-wide in the same way.
#[cfg(not(unix))]
fn restore_default(_kind: TerminationSignal) {}

//! One-shot exit notification between the signal listener and `run`.

use std::fmt;
use tokio::sync::oneshot;

use crate::lifecycle::signals::TerminationSignal;

/// Why [`Application::run`](crate::lifecycle::Application::run) stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A termination signal was delivered to the process.
    Signal(TerminationSignal),
    /// The listener went away without delivering a notification.
    ListenerClosed,
}

impl Termination {
    /// Conventional process exit code (128 + signal number for signals).
    pub fn exit_code(&self) -> u8 {
        match self {
            Termination::Signal(TerminationSignal::Interrupt) => 130,
            Termination::Signal(TerminationSignal::Terminate) => 143,
            Termination::ListenerClosed => 0,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Signal(signal) => write!(f, "{}", signal),
            Termination::ListenerClosed => f.write_str("listener closed"),
        }
    }
}

/// Create a fresh exit channel.
///
/// Both halves are consumed on use, so at most one notification is ever
/// delivered and the channel is retired afterwards.
pub(crate) fn exit_channel() -> (ExitNotifier, ExitReceiver) {
    let (tx, rx) = oneshot::channel();
    (ExitNotifier { tx }, ExitReceiver { rx })
}

/// Sending half, owned by the signal listener.
#[derive(Debug)]
pub(crate) struct ExitNotifier {
    tx: oneshot::Sender<Termination>,
}

impl ExitNotifier {
    /// Deliver the notification. Returns false if nobody is waiting anymore.
    pub(crate) fn notify(self, termination: Termination) -> bool {
        self.tx.send(termination).is_ok()
    }
}

/// Receiving half, awaited by `run`.
#[derive(Debug)]
pub(crate) struct ExitReceiver {
    rx: oneshot::Receiver<Termination>,
}

impl ExitReceiver {
    /// Wait for the notification, or for the notifier to be dropped.
    pub(crate) async fn wait(self) -> Termination {
        self.rx.await.unwrap_or(Termination::ListenerClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notification_is_delivered() {
        let (notifier, receiver) = exit_channel();
        assert!(notifier.notify(Termination::Signal(TerminationSignal::Terminate)));
        assert_eq!(
            receiver.wait().await,
            Termination::Signal(TerminationSignal::Terminate)
        );
    }

    #[tokio::test]
    async fn test_dropped_notifier_closes_channel() {
        let (notifier, receiver) = exit_channel();
        drop(notifier);
        assert_eq!(receiver.wait().await, Termination::ListenerClosed);
    }

    #[tokio::test]
    async fn test_notify_without_receiver() {
        let (notifier, receiver) = exit_channel();
        drop(receiver);
        assert!(!notifier.notify(Termination::Signal(TerminationSignal::Interrupt)));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Termination::Signal(TerminationSignal::Interrupt).exit_code(), 130);
        assert_eq!(Termination::Signal(TerminationSignal::Terminate).exit_code(), 143);
        assert_eq!(Termination::ListenerClosed.exit_code(), 0);
    }
}

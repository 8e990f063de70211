//! Application phase state machine.
//!
//! # State Transitions
//! ```text
//! Created → Starting:      run() called
//! Starting → Running:      startup hook returned
//! Running → ShuttingDown:  exit notification observed
//! ShuttingDown → Terminated: shutdown hook returned
//! ```
//!
//! Transitions only move forward. There is no pause/resume.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle phase of an [`Application`](crate::lifecycle::Application).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Phase {
    Created = 0,
    Starting = 1,
    Running = 2,
    ShuttingDown = 3,
    Terminated = 4,
}

impl Phase {
    // `PhaseCell` only ever stores discriminants of this enum.
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Phase::Created,
            1 => Phase::Starting,
            2 => Phase::Running,
            3 => Phase::ShuttingDown,
            4 => Phase::Terminated,
            other => unreachable!("invalid lifecycle phase discriminant {}", other),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Phase::Created => "created",
            Phase::Starting => "starting",
            Phase::Running => "running",
            Phase::ShuttingDown => "shutting_down",
            Phase::Terminated => "terminated",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder for the current phase.
#[derive(Debug)]
pub(crate) struct PhaseCell {
    value: AtomicU8,
}

impl PhaseCell {
    pub(crate) fn new() -> Self {
        Self {
            value: AtomicU8::new(Phase::Created as u8),
        }
    }

    pub(crate) fn get(&self) -> Phase {
        Phase::from_u8(self.value.load(Ordering::Acquire))
    }

    /// Move to `next`. Backwards moves are ignored.
    pub(crate) fn advance(&self, next: Phase) {
        let previous = Phase::from_u8(self.value.fetch_max(next as u8, Ordering::AcqRel));
        if previous < next {
            tracing::debug!(from = %previous, to = %next, "lifecycle phase changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use crate::observability::logging::{build_dispatch_with_writer, MemoryWriter};

    #[test]
    fn test_phase_advances_forward_only() {
        let cell = PhaseCell::new();
        assert_eq!(cell.get(), Phase::Created);

        cell.advance(Phase::Starting);
        cell.advance(Phase::Running);
        assert_eq!(cell.get(), Phase::Running);

        // Going back is a no-op
        cell.advance(Phase::Starting);
        assert_eq!(cell.get(), Phase::Running);

        cell.advance(Phase::Terminated);
        assert_eq!(cell.get(), Phase::Terminated);
    }

    #[test]
    fn test_discriminants_decode_to_same_phase() {
        for phase in [
            Phase::Created,
            Phase::Starting,
            Phase::Running,
            Phase::ShuttingDown,
            Phase::Terminated,
        ] {
            assert_eq!(Phase::from_u8(phase as u8), phase);
        }
    }

    #[test]
    #[should_panic(expected = "invalid lifecycle phase discriminant 5")]
    fn test_unknown_discriminant_is_rejected() {
        Phase::from_u8(5);
    }

    #[test]
    fn test_transition_event_is_lowercase() {
        let writer = MemoryWriter::new();
        let config = LoggingConfig {
            filter: "debug".to_string(),
            ansi: false,
            ..LoggingConfig::default()
        };
        let dispatch = build_dispatch_with_writer(&config, writer.clone());

        tracing::dispatcher::with_default(&dispatch, || {
            PhaseCell::new().advance(Phase::Starting);
        });

        let output = writer.contents();
        assert!(output.contains("lifecycle phase changed"));
        assert!(output.contains("to=starting"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::ShuttingDown.to_string(), "shutting_down");
        assert_eq!(Phase::Created.to_string(), "created");
    }
}

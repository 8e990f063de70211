//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Application::run (application.rs):
//!     Startup hook → Subscribe signals → Wait → Shutdown hook → Return
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → single exit notification (shutdown.rs)
//!     → default signal action restored (a second signal kills the process)
//!
//! Shutdown (shutdown.rs, closer.rs):
//!     Default shutdown releases closers, last registered first
//! ```
//!
//! # Design Decisions
//! - Ordered startup: the listener starts only after the startup hook returns
//! - One-shot exit channel: a second notification cannot be delivered
//! - Closer failures are logged, never propagated
//! - No shutdown deadline: hooks run to completion

pub mod application;
pub mod closer;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use application::{Application, Hook};
pub use closer::{closer_fn, BoxError, Closer, FnCloser};
pub use shutdown::Termination;
pub use signals::TerminationSignal;
pub use state::Phase;

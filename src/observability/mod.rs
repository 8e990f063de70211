//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle events (starting, running, terminating, closer failures)
//!     → tracing events on the Application's dispatcher
//!     → logging.rs (text or JSON fmt layer)
//!     → stdout, or an in-memory buffer in tests
//! ```

pub mod logging;

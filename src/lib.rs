//! Process lifecycle management for long-running services.
//!
//! An [`Application`] runs a startup hook, waits for SIGINT or SIGTERM,
//! then runs a shutdown hook. By default shutdown releases the registered
//! [`Closer`]s in reverse registration order.
//!
//! ```no_run
//! use service_lifecycle::{closer_fn, Application, BoxError};
//!
//! # async fn demo() {
//! let app = Application::new("worker").on_start(|app| {
//!     app.add_closer(closer_fn("queue", || Ok::<(), BoxError>(())));
//! });
//! let termination = app.run().await;
//! println!("stopped by {}", termination);
//! # }
//! ```

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use lifecycle::{
    closer_fn, Application, BoxError, Closer, Hook, Phase, Termination, TerminationSignal,
};

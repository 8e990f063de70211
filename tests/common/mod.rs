//! Shared utilities for lifecycle integration tests.

use std::process::{Command, ExitStatus};
use std::thread::JoinHandle;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::Dispatch;

use service_lifecycle::config::LoggingConfig;
use service_lifecycle::observability::logging::{build_dispatch_with_writer, MemoryWriter};

/// Delay before a test signal is sent. Leaves the listener time to subscribe.
pub const SIGNAL_DELAY: Duration = Duration::from_millis(300);

/// Set in the re-executed test binary to the name of the scenario to run.
const SCENARIO_ENV: &str = "SERVICE_LIFECYCLE_SCENARIO";

/// Send `signal` to this process from a background thread after `delay`.
///
/// Only call this once the application is about to subscribe (e.g. from its
/// startup hook); an unhandled SIGTERM/SIGINT kills the process.
pub fn signal_after(signal: Signal, delay: Duration) -> JoinHandle<()> {
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        kill(Pid::this(), signal).expect("failed to signal test process");
    })
}

/// Send `signal` to this process right away.
pub fn signal_now(signal: Signal) {
    kill(Pid::this(), signal).expect("failed to signal test process");
}

/// Run `scenario` in a fresh copy of this test binary.
///
/// Signal handlers are process-wide and are reset to their defaults after a
/// run, so every scenario gets its own process. Inside the child this runs
/// `scenario` and returns `None`; in the parent it returns the child's exit
/// status. `test_name` must be the name of the calling test function.
pub fn isolated<F>(test_name: &str, scenario: F) -> Option<ExitStatus>
where
    F: FnOnce(),
{
    if std::env::var(SCENARIO_ENV).as_deref() == Ok(test_name) {
        scenario();
        return None;
    }

    let exe = std::env::current_exe().expect("test binary path");
    let status = Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(SCENARIO_ENV, test_name)
        .status()
        .expect("failed to spawn scenario process");
    Some(status)
}

/// Like [`isolated`], asserting the scenario passed.
pub fn run_isolated<F>(test_name: &str, scenario: F)
where
    F: FnOnce(),
{
    if let Some(status) = isolated(test_name, scenario) {
        assert!(status.success(), "scenario {} failed: {}", test_name, status);
    }
}

/// Current-thread runtime with IO, time and signal drivers.
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

/// A text-format dispatcher writing into memory.
pub fn capture() -> (MemoryWriter, Dispatch) {
    let writer = MemoryWriter::new();
    let config = LoggingConfig {
        filter: "debug".to_string(),
        ansi: false,
        ..LoggingConfig::default()
    };
    let dispatch = build_dispatch_with_writer(&config, writer.clone());
    (writer, dispatch)
}

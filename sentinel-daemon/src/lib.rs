//! Sentinel supervisor runtime: session control + the polling loop.

mod error;
mod runtime;
pub mod session;
pub mod supervisor;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, run_until, start_blocking};
pub use session::{host_for, is_running, start, Screen, SessionHost, Tmux};
pub use supervisor::{
    BackupOutcome, LivenessOutcome, PurgeOutcome, ScheduleState, Supervisor, TickReport,
};

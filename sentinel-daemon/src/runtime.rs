use std::future::Future;
use std::time::Duration;

use sentinel_core::{Clock, Config, Filesystem, LocalFs, SystemClock};

use crate::error::{io_err, DaemonError};
use crate::session::{host_for, SessionHost};
use crate::supervisor::Supervisor;

/// Start the supervisor and block the current thread until ctrl-c.
///
/// The loop is single-threaded by construction, so it runs on a
/// current-thread runtime.
pub fn start_blocking(config: Config) -> Result<(), DaemonError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run the supervisor loop against the real multiplexer, filesystem and clock.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    let quantum = config.poll_quantum();
    let host = host_for(config.multiplexer);
    tracing::info!(
        session = %config.server.session_name,
        backup_interval_hours = config.backup_interval_hours,
        purge_interval_hours = config.purge_interval_hours,
        quantum_secs = quantum.as_secs(),
        "supervisor started",
    );
    let supervisor = Supervisor::new(config, host, LocalFs, SystemClock);
    let ticks = run_until(supervisor, quantum, shutdown_signal()).await?;
    tracing::info!(ticks, "supervisor stopped");
    Ok(())
}

/// Tick, then sleep `quantum`, until `shutdown` resolves. The shutdown future
/// is only observed while sleeping, so a tick in progress always completes.
/// Returns how many ticks ran.
pub async fn run_until<H, F, C, S>(
    mut supervisor: Supervisor<H, F, C>,
    quantum: Duration,
    shutdown: S,
) -> Result<usize, DaemonError>
where
    H: SessionHost,
    F: Filesystem,
    C: Clock,
    S: Future<Output = Result<(), DaemonError>>,
{
    tokio::pin!(shutdown);
    let mut ticks = 0usize;

    loop {
        let report = supervisor.tick();
        ticks += 1;
        tracing::debug!(tick = ticks, report = ?report, "tick finished");

        tokio::select! {
            _ = tokio::time::sleep(quantum) => {}
            signal = &mut shutdown => {
                signal?;
                break;
            }
        }
    }

    Ok(ticks)
}

async fn shutdown_signal() -> Result<(), DaemonError> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| DaemonError::Signal(format!("ctrl-c handler failed: {err}")))?;
    tracing::info!("received ctrl-c, shutting down supervisor");
    Ok(())
}

/// Install the global tracing subscriber. Output goes to stderr so that
/// command output on stdout stays machine-readable.
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

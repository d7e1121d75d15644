//! Telemetry and logging bootstrap
//!
//! Console logging plus optional JSON file logs. Each initialization gets a
//! session id that tags every log line for later correlation.

use crate::config::TelemetryConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Handle for the logging session
///
/// Keep this alive for the lifetime of the program; dropping it flushes and
/// closes the file writer.
pub struct Telemetry {
    session_id: Uuid,
    _file_guard: Option<WorkerGuard>,
}

impl Telemetry {
    /// Get the session ID
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Initialize the global tracing subscriber
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(config: &TelemetryConfig) -> anyhow::Result<Telemetry> {
    let session_id = Uuid::new_v4();
    let verbose = config.verbose;

    let make_env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if verbose {
                EnvFilter::new("debug,hyper=info,reqwest=info,h2=info,rustls=info")
            } else {
                EnvFilter::new("info,hyper=warn,reqwest=warn,h2=warn,rustls=warn")
            }
        })
    };

    let file_guard = if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "claw_agent.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = tracing_subscriber::registry()
            .with(make_env_filter())
            .with(fmt::layer().with_target(false).compact())
            .with(fmt::layer().json().with_writer(non_blocking));
        subscriber.try_init().ok();
        Some(guard)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(make_env_filter())
            .with(fmt::layer().with_target(false).compact());
        subscriber.try_init().ok();
        None
    };

    tracing::info!(session_id = %session_id, "Telemetry initialized");

    Ok(Telemetry {
        session_id,
        _file_guard: file_guard,
    })
}

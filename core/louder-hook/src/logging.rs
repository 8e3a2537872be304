//! Diagnostic logging for louder-hook.
//!
//! Silent by default: the hook runs inside the agent host, which may surface
//! anything on stderr. `DEBUG=louder`, `DEBUG=*`, `LOUDER_DEBUG=1`, or an
//! explicit `RUST_LOG` turns on a stderr subscriber.

use std::env;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_DIRECTIVES: &str = "louder_core=debug,louder_hook=debug";

/// Installs the subscriber if diagnostics were requested.
///
/// Keep the returned guard alive for the life of the process so buffered
/// lines are flushed on exit.
pub fn init() -> Option<WorkerGuard> {
    let rust_log = env::var("RUST_LOG").ok().filter(|value| !value.is_empty());
    let diagnostics = louder_core::config::diagnostics_enabled();

    if rust_log.is_none() && !diagnostics {
        return None;
    }

    let filter = if diagnostics {
        EnvFilter::new(DEBUG_DIRECTIVES)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return None;
    }
    Some(guard)
}

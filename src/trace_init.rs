//! Opt-in JSON tracing for debugging a live input method.

/// File written under the log directory.
pub const TRACE_FILE_NAME: &str = "tsuzuri-trace.jsonl";

#[cfg(feature = "trace")]
const DEFAULT_FILTER: &str = "tsuzuri_engine=debug,tsuzuri_session=debug,tsuzuri_core=debug";

#[cfg(feature = "trace")]
static INIT: std::sync::Once = std::sync::Once::new();

/// Install the JSON file subscriber under `log_dir`, filtered by `RUST_LOG`.
///
/// Only the first call does anything. A host that already installed a global
/// subscriber keeps it.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &std::path::Path) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    INIT.call_once(|| {
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, TRACE_FILE_NAME));
        // Flushing on drop would need the guard; the process outlives any owner.
        std::mem::forget(guard);

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::fmt()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_env_filter(filter)
            .try_init();
    });
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &std::path::Path) {}

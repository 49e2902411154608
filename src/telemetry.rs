use crate::config::AppConfig;
use crate::logging::rotate_if_full;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::ChronoLocal;

const TRACE_LOG_MAX_BYTES: u64 = 10 * 1024 * 1024;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub(crate) fn tracing_log_path() -> PathBuf {
    env::var("NIGHTTERM_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("nightterm_trace.jsonl"))
}

/// Install the JSON trace subscriber once; a no-op unless file logging is on.
///
/// Events carry local timestamps so they line up with the debug log. A trace
/// file left over from earlier sessions is moved to `.1` once it passes 10 MiB.
pub fn init_tracing(config: &AppConfig) {
    if !config.file_logging_enabled() {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let path = tracing_log_path();
        rotate_if_full(&path, TRACE_LOG_MAX_BYTES);
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(_) => return,
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(ChronoLocal::rfc_3339())
            .with_writer(file)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                video_fps = config.video_fps,
                color_video = config.color_video,
                metadata = !config.no_metadata,
                stream_retries = config.stream_retries,
                log_content = config.log_content,
                "session started"
            );
        }
    });
}

//! File-backed debug log and crash log.
//!
//! The TUI owns the terminal, so nothing may be printed to stdout/stderr while
//! it runs. Debug lines go to a size-capped file in the temp dir instead; when
//! it fills up it is moved aside to `<name>.1` so one earlier listening session
//! survives. Track titles and chat text are personal, so they only reach the
//! file with `--log-content`; otherwise just their length is recorded.

use crate::config::AppConfig;
use chrono::{DateTime, Local};
use std::{
    env, fs,
    io::Write,
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_STATE: OnceLock<Mutex<Option<LogWriter>>> = OnceLock::new();

/// Personal text that is redacted unless content logging is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    NowPlaying,
    Chat,
    PanicPayload,
}

impl ContentKind {
    fn label(self) -> &'static str {
        match self {
            ContentKind::NowPlaying => "now playing",
            ContentKind::Chat => "chat",
            ContentKind::PanicPayload => "panic payload",
        }
    }
}

/// Path to the debug log file.
pub fn log_file_path() -> PathBuf {
    env::var("NIGHTTERM_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("nightterm.log"))
}

/// Path to the crash log file (metadata only unless `--log-content`).
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("nightterm_crash.log")
}

/// `<path>.1`, where a full log is moved before a fresh one starts.
pub(crate) fn previous_generation(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".1");
    PathBuf::from(name)
}

/// Move `path` aside when it already holds `max_bytes` or more.
pub(crate) fn rotate_if_full(path: &Path, max_bytes: u64) {
    let len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if len >= max_bytes {
        let _ = fs::rename(path, previous_generation(path));
    }
}

struct LogWriter {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    bytes_written: u64,
}

impl LogWriter {
    fn open(path: PathBuf, max_bytes: u64) -> Option<Self> {
        rotate_if_full(&path, max_bytes);
        let bytes_written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some(Self {
            path,
            file,
            max_bytes,
            bytes_written,
        })
    }

    fn write_line(&mut self, line: &str) {
        if self.bytes_written.saturating_add(line.len() as u64) > self.max_bytes {
            let _ = fs::rename(&self.path, previous_generation(&self.path));
            match fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)
            {
                Ok(file) => {
                    self.file = file;
                    self.bytes_written = 0;
                }
                Err(_) => return,
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.bytes_written = self.bytes_written.saturating_add(line.len() as u64);
        }
    }
}

fn log_state() -> &'static Mutex<Option<LogWriter>> {
    LOG_STATE.get_or_init(|| Mutex::new(None))
}

/// Configure logging from `--logs`/`--no-logs`/`--log-content`.
pub fn init_logging(config: &AppConfig) {
    let enabled = config.file_logging_enabled();
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(enabled && config.log_content, Ordering::Relaxed);

    let mut writer = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *writer = if enabled {
        LogWriter::open(log_file_path(), LOG_MAX_BYTES)
    } else {
        None
    };
}

fn stamped(now: &DateTime<Local>, msg: &str) -> String {
    format!("[{}] {msg}\n", now.format(TIMESTAMP_FORMAT))
}

/// The text itself with content logging on; only its length otherwise.
pub(crate) fn content_line(kind: ContentKind, text: &str, content_enabled: bool) -> String {
    if content_enabled {
        format!("{}: {text}", kind.label())
    } else {
        format!(
            "{}: <{} chars, enable --log-content to record>",
            kind.label(),
            text.chars().count()
        )
    }
}

/// Append one line to the debug log when logging is enabled.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let line = stamped(&Local::now(), msg);
    let mut writer = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(writer) = writer.as_mut() {
        writer.write_line(&line);
    }
}

/// Log a track title, chat line or panic payload, redacted unless `--log-content`.
pub fn log_debug_content(kind: ContentKind, text: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    log_debug(&content_line(
        kind,
        text,
        LOG_CONTENT_ENABLED.load(Ordering::Relaxed),
    ));
}

/// Write a minimal crash log entry, omitting the payload unless content logging is on.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    };
    let payload = content_line(
        ContentKind::PanicPayload,
        &payload,
        LOG_CONTENT_ENABLED.load(Ordering::Relaxed),
    );

    let line = stamped(
        &Local::now(),
        &format!(
            "panic at {location}, {payload} (v{})",
            env!("CARGO_PKG_VERSION")
        ),
    );
    let path = crash_log_path();
    rotate_if_full(&path, CRASH_LOG_MAX_BYTES);
    if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(&path) {
        let _ = file.write_all(line.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("nightterm-logging-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("scratch dir");
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(previous_generation(&path));
        path
    }

    #[test]
    fn titles_and_chat_are_redacted_without_log_content() {
        assert_eq!(
            content_line(ContentKind::NowPlaying, "Perturbator - Venger", false),
            "now playing: <20 chars, enable --log-content to record>"
        );
        assert_eq!(
            content_line(ContentKind::Chat, "hi all", true),
            "chat: hi all"
        );
    }

    #[test]
    fn lines_carry_a_local_timestamp() {
        let now = Local
            .with_ymd_and_hms(2024, 5, 6, 23, 4, 5)
            .single()
            .expect("unambiguous local time");
        assert_eq!(
            stamped(&now, "meta connected"),
            "[2024-05-06 23:04:05.000] meta connected\n"
        );
    }

    #[test]
    fn full_log_moves_to_previous_generation() {
        let path = scratch_path("rotate.log");
        let mut writer = LogWriter::open(path.clone(), 16).expect("open");
        writer.write_line("0123456789\n");
        writer.write_line("abcdefghij\n");
        assert_eq!(fs::read_to_string(&path).expect("current"), "abcdefghij\n");
        assert_eq!(
            fs::read_to_string(previous_generation(&path)).expect("previous"),
            "0123456789\n"
        );
    }

    #[test]
    fn oversized_log_is_rotated_on_open() {
        let path = scratch_path("startup.log");
        fs::write(&path, "x".repeat(32)).expect("seed");
        let writer = LogWriter::open(path.clone(), 16).expect("open");
        assert_eq!(writer.bytes_written, 0);
        assert_eq!(
            fs::metadata(previous_generation(&path)).map(|m| m.len()).ok(),
            Some(32)
        );
    }
}

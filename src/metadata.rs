//! Now-playing metadata from the station server's SSE feed.
//!
//! Updates reach the event loop through an `EvictOldest` mailbox: when the
//! loop falls behind, the oldest snapshot is discarded and the newest kept.

use crate::config::{METADATA_BACKOFF_MAX, METADATA_BACKOFF_START};
use crate::diagnostics::DiagnosticLog;
use crate::mailbox::{MailboxSender, Offer};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Station key → "artist - title".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataUpdate(pub HashMap<String, String>);

#[derive(Debug, Deserialize)]
struct NowPlaying {
    #[serde(default)]
    station: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
}

/// Parse one SSE line. Only `data: ` lines with a JSON array payload yield an update.
pub fn parse_sse_line(line: &str) -> Option<MetadataUpdate> {
    let payload = line.trim().strip_prefix("data: ")?;
    if payload.is_empty() || payload == "keepalive" {
        return None;
    }
    let entries: Vec<NowPlaying> = serde_json::from_str(payload).ok()?;
    let update = entries
        .into_iter()
        .filter(|entry| !entry.station.is_empty())
        .map(|entry| {
            (
                entry.station.to_ascii_lowercase(),
                format!("{} - {}", entry.artist, entry.title),
            )
        })
        .collect();
    Some(MetadataUpdate(update))
}

/// Doubles up to the cap.
pub fn next_backoff(current: Duration) -> Duration {
    if current < METADATA_BACKOFF_MAX {
        (current * 2).min(METADATA_BACKOFF_MAX)
    } else {
        METADATA_BACKOFF_MAX
    }
}

/// Forward every update in `reader` until it ends or the consumer is gone.
/// Returns how many were delivered.
pub(crate) fn pump_updates(
    reader: impl BufRead,
    tx: &MailboxSender<MetadataUpdate>,
    stop: &AtomicBool,
) -> std::io::Result<usize> {
    let mut sent = 0;
    for line in reader.lines() {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let Some(update) = parse_sse_line(&line?) else {
            continue;
        };
        match tx.offer(update) {
            Offer::Delivered | Offer::Evicted => sent += 1,
            Offer::Dropped => {}
            Offer::Closed => break,
        }
    }
    Ok(sent)
}

/// Background SSE subscriber.
pub struct MetadataClient {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MetadataClient {
    pub fn spawn(url: String, tx: MailboxSender<MetadataUpdate>, diag: DiagnosticLog) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || run(&url, &tx, &diag, &stop_flag));
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Ask the thread to exit; it does so after its current read or sleep.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for MetadataClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(url: &str, tx: &MailboxSender<MetadataUpdate>, diag: &DiagnosticLog, stop: &AtomicBool) {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .build();
    let mut backoff = METADATA_BACKOFF_START;

    while !stop.load(Ordering::Relaxed) {
        let response = agent
            .get(url)
            .set("Accept", "text/event-stream")
            .set("Cache-Control", "no-cache")
            .call();
        match response {
            Ok(response) => {
                backoff = METADATA_BACKOFF_START;
                diag.push("meta connected");
                let reader = BufReader::new(response.into_reader());
                match pump_updates(reader, tx, stop) {
                    Ok(sent) => diag.push(format!("meta stream closed after {sent} updates")),
                    Err(err) => diag.push(format!("meta read: {err}")),
                }
                continue;
            }
            Err(ureq::Error::Status(code, _)) => diag.push(format!("meta status: {code}")),
            Err(err) => diag.push(format!("meta connect: {err}")),
        }
        thread::sleep(backoff);
        backoff = next_backoff(backoff);
    }
}

//! In-memory diagnostic ring buffer shown by the log monitor view.
//!
//! Every subsystem receives a cloned [`DiagnosticLog`] handle at construction;
//! there is no global instance. Lines are mirrored into the debug file log and
//! the tracing subscriber so a post-mortem does not depend on the monitor.

use crate::lock::lock_or_recover;
use crate::log_debug;
use chrono::{DateTime, Local, TimeZone};
use std::collections::VecDeque;
use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Lines retained by the monitor before the oldest are discarded.
pub const DIAGNOSTIC_LOG_CAPACITY: usize = 2000;

#[derive(Clone, Debug)]
pub struct DiagnosticLog {
    inner: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl DiagnosticLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append a line, evicting the oldest one when full. Callable from any thread.
    pub fn push(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log_debug(message);
        tracing::debug!(target: "nightterm::diag", "{message}");
        let line = format!("{}{}", clock_prefix(&Local::now()), message);
        let mut lines = lock_or_recover(&self.inner, "diagnostic_log_push");
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Copy out the most recent `n` lines, oldest first. `0` means everything.
    pub fn last(&self, n: usize) -> Vec<String> {
        let lines = lock_or_recover(&self.inner, "diagnostic_log_last");
        let n = if n == 0 || n > lines.len() {
            lines.len()
        } else {
            n
        };
        lines.iter().skip(lines.len() - n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock_or_recover(&self.inner, "diagnostic_log_len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(DIAGNOSTIC_LOG_CAPACITY)
    }
}

/// `HH:MM:SS ` in the timestamp's own zone (local time for log lines).
fn clock_prefix<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("%H:%M:%S ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};
    use std::thread;

    fn strip_clock(line: &str) -> &str {
        &line[9..]
    }

    #[test]
    fn evicts_oldest_when_full() {
        let log = DiagnosticLog::new(3);
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        let lines = log.last(0);
        assert_eq!(lines.len(), 3);
        assert_eq!(strip_clock(&lines[0]), "line 2");
        assert_eq!(strip_clock(&lines[2]), "line 4");
    }

    #[test]
    fn last_returns_tail_in_order() {
        let log = DiagnosticLog::new(10);
        log.push("a");
        log.push("b");
        log.push("c");
        let tail: Vec<_> = log.last(2).iter().map(|l| strip_clock(l).to_string()).collect();
        assert_eq!(tail, vec!["b", "c"]);
        assert_eq!(log.last(50).len(), 3);
    }

    #[test]
    fn clock_prefix_uses_the_wall_clock_of_the_zone() {
        let utc = Utc
            .with_ymd_and_hms(2024, 3, 1, 4, 7, 9)
            .single()
            .expect("valid utc time");
        assert_eq!(clock_prefix(&utc), "04:07:09 ");
        let tokyo = FixedOffset::east_opt(9 * 3600).expect("offset");
        assert_eq!(clock_prefix(&utc.with_timezone(&tokyo)), "13:07:09 ");
    }

    #[test]
    fn pushed_lines_are_stamped_with_local_hours() {
        let before = Local::now().hour();
        let log = DiagnosticLog::new(4);
        log.push("stamp");
        let after = Local::now().hour();
        let line = log.last(1).pop().expect("line");
        let hour: u32 = line[..2].parse().expect("hour digits");
        assert!(hour == before || hour == after, "{line} vs {before}/{after}");
        assert_eq!(&line[2..3], ":");
    }

    #[test]
    fn writable_from_many_threads() {
        let log = DiagnosticLog::new(1000);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = log.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        log.push(format!("{t}:{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert_eq!(log.len(), 200);
    }
}

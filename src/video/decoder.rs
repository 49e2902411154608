//! The external frame decoder subprocess.

use crate::diagnostics::DiagnosticLog;
use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread;

/// A running decoder: raw frames on stdout, exit status on demand.
pub trait DecoderProcess: Send {
    /// Hand over the frame pipe. Only the first call returns it.
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>>;
    /// `Some` once the process has exited.
    fn poll_exit(&mut self) -> Option<String>;
    /// Force exit and reap.
    fn kill(&mut self);
}

/// Starts decoder processes. Tests swap in an in-memory fake.
pub trait DecoderLauncher: Send + Sync {
    fn launch(
        &self,
        url: &str,
        cols: u16,
        rows: u16,
        diag: &DiagnosticLog,
    ) -> Result<Box<dyn DecoderProcess>>;
}

/// Arguments for a low-latency raw RGB24 decode scaled to `cols`×`rows`.
pub fn ffmpeg_args(url: &str, cols: u16, rows: u16, fps: u32) -> Vec<String> {
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-fflags",
        "nobuffer",
        "-re",
        "-probesize",
        "32k",
        "-rw_timeout",
        "1500000",
        "-thread_queue_size",
        "512",
        "-i",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .chain([
        url.to_string(),
        "-an".to_string(),
        "-vf".to_string(),
        format!("scale={cols}:{rows}:flags=fast_bilinear,fps={fps}"),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "pipe:1".to_string(),
    ])
    .collect()
}

pub struct FfmpegLauncher {
    command: String,
    fps: u32,
}

impl FfmpegLauncher {
    pub fn new(command: impl Into<String>, fps: u32) -> Self {
        Self {
            command: command.into(),
            fps,
        }
    }
}

impl DecoderLauncher for FfmpegLauncher {
    fn launch(
        &self,
        url: &str,
        cols: u16,
        rows: u16,
        diag: &DiagnosticLog,
    ) -> Result<Box<dyn DecoderProcess>> {
        let mut child = Command::new(&self.command)
            .args(ffmpeg_args(url, cols, rows, self.fps))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", self.command))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("failed to capture decoder stderr"))?;
        let stderr_diag = diag.clone();
        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                let clean = strip_ansi_escapes::strip_str(&line);
                if !clean.trim().is_empty() {
                    stderr_diag.push(format!("ffmpeg: {}", clean.trim_end()));
                }
            }
        });

        diag.push(format!("ffmpeg started ({cols}x{rows} @ {} fps)", self.fps));
        Ok(Box::new(ChildDecoder { child }))
    }
}

struct ChildDecoder {
    child: Child,
}

impl DecoderProcess for ChildDecoder {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .stdout
            .take()
            .map(|stdout| Box::new(stdout) as Box<dyn Read + Send>)
    }

    fn poll_exit(&mut self) -> Option<String> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.to_string()),
            Ok(None) => None,
            Err(err) => Some(format!("wait failed: {err}")),
        }
    }

    fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for ChildDecoder {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            self.kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_match_the_low_latency_pipeline() {
        let args = ffmpeg_args("https://m/x.m3u8", 80, 21, 20);
        assert_eq!(
            args.join(" "),
            "-hide_banner -loglevel error -fflags nobuffer -re -probesize 32k \
             -rw_timeout 1500000 -thread_queue_size 512 -i https://m/x.m3u8 -an \
             -vf scale=80:21:flags=fast_bilinear,fps=20 -pix_fmt rgb24 -f rawvideo pipe:1"
        );
    }

    #[test]
    fn missing_binary_fails_to_launch() {
        let launcher = FfmpegLauncher::new("/nonexistent/nightterm-ffmpeg", 20);
        let diag = DiagnosticLog::new(8);
        assert!(launcher.launch("u", 10, 5, &diag).is_err());
    }
}

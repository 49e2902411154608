use super::defaults::{
    MAX_FADE_IN_MS, MAX_STREAM_RETRIES, MAX_STREAM_RETRY_DELAY_MS, MAX_VIDEO_FPS, MIN_VIDEO_FPS,
};
use super::{AppConfig, Layout, StreamConfig, VideoConfig, DEFAULT_FFMPEG_CMD};
use crate::stations::StationCatalog;
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::{fs, path::Path};

impl AppConfig {
    /// Check CLI values and normalize the decoder path.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_VIDEO_FPS..=MAX_VIDEO_FPS).contains(&self.video_fps) {
            bail!(
                "--video-fps must be between {MIN_VIDEO_FPS} and {MAX_VIDEO_FPS}, got {}",
                self.video_fps
            );
        }
        if !(1..=MAX_STREAM_RETRIES).contains(&self.stream_retries) {
            bail!(
                "--stream-retries must be between 1 and {MAX_STREAM_RETRIES}, got {}",
                self.stream_retries
            );
        }
        if self.stream_retry_delay_ms > MAX_STREAM_RETRY_DELAY_MS {
            bail!(
                "--stream-retry-delay-ms must be at most {MAX_STREAM_RETRY_DELAY_MS}, got {}",
                self.stream_retry_delay_ms
            );
        }
        if self.fade_in_ms > MAX_FADE_IN_MS {
            bail!(
                "--fade-in-ms must be at most {MAX_FADE_IN_MS}, got {}",
                self.fade_in_ms
            );
        }

        let url = self.metadata_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("--metadata-url must be an http(s) URL, got '{url}'");
        }
        self.metadata_url = url.to_string();

        if let Some(key) = &self.start_station {
            let key = key.trim().to_ascii_lowercase();
            if StationCatalog::builtin().index_of_key(&key).is_none() {
                bail!("--start-station '{key}' is not a known station");
            }
            self.start_station = Some(key);
        }

        if let Some(device) = &self.output_device {
            if device.trim().is_empty() || device.len() > 256 {
                bail!("--output-device must be 1-256 characters");
            }
        }

        self.ffmpeg_cmd = sanitize_binary(&self.ffmpeg_cmd, "--ffmpeg-cmd", &[DEFAULT_FFMPEG_CMD])?;
        Ok(())
    }

    pub fn layout(&self) -> Layout {
        if self.vertical {
            Layout::Vertical
        } else {
            Layout::Horizontal
        }
    }

    /// Whether debug or trace files are written at all.
    pub fn file_logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            retries: self.stream_retries,
            retry_delay_ms: self.stream_retry_delay_ms,
            fade_in_ms: self.fade_in_ms,
            output_device: self.output_device.clone(),
        }
    }

    pub fn video_config(&self) -> VideoConfig {
        VideoConfig {
            ffmpeg_cmd: self.ffmpeg_cmd.clone(),
            fps: self.video_fps,
            color: self.color_video,
        }
    }
}

/// Allow either a known binary name or an absolute path.
pub(super) fn sanitize_binary(value: &str, flag: &str, allowlist: &[&str]) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if let Some(allowed) = allowlist
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*allowed).to_string());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR) {
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
        let metadata = fs::metadata(&canonical)
            .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
        if !metadata.is_file() {
            bail!("{flag} '{}' is not a file", canonical.display());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = metadata.permissions().mode();
            if mode & 0o111 == 0 {
                bail!(
                    "{flag} '{}' exists but is not executable (mode {:o})",
                    canonical.display(),
                    mode
                );
            }
        }
        return canonical
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"));
    }

    bail!("{flag} must be one of {allowlist:?} or an existing binary path");
}

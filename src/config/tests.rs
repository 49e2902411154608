use super::defaults::{MAX_FADE_IN_MS, MAX_STREAM_RETRY_DELAY_MS};
use super::validation::sanitize_binary;
use super::{AppConfig, Layout};
use clap::Parser;
use std::env;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn accepts_valid_defaults() {
    let mut cfg = AppConfig::parse_from(["test-app"]);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.video_fps, 20);
    assert_eq!(cfg.stream_retries, 5);
    assert_eq!(cfg.stream_retry_delay_ms, 250);
    assert_eq!(cfg.fade_in_ms, 650);
    assert_eq!(cfg.layout(), Layout::Horizontal);
}

#[test]
fn rejects_video_fps_out_of_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--video-fps", "0"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--video-fps", "61"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_video_fps_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--video-fps", "1"]);
    assert!(cfg.validate().is_ok());
    let mut cfg = AppConfig::parse_from(["test-app", "--video-fps", "60"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_stream_retries_out_of_bounds() {
    let mut cfg = AppConfig::parse_from(["test-app", "--stream-retries", "0"]);
    assert!(cfg.validate().is_err());
    let mut cfg = AppConfig::parse_from(["test-app", "--stream-retries", "21"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_excessive_delays() {
    let too_long = (MAX_STREAM_RETRY_DELAY_MS + 1).to_string();
    let mut cfg = AppConfig::parse_from(["test-app", "--stream-retry-delay-ms", &too_long]);
    assert!(cfg.validate().is_err());

    let too_long = (MAX_FADE_IN_MS + 1).to_string();
    let mut cfg = AppConfig::parse_from(["test-app", "--fade-in-ms", &too_long]);
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_zero_fade_in() {
    let mut cfg = AppConfig::parse_from(["test-app", "--fade-in-ms", "0"]);
    assert!(cfg.validate().is_ok());
}

#[test]
fn rejects_non_http_metadata_url() {
    let mut cfg = AppConfig::parse_from(["test-app", "--metadata-url", "ftp://nightride.fm/meta"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn trims_metadata_url() {
    let mut cfg = AppConfig::parse_from(["test-app", "--metadata-url", " https://example.com/sse "]);
    cfg.validate().expect("trimmed url is valid");
    assert_eq!(cfg.metadata_url, "https://example.com/sse");
}

#[test]
fn start_station_must_be_known() {
    let mut cfg = AppConfig::parse_from(["test-app", "--start-station", "polka"]);
    assert!(cfg.validate().is_err());

    let mut cfg = AppConfig::parse_from(["test-app", "--start-station", "DarkSynth"]);
    cfg.validate().expect("known station");
    assert_eq!(cfg.start_station.as_deref(), Some("darksynth"));
}

#[test]
fn vertical_flag_selects_vertical_layout() {
    let mut cfg = AppConfig::parse_from(["test-app", "--vertical"]);
    cfg.validate().expect("valid");
    assert_eq!(cfg.layout(), Layout::Vertical);
    assert_eq!(cfg.layout().toggled(), Layout::Horizontal);
}

#[test]
fn horizontal_and_vertical_conflict() {
    assert!(AppConfig::try_parse_from(["test-app", "--horizontal", "--vertical"]).is_err());
}

#[test]
fn no_logs_overrides_logs() {
    let cfg = AppConfig::parse_from(["test-app", "--logs", "--no-logs"]);
    assert!(!cfg.file_logging_enabled());
    let cfg = AppConfig::parse_from(["test-app", "--logs"]);
    assert!(cfg.file_logging_enabled());
}

#[test]
fn fullscreen_child_flag_is_accepted() {
    let cfg = AppConfig::parse_from(["test-app", "--fullscreen-child"]);
    assert!(cfg.fullscreen_child);
}

#[test]
fn video_config_reflects_flags() {
    let mut cfg = AppConfig::parse_from(["test-app", "--color-video", "--video-fps", "12"]);
    cfg.validate().expect("valid");
    let video = cfg.video_config();
    assert!(video.color);
    assert_eq!(video.fps, 12);
    assert_eq!(video.ffmpeg_cmd, "ffmpeg");
}

#[test]
fn rejects_unknown_ffmpeg_name() {
    let mut cfg = AppConfig::parse_from(["test-app", "--ffmpeg-cmd", "not-ffmpeg"]);
    assert!(cfg.validate().is_err());
}

#[test]
fn sanitize_binary_normalizes_allowlisted_case() {
    let value = sanitize_binary("FFMPEG", "--ffmpeg-cmd", &["ffmpeg"]).expect("allowlisted");
    assert_eq!(value, "ffmpeg");
    assert!(sanitize_binary("   ", "--ffmpeg-cmd", &["ffmpeg"]).is_err());
}

#[cfg(unix)]
#[test]
fn ffmpeg_cmd_path_must_be_executable() {
    use std::os::unix::fs::PermissionsExt;

    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = env::temp_dir().join(format!("ffmpeg_cmd_test_{unique}"));
    fs::write(&temp_path, "#!/bin/sh\nexit 0\n").unwrap();
    let mut perms = fs::metadata(&temp_path).unwrap().permissions();
    perms.set_mode(0o600);
    fs::set_permissions(&temp_path, perms.clone()).unwrap();

    let mut cfg = AppConfig::parse_from(["test-app", "--ffmpeg-cmd", temp_path.to_str().unwrap()]);
    assert!(
        cfg.validate().is_err(),
        "non-executable binary path should be rejected"
    );

    perms.set_mode(0o700);
    fs::set_permissions(&temp_path, perms).unwrap();
    let mut cfg = AppConfig::parse_from(["test-app", "--ffmpeg-cmd", temp_path.to_str().unwrap()]);
    assert!(
        cfg.validate().is_ok(),
        "executable binary path should be accepted"
    );

    let _ = fs::remove_file(&temp_path);
}

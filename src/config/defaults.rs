//! Tunables shared across the player, the visualizer and the video pipeline.

use std::time::Duration;

pub const DEFAULT_FFMPEG_CMD: &str = "ffmpeg";
pub const DEFAULT_VIDEO_FPS: u32 = 20;
pub const MIN_VIDEO_FPS: u32 = 1;
pub const MAX_VIDEO_FPS: u32 = 60;

pub const DEFAULT_METADATA_URL: &str = "https://nightride.fm/meta";

pub const DEFAULT_STREAM_RETRIES: u32 = 5;
pub const MAX_STREAM_RETRIES: u32 = 20;
pub const DEFAULT_STREAM_RETRY_DELAY_MS: u64 = 250;
pub const MAX_STREAM_RETRY_DELAY_MS: u64 = 10_000;
pub const DEFAULT_FADE_IN_MS: u64 = 650;
pub const MAX_FADE_IN_MS: u64 = 10_000;

/// Visualizer frame period (~30 Hz).
pub const VISUALIZER_TICK: Duration = Duration::from_millis(33);
/// Title marquee step period.
pub const SCROLL_TICK: Duration = Duration::from_millis(300);
/// Visible columns of a scrolling title.
pub const TITLE_WINDOW: usize = 43;
/// Gap inserted between the end of a scrolling title and its restart.
pub const TITLE_GAP: &str = "    ";

pub const METADATA_BACKOFF_START: Duration = Duration::from_secs(1);
pub const METADATA_BACKOFF_MAX: Duration = Duration::from_secs(30);
pub const METADATA_CHANNEL_CAPACITY: usize = 64;

pub const AUDIO_EVENT_CAPACITY: usize = 32;
pub const VIDEO_EVENT_CAPACITY: usize = 16;
pub const INPUT_CHANNEL_CAPACITY: usize = 64;

/// Raw frames buffered between the decoder pipe and the converter.
pub const FRAME_QUEUE_CAPACITY: usize = 2;
/// Smallest terminal height the video view lays out for.
pub const MIN_VIDEO_ROWS: u16 = 8;
/// Rows reserved for the video header and control bar.
pub const VIDEO_CHROME_ROWS: u16 = 3;
/// Smallest terminal width the video view lays out for.
pub const MIN_VIDEO_COLS: u16 = 10;
/// How often the decoder watcher checks for subprocess exit.
pub const DECODER_POLL_INTERVAL: Duration = Duration::from_millis(50);

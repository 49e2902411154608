//! Command-line parsing and validation helpers.

pub mod defaults;
#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;

pub use defaults::{
    AUDIO_EVENT_CAPACITY, DECODER_POLL_INTERVAL, DEFAULT_FADE_IN_MS, DEFAULT_FFMPEG_CMD,
    DEFAULT_METADATA_URL, DEFAULT_STREAM_RETRIES, DEFAULT_STREAM_RETRY_DELAY_MS,
    DEFAULT_VIDEO_FPS, FRAME_QUEUE_CAPACITY, INPUT_CHANNEL_CAPACITY, METADATA_BACKOFF_MAX,
    METADATA_BACKOFF_START, METADATA_CHANNEL_CAPACITY, MIN_VIDEO_COLS, MIN_VIDEO_ROWS,
    SCROLL_TICK, TITLE_GAP, TITLE_WINDOW, VIDEO_CHROME_ROWS, VIDEO_EVENT_CAPACITY,
    VISUALIZER_TICK,
};

/// CLI options for the nightterm console. Validated values keep downstream subprocesses safe.
#[derive(Debug, Parser, Clone)]
#[command(name = "nightterm", about = "Nightride radio console", author, version)]
pub struct AppConfig {
    /// FFmpeg binary used to decode live video into raw frames
    #[arg(long, env = "NIGHTTERM_FFMPEG", default_value = DEFAULT_FFMPEG_CMD)]
    pub ffmpeg_cmd: String,

    /// Frame rate requested from the video decoder
    #[arg(long = "video-fps", default_value_t = DEFAULT_VIDEO_FPS)]
    pub video_fps: u32,

    /// Start the ASCII video view in 24-bit color instead of mono
    #[arg(long = "color-video", default_value_t = false)]
    pub color_video: bool,

    /// Server-sent events endpoint for now-playing metadata
    #[arg(long = "metadata-url", env = "NIGHTTERM_METADATA_URL", default_value = DEFAULT_METADATA_URL)]
    pub metadata_url: String,

    /// Do not connect to the metadata endpoint
    #[arg(long = "no-metadata", default_value_t = false)]
    pub no_metadata: bool,

    /// Connection attempts per audio stream before giving up
    #[arg(long = "stream-retries", default_value_t = DEFAULT_STREAM_RETRIES)]
    pub stream_retries: u32,

    /// Delay between audio stream attempts (milliseconds)
    #[arg(long = "stream-retry-delay-ms", default_value_t = DEFAULT_STREAM_RETRY_DELAY_MS)]
    pub stream_retry_delay_ms: u64,

    /// Linear fade-in applied when a stream starts (milliseconds)
    #[arg(long = "fade-in-ms", default_value_t = DEFAULT_FADE_IN_MS)]
    pub fade_in_ms: u64,

    /// Station key to play on launch (e.g. darksynth)
    #[arg(long = "start-station", env = "NIGHTTERM_STATION")]
    pub start_station: Option<String>,

    /// Preferred audio output device name
    #[arg(long = "output-device")]
    pub output_device: Option<String>,

    /// Print detected audio output devices and exit
    #[arg(long = "list-output-devices", default_value_t = false)]
    pub list_output_devices: bool,

    /// Visualizer beside the station list (default)
    #[arg(long, default_value_t = false, conflicts_with = "vertical")]
    pub horizontal: bool,

    /// Visualizer above the station list
    #[arg(long, default_value_t = false)]
    pub vertical: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "NIGHTTERM_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "NIGHTTERM_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging track titles and chat text (debug log only)
    #[arg(
        long = "log-content",
        env = "NIGHTTERM_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Run the full-screen child animation (used internally)
    #[arg(long = "fullscreen-child", hide = true, default_value_t = false)]
    pub fullscreen_child: bool,
}

/// Arrangement of the visualizer relative to the station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Horizontal,
    Vertical,
}

impl Layout {
    pub fn toggled(self) -> Self {
        match self {
            Layout::Horizontal => Layout::Vertical,
            Layout::Vertical => Layout::Horizontal,
        }
    }
}

/// Settings for one audio stream attempt cycle.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub fade_in_ms: u64,
    pub output_device: Option<String>,
}

/// Settings handed to the live video pipeline.
#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub ffmpeg_cmd: String,
    pub fps: u32,
    pub color: bool,
}

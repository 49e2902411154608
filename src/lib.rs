pub mod audio;
pub mod compositor;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod fullscreen;
mod lock;
mod logging;
pub mod mailbox;
pub mod metadata;
pub mod stations;
mod telemetry;
pub mod terminal_restore;
pub mod ui;
pub mod video;

pub use logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
    ContentKind,
};
pub use telemetry::init_tracing;

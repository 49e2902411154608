//! Live video → ASCII.
//!
//! [`LiveFrameSource`] resolves a station's video page to an HLS manifest,
//! runs the decoder subprocess and converts raw RGB frames into terminal text.

mod convert;
mod decoder;
mod resolve;
mod source;

pub use convert::{luma, to_color_ascii, to_mono_ascii, GlyphTable};
pub use decoder::{ffmpeg_args, DecoderLauncher, DecoderProcess, FfmpegLauncher};
pub use resolve::{extract_video_id, ManifestResolver, ResolutionError, YouTubeResolver};
pub use source::{
    FrameGeometry, LiveFrameSource, RenderedFrame, SessionToken, StartOutcome, VideoEvent,
};

#[cfg(test)]
mod tests;

//! HTTP MP3 stream fetch and pull-style decode to interleaved stereo `f32`.

use crate::diagnostics::DiagnosticLog;
use std::fmt;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a stream could not be opened or stopped producing audio.
#[derive(Debug)]
pub enum StreamError {
    Http(String),
    Status(u16),
    Format(String),
    NoTrack,
    Decode(String),
    /// Playback was stopped while connecting.
    Cancelled,
    /// Every attempt failed; carries the last failure.
    Exhausted { attempts: u32, last: Box<StreamError> },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Http(err) => write!(f, "http error: {err}"),
            StreamError::Status(code) => write!(f, "server returned status {code}"),
            StreamError::Format(err) => write!(f, "unrecognized stream: {err}"),
            StreamError::NoTrack => write!(f, "stream has no audio track"),
            StreamError::Decode(err) => write!(f, "decode failed: {err}"),
            StreamError::Cancelled => write!(f, "cancelled"),
            StreamError::Exhausted { attempts, last } => {
                write!(f, "failed to open stream after {attempts} attempts ({last})")
            }
        }
    }
}

impl std::error::Error for StreamError {}

/// A connected, recognized stream ready to yield decoded blocks.
pub struct StreamDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    sample_buf: Option<SampleBuffer<f32>>,
}

impl StreamDecoder {
    /// Open `reader` as MP3 and prepare a decoder for its first audio track.
    pub fn from_reader(reader: Box<dyn Read + Send + Sync>) -> Result<Self, StreamError> {
        let source = MediaSourceStream::new(Box::new(ReadOnlySource::new(reader)), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("mp3");
        let opened = symphonia::default::get_probe()
            .format(
                &hint,
                source,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| StreamError::Format(err.to_string()))?;
        let format = opened.format;
        let track = format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(StreamError::NoTrack)?;
        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|err| StreamError::Decode(err.to_string()))?;
        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            sample_buf: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Next decoded block as interleaved stereo, or `None` at end of stream.
    /// Corrupt packets are skipped.
    pub fn next_block(&mut self) -> Result<Option<Vec<f32>>, StreamError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(err) => return Err(StreamError::Decode(err.to_string())),
            };
            if packet.track_id() != self.track_id {
                continue;
            }
            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(err) => return Err(StreamError::Decode(err.to_string())),
            };
            let spec = *decoded.spec();
            self.sample_rate = spec.rate;
            let channels = spec.channels.count();
            let needed = decoded.capacity();
            let too_small = self
                .sample_buf
                .as_ref()
                .map_or(true, |buf| buf.capacity() < needed * channels);
            if too_small {
                self.sample_buf = Some(SampleBuffer::<f32>::new(needed as u64, spec));
            }
            let Some(buf) = self.sample_buf.as_mut() else {
                continue;
            };
            buf.copy_interleaved_ref(decoded);
            return Ok(Some(to_stereo(buf.samples(), channels)));
        }
    }
}

/// Map any channel layout onto interleaved stereo.
pub(crate) fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        2 => samples.to_vec(),
        0 | 1 => samples.iter().flat_map(|s| [*s, *s]).collect(),
        n => samples
            .chunks_exact(n)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

fn connect(url: &str) -> Result<StreamDecoder, StreamError> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(CONNECT_TIMEOUT)
        .build();
    let response = agent.get(url).call().map_err(|err| match err {
        ureq::Error::Status(code, _) => StreamError::Status(code),
        other => StreamError::Http(other.to_string()),
    })?;
    StreamDecoder::from_reader(response.into_reader())
}

/// Connect and open the decoder with bounded retries. `stop` aborts between attempts.
pub fn open_with_retries(
    url: &str,
    attempts: u32,
    delay: Duration,
    stop: &AtomicBool,
    diag: &DiagnosticLog,
) -> Result<StreamDecoder, StreamError> {
    open_with(url, attempts, delay, stop, diag, connect)
}

pub(crate) fn open_with<F>(
    url: &str,
    attempts: u32,
    delay: Duration,
    stop: &AtomicBool,
    diag: &DiagnosticLog,
    mut connect: F,
) -> Result<StreamDecoder, StreamError>
where
    F: FnMut(&str) -> Result<StreamDecoder, StreamError>,
{
    let attempts = attempts.max(1);
    let mut last = StreamError::Cancelled;
    for attempt in 1..=attempts {
        if stop.load(Ordering::Relaxed) {
            return Err(StreamError::Cancelled);
        }
        match connect(url) {
            Ok(decoder) => return Ok(decoder),
            Err(err) => {
                diag.push(format!("stream attempt {attempt}/{attempts} failed: {err}"));
                last = err;
            }
        }
        if attempt < attempts {
            thread::sleep(delay);
        }
    }
    Err(StreamError::Exhausted {
        attempts,
        last: Box::new(last),
    })
}

/// Linear gain ramp over the first `total` frames of a stream.
#[derive(Debug, Clone)]
pub(crate) struct FadeIn {
    total: usize,
    done: usize,
}

impl FadeIn {
    pub(crate) fn new(sample_rate: u32, duration: Duration) -> Self {
        let total = (sample_rate as f64 * duration.as_secs_f64()).round() as usize;
        Self {
            total: total.max(1),
            done: 0,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done >= self.total
    }

    /// Scale an interleaved stereo block in place.
    pub(crate) fn apply(&mut self, interleaved: &mut [f32]) {
        if self.is_done() {
            return;
        }
        for frame in interleaved.chunks_exact_mut(2) {
            if self.done >= self.total {
                break;
            }
            let gain = (self.done + 1) as f32 / self.total as f32;
            frame[0] *= gain;
            frame[1] *= gain;
            self.done += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;

    #[test]
    fn mono_is_duplicated_and_surround_is_truncated() {
        assert_eq!(to_stereo(&[0.1, 0.2], 1), vec![0.1, 0.1, 0.2, 0.2]);
        assert_eq!(to_stereo(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3), vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(to_stereo(&[1.0, 2.0], 2), vec![1.0, 2.0]);
    }

    #[test]
    fn fade_in_ramps_then_passes_through() {
        let mut fade = FadeIn::new(4, Duration::from_secs(1));
        let mut block = vec![1.0f32; 12];
        fade.apply(&mut block);
        assert_eq!(&block[..8], &[0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0, 1.0]);
        assert_eq!(&block[8..], &[1.0; 4]);
        assert!(fade.is_done());
    }

    #[test]
    fn fade_in_continues_across_blocks() {
        let mut fade = FadeIn::new(4, Duration::from_secs(1));
        let mut first = vec![1.0f32; 4];
        let mut second = vec![1.0f32; 4];
        fade.apply(&mut first);
        fade.apply(&mut second);
        assert_eq!(first, vec![0.25, 0.25, 0.5, 0.5]);
        assert_eq!(second, vec![0.75, 0.75, 1.0, 1.0]);
    }

    #[test]
    fn garbage_bytes_are_not_recognized_as_mp3() {
        let reader: Box<dyn Read + Send + Sync> = Box::new(Cursor::new(vec![0u8; 64]));
        assert!(StreamDecoder::from_reader(reader).is_err());
    }

    #[test]
    fn retries_are_bounded() {
        let calls = Cell::new(0);
        let stop = AtomicBool::new(false);
        let diag = DiagnosticLog::new(16);
        let result = open_with("http://example.invalid", 5, Duration::ZERO, &stop, &diag, |_| {
            calls.set(calls.get() + 1);
            Err(StreamError::Status(503))
        });
        assert_eq!(calls.get(), 5);
        assert_eq!(diag.len(), 5);
        match result {
            Err(StreamError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, StreamError::Status(503)));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn stop_flag_cancels_before_connecting() {
        let stop = AtomicBool::new(true);
        let diag = DiagnosticLog::new(16);
        let result = open_with("http://example.invalid", 5, Duration::ZERO, &stop, &diag, |_| {
            panic!("should not connect")
        });
        assert!(matches!(result, Err(StreamError::Cancelled)));
    }
}

//! Speaker output via CPAL.
//!
//! The decoder thread fills a shared sample queue at the device rate and
//! channel count; the realtime callback drains it. The callback never waits on
//! the lock: if the decoder holds it, that block is played as silence.

use super::amplitude::AmplitudeExtractor;
use crate::lock::lock_or_recover;
use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub(crate) type SharedQueue = Arc<Mutex<VecDeque<f32>>>;

/// Copy queued samples into `out`, padding with silence. Returns `false` when
/// the queue was busy and the whole block is silence.
pub(crate) fn fill_from_queue(queue: &Mutex<VecDeque<f32>>, out: &mut [f32]) -> bool {
    let Ok(mut samples) = queue.try_lock() else {
        out.fill(0.0);
        return false;
    };
    let available = samples.len().min(out.len());
    for (slot, sample) in out.iter_mut().zip(samples.drain(..available)) {
        *slot = sample;
    }
    out[available..].fill(0.0);
    true
}

/// Map an interleaved stereo block onto the device's channel count.
pub(crate) fn stereo_to_device(stereo: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        2 => stereo.to_vec(),
        0 | 1 => stereo
            .chunks_exact(2)
            .map(|frame| (frame[0] + frame[1]) * 0.5)
            .collect(),
        n => {
            let mut out = Vec::with_capacity(stereo.len() / 2 * n);
            for frame in stereo.chunks_exact(2) {
                out.push(frame[0]);
                out.push(frame[1]);
                out.extend(std::iter::repeat(0.0).take(n - 2));
            }
            out
        }
    }
}

/// The stereo pair of a device block; channels past the second are padded silence.
pub(crate) fn front_pair<'a>(
    device: &'a [f32],
    channels: usize,
    out: &'a mut Vec<f32>,
) -> (&'a [f32], usize) {
    if channels <= 2 {
        return (device, channels.max(1));
    }
    out.clear();
    for frame in device.chunks_exact(channels) {
        out.extend_from_slice(&frame[..2]);
    }
    (out.as_slice(), 2)
}

/// An open output stream plus the queue feeding it.
pub struct AudioOutput {
    _stream: cpal::Stream,
    queue: SharedQueue,
    sample_rate: u32,
    channels: usize,
}

impl AudioOutput {
    /// List output device names so the CLI can expose a selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .context("no output devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Open the preferred (or default) output device and start playing the queue.
    pub fn open(preferred_device: Option<&str>, extractor: AmplitudeExtractor) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host
                    .output_devices()
                    .context("no output devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("output device '{name}' not found"))?
            }
            None => host
                .default_output_device()
                .context("no default output device available")?,
        };
        let default_config = device.default_output_config()?;
        let format = default_config.sample_format();
        let config: StreamConfig = default_config.into();
        let sample_rate = config.sample_rate.0;
        let channels = usize::from(config.channels.max(1));
        log_debug(&format!(
            "Output config: format={format:?} sample_rate={sample_rate}Hz channels={channels}"
        ));

        let queue: SharedQueue = Arc::new(Mutex::new(VecDeque::new()));
        let err_fn = |err| log_debug(&format!("audio_output_error: {err}"));
        let mut pump = OutputPump {
            queue: Arc::clone(&queue),
            extractor,
            channels,
            scratch: Vec::new(),
            stereo: Vec::new(),
        };

        let stream = match format {
            SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _| pump.render(data.len(), |i, s| data[i] = s),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _| {
                    pump.render(data.len(), |i, s| {
                        data[i] = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                    })
                },
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_output_stream(
                &config,
                move |data: &mut [u16], _| {
                    pump.render(data.len(), |i, s| {
                        data[i] = ((s.clamp(-1.0, 1.0) + 1.0) * 32_767.5) as u16
                    })
                },
                err_fn,
                None,
            )?,
            other => return Err(anyhow!("unsupported sample format: {other:?}")),
        };
        stream.play()?;

        Ok(Self {
            _stream: stream,
            queue,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub(crate) fn queue(&self) -> SharedQueue {
        Arc::clone(&self.queue)
    }

    /// Drop everything not yet played.
    pub fn clear(&self) {
        lock_or_recover(&self.queue, "audio_output_clear").clear();
    }
}

/// State owned by the realtime callback.
struct OutputPump {
    queue: SharedQueue,
    extractor: AmplitudeExtractor,
    channels: usize,
    scratch: Vec<f32>,
    stereo: Vec<f32>,
}

impl OutputPump {
    fn render(&mut self, len: usize, mut write: impl FnMut(usize, f32)) {
        self.scratch.resize(len, 0.0);
        fill_from_queue(&self.queue, &mut self.scratch);
        for (i, sample) in self.scratch.iter().enumerate() {
            write(i, *sample);
        }
        let (block, channels) = front_pair(&self.scratch, self.channels, &mut self.stereo);
        self.extractor.publish(block, channels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_drains_queue_and_pads_with_silence() {
        let queue = Mutex::new(VecDeque::from(vec![0.1, 0.2, 0.3]));
        let mut out = [9.0f32; 5];
        assert!(fill_from_queue(&queue, &mut out));
        assert_eq!(out, [0.1, 0.2, 0.3, 0.0, 0.0]);
        assert!(lock_or_recover(&queue, "test").is_empty());
    }

    #[test]
    fn fill_outputs_silence_when_queue_is_busy() {
        let queue = Mutex::new(VecDeque::from(vec![0.5; 8]));
        let _held = queue.lock().expect("lock");
        let mut out = [9.0f32; 4];
        assert!(!fill_from_queue(&queue, &mut out));
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn stereo_maps_to_device_layouts() {
        let stereo = [0.2, 0.4, -0.2, -0.4];
        assert_eq!(stereo_to_device(&stereo, 2), stereo.to_vec());
        let mono = stereo_to_device(&stereo, 1);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] + 0.3).abs() < 1e-6);
        assert_eq!(
            stereo_to_device(&stereo, 4),
            vec![0.2, 0.4, 0.0, 0.0, -0.2, -0.4, 0.0, 0.0]
        );
    }

    #[test]
    fn surround_devices_publish_full_scale_amplitudes() {
        let stereo = vec![0.8f32; 2 * 600];
        let six = stereo_to_device(&stereo, 6);
        let mut pair = Vec::new();
        let (block, channels) = front_pair(&six, 6, &mut pair);
        assert_eq!(channels, 2);
        assert_eq!(block.len(), stereo.len());
        for amp in crate::audio::extract_amplitudes(block, channels, 31) {
            assert!((amp - 0.8).abs() < 1e-6);
        }

        let mut unused = Vec::new();
        let (block, channels) = front_pair(&stereo, 2, &mut unused);
        assert_eq!((block.len(), channels), (stereo.len(), 2));
        assert!(unused.is_empty());
    }
}

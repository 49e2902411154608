#[cfg(feature = "high-quality-audio")]
use crate::log_debug;
#[cfg(feature = "high-quality-audio")]
use anyhow::{anyhow, Result};
#[cfg(feature = "high-quality-audio")]
use rubato::{InterpolationParameters, InterpolationType, Resampler, SincFixedIn, WindowFunction};
#[cfg(feature = "high-quality-audio")]
use std::sync::atomic::{AtomicBool, Ordering};

// Practical bounds for stream and device rates.
pub(super) const MIN_DEVICE_RATE: u32 = 8_000;
pub(super) const MAX_DEVICE_RATE: u32 = 384_000;

#[cfg(feature = "high-quality-audio")]
const SINC_CHUNK_FRAMES: usize = 1024;

#[cfg(feature = "high-quality-audio")]
static RESAMPLER_WARNING_SHOWN: AtomicBool = AtomicBool::new(false);

/// Streaming stereo sample-rate converter between the decoded stream and the output device.
///
/// Input and output are interleaved `[L, R, L, R, ...]`. With the
/// `high-quality-audio` feature a sinc resampler is used; otherwise (or if it
/// cannot be constructed) each block goes through linear interpolation.
pub(crate) struct StereoResampler {
    from_rate: u32,
    to_rate: u32,
    #[cfg(feature = "high-quality-audio")]
    sinc: Option<SincFixedIn<f32>>,
    #[cfg(feature = "high-quality-audio")]
    pending: [Vec<f32>; 2],
}

impl StereoResampler {
    pub(crate) fn new(from_rate: u32, to_rate: u32) -> Self {
        #[cfg(feature = "high-quality-audio")]
        let sinc = if from_rate == to_rate {
            None
        } else {
            match build_sinc(from_rate, to_rate) {
                Ok(sinc) => Some(sinc),
                Err(err) => {
                    if !RESAMPLER_WARNING_SHOWN.swap(true, Ordering::AcqRel) {
                        log_debug(&format!(
                            "high-quality resampler failed ({err}); falling back to basic path"
                        ));
                    }
                    None
                }
            }
        };
        Self {
            from_rate,
            to_rate,
            #[cfg(feature = "high-quality-audio")]
            sinc,
            #[cfg(feature = "high-quality-audio")]
            pending: [Vec::new(), Vec::new()],
        }
    }

    pub(crate) fn is_passthrough(&self) -> bool {
        self.from_rate == self.to_rate
    }

    /// Convert one interleaved stereo block. The sinc path buffers internally,
    /// so output length may lag input by up to one chunk.
    pub(crate) fn process(&mut self, interleaved: &[f32]) -> Vec<f32> {
        if self.is_passthrough() || interleaved.is_empty() {
            return interleaved.to_vec();
        }

        #[cfg(feature = "high-quality-audio")]
        if self.sinc.is_some() {
            match self.process_sinc(interleaved) {
                Ok(out) => return out,
                Err(err) => {
                    log_debug(&format!("sinc resampler error ({err}); using linear path"));
                    self.sinc = None;
                }
            }
        }

        basic_resample(interleaved, self.from_rate, self.to_rate)
    }

    #[cfg(feature = "high-quality-audio")]
    fn process_sinc(&mut self, interleaved: &[f32]) -> Result<Vec<f32>> {
        let [left, right] = &mut self.pending;
        for frame in interleaved.chunks_exact(2) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
        let Some(sinc) = self.sinc.as_mut() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        while self.pending[0].len() >= SINC_CHUNK_FRAMES {
            let chunk = [
                self.pending[0][..SINC_CHUNK_FRAMES].to_vec(),
                self.pending[1][..SINC_CHUNK_FRAMES].to_vec(),
            ];
            let produced = sinc
                .process(&chunk, None)
                .map_err(|e| anyhow!("resampler process failed: {e:?}"))?;
            self.pending[0].drain(..SINC_CHUNK_FRAMES);
            self.pending[1].drain(..SINC_CHUNK_FRAMES);
            interleave_into(&mut out, &produced[0], &produced[1]);
        }
        Ok(out)
    }
}

#[cfg(feature = "high-quality-audio")]
fn build_sinc(from_rate: u32, to_rate: u32) -> Result<SincFixedIn<f32>> {
    for rate in [from_rate, to_rate] {
        if !(MIN_DEVICE_RATE..=MAX_DEVICE_RATE).contains(&rate) {
            return Err(anyhow!("unsupported sample rate {rate}Hz for resampling"));
        }
    }
    let ratio = to_rate as f64 / from_rate as f64;
    let params = InterpolationParameters {
        sinc_len: 64,
        f_cutoff: 0.95,
        interpolation: InterpolationType::Cubic,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };
    //             ratio, drift, params, chunk_size, channels
    SincFixedIn::<f32>::new(ratio, 1.1, params, SINC_CHUNK_FRAMES, 2)
        .map_err(|e| anyhow!("failed to construct sinc resampler: {e:?}"))
}

/// Linear resample of an interleaved stereo block.
pub(super) fn basic_resample(interleaved: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == 0 || to_rate == 0 || interleaved.is_empty() {
        return interleaved.to_vec();
    }
    if !(MIN_DEVICE_RATE..=MAX_DEVICE_RATE).contains(&from_rate)
        || !(MIN_DEVICE_RATE..=MAX_DEVICE_RATE).contains(&to_rate)
    {
        return interleaved.to_vec();
    }
    let ratio = to_rate as f32 / from_rate as f32;
    let (left, right) = deinterleave(interleaved);
    let left = resample_linear(&left, ratio);
    let right = resample_linear(&right, ratio);
    let mut out = Vec::with_capacity(left.len() * 2);
    interleave_into(&mut out, &left, &right);
    out
}

/// Lightweight linear resampler; `ratio > 1` upsamples.
pub(super) fn resample_linear(input: &[f32], ratio: f32) -> Vec<f32> {
    let input_len = input.len();
    let output_len = (input_len as f32 * ratio).round() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f32 / ratio;
        let idx = src_idx.floor() as usize;
        let frac = src_idx - idx as f32;

        if idx + 1 < input_len {
            output.push(input[idx] * (1.0 - frac) + input[idx + 1] * frac);
        } else {
            output.push(input.last().copied().unwrap_or(0.0));
        }
    }

    output
}

pub(super) fn deinterleave(interleaved: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let frames = interleaved.len() / 2;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in interleaved.chunks_exact(2) {
        left.push(frame[0]);
        right.push(frame[1]);
    }
    (left, right)
}

fn interleave_into(out: &mut Vec<f32>, left: &[f32], right: &[f32]) {
    out.reserve(left.len() * 2);
    for (l, r) in left.iter().zip(right) {
        out.push(*l);
        out.push(*r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_ramp(frames: usize) -> Vec<f32> {
        (0..frames)
            .flat_map(|i| {
                let v = (i as f32 / frames as f32) * 0.5;
                [v, -v]
            })
            .collect()
    }

    #[test]
    fn equal_rates_pass_through() {
        let mut rs = StereoResampler::new(44_100, 44_100);
        assert!(rs.is_passthrough());
        let block = stereo_ramp(100);
        assert_eq!(rs.process(&block), block);
    }

    #[test]
    fn linear_resample_scales_length() {
        let out = resample_linear(&[0.0, 1.0, 2.0, 3.0], 2.0);
        assert_eq!(out.len(), 8);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn basic_resample_keeps_channels_separate() {
        let block = stereo_ramp(441);
        let out = basic_resample(&block, 44_100, 48_000);
        assert_eq!(out.len() % 2, 0);
        assert_eq!(out.len() / 2, 480);
        for frame in out.chunks_exact(2) {
            assert!(frame[0] >= 0.0);
            assert!(frame[1] <= 0.0);
        }
    }

    #[test]
    fn basic_resample_ignores_out_of_range_rates() {
        let block = stereo_ramp(10);
        assert_eq!(basic_resample(&block, 100, 48_000), block);
        assert_eq!(basic_resample(&block, 0, 48_000), block);
    }

    #[test]
    fn deinterleave_splits_channels() {
        let (l, r) = deinterleave(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(l, vec![1.0, 3.0]);
        assert_eq!(r, vec![2.0, 4.0]);
    }

    #[test]
    fn streaming_output_tracks_rate_ratio() {
        let mut rs = StereoResampler::new(44_100, 48_000);
        let mut produced = 0usize;
        for _ in 0..50 {
            produced += rs.process(&stereo_ramp(441)).len() / 2;
        }
        let expected = 50 * 480;
        // Allow for the sinc path holding back one chunk.
        assert!(produced + 2048 >= expected, "produced {produced}");
        assert!(produced <= expected + 2048, "produced {produced}");
    }
}

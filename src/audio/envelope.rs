//! Bar-height smoothing for the visualizer.

const GLOBAL_GAIN: f32 = 0.55;
const PEAK_DECAY: f32 = 0.93;
const PEAK_FLOOR: f32 = 1e-6;
const INITIAL_PEAK: f32 = 0.25;
const GAMMA: f32 = 0.85;
const ATTACK: f32 = 0.9;
const DECAY: f32 = 0.30;

/// Turns amplitude vectors into bar heights in `[0, rows - 1]`.
///
/// A decaying peak tracks recent loudness so quiet and loud streams both fill
/// the mask. Bars rise fast and fall slowly, then get a 1:2:1 blur.
#[derive(Debug, Clone)]
pub struct VisualizerEnvelope {
    rows: usize,
    peak: f32,
    heights: Vec<usize>,
    scratch: Vec<usize>,
}

impl VisualizerEnvelope {
    pub fn new(width: usize, rows: usize) -> Self {
        Self {
            rows: rows.max(1),
            peak: INITIAL_PEAK,
            heights: vec![0; width],
            scratch: vec![0; width],
        }
    }

    pub fn heights(&self) -> &[usize] {
        &self.heights
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Advance one frame. Without a new vector the bars hold still.
    pub fn tick(&mut self, amplitudes: Option<&[f32]>) {
        let Some(amps) = amplitudes else {
            return;
        };
        let frame_max = amps.iter().copied().fold(0.0f32, f32::max);
        self.peak = (self.peak * PEAK_DECAY).max(frame_max).max(PEAK_FLOOR);

        let max_height = self.rows - 1;
        let gain = GLOBAL_GAIN * max_height as f32 / self.peak;
        for (column, height) in self.heights.iter_mut().enumerate() {
            let amp = amps.get(column).copied().unwrap_or(0.0).max(0.0);
            let shaped = amp.powf(GAMMA) * gain;
            let current = *height as f32;
            let alpha = if shaped > current { ATTACK } else { DECAY };
            let blended = alpha * shaped + (1.0 - alpha) * current;
            *height = (blended as usize).min(max_height);
        }

        let last = self.heights.len().saturating_sub(1);
        for (i, out) in self.scratch.iter_mut().enumerate() {
            let left = self.heights[i.saturating_sub(1)];
            let mid = self.heights[i];
            let right = self.heights[(i + 1).min(last)];
            *out = ((left + mid * 2 + right) / 4).min(max_height);
        }
        std::mem::swap(&mut self.heights, &mut self.scratch);
    }
}

use crate::mailbox::{mailbox, MailboxReceiver, MailboxSender, Offer, OverflowPolicy};

/// Per-column loudness of one block of interleaved audio.
///
/// The block is split into `width` buckets of `max(1, frames / width)` frames.
/// Each frame is mixed to mono by averaging its channels, and each bucket is
/// reduced to its RMS. Buckets that start past the end of a short block read 0.
pub fn extract_amplitudes(interleaved: &[f32], channels: usize, width: usize) -> Vec<f32> {
    let mut out = vec![0.0; width];
    fill_amplitudes(&mut out, interleaved, channels);
    out
}

fn fill_amplitudes(out: &mut [f32], interleaved: &[f32], channels: usize) {
    let width = out.len();
    if width == 0 {
        return;
    }
    let channels = channels.max(1);
    let frames = interleaved.len() / channels;
    let bucket = (frames / width).max(1);

    for (column, slot) in out.iter_mut().enumerate() {
        let start = column * bucket;
        let end = (start + bucket).min(frames);
        if start >= end {
            *slot = 0.0;
            continue;
        }
        let mut sum_sq = 0.0f32;
        for frame in interleaved[start * channels..end * channels].chunks_exact(channels) {
            let mono = frame.iter().sum::<f32>() / channels as f32;
            sum_sq += mono * mono;
        }
        *slot = (sum_sq / (end - start) as f32).sqrt();
    }
}

/// Runs inside the realtime output callback: computes an amplitude vector for
/// every block played and hands it to the visualizer without blocking.
pub struct AmplitudeExtractor {
    width: usize,
    tx: MailboxSender<Vec<f32>>,
}

impl AmplitudeExtractor {
    /// Extractor plus the receiving end the visualizer drains once per tick.
    /// The mailbox holds one vector; a newer one is dropped while it is full.
    pub fn new(width: usize) -> (Self, MailboxReceiver<Vec<f32>>) {
        let (tx, rx) = mailbox(1, OverflowPolicy::DropNewest);
        (Self { width, tx }, rx)
    }

    pub fn publish(&mut self, interleaved: &[f32], channels: usize) -> Offer {
        let amps = extract_amplitudes(interleaved, channels, self.width);
        self.tx.offer(amps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_length_matches_width() {
        let block = vec![0.5f32; 2 * 1024];
        assert_eq!(extract_amplitudes(&block, 2, 31).len(), 31);
        assert_eq!(extract_amplitudes(&[], 2, 31).len(), 31);
        assert_eq!(extract_amplitudes(&block, 2, 4096).len(), 4096);
    }

    #[test]
    fn silence_yields_zeros() {
        let block = vec![0.0f32; 2 * 512];
        assert!(extract_amplitudes(&block, 2, 31).iter().all(|a| *a == 0.0));
    }

    #[test]
    fn constant_signal_has_constant_rms() {
        let block = vec![0.25f32; 2 * 310];
        for amp in extract_amplitudes(&block, 2, 31) {
            assert!((amp - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn stereo_is_mixed_before_rms() {
        // Left and right cancel out.
        let block: Vec<f32> = (0..200).flat_map(|_| [0.8f32, -0.8]).collect();
        assert!(extract_amplitudes(&block, 2, 10).iter().all(|a| *a == 0.0));
    }

    #[test]
    fn short_block_reads_missing_buckets_as_zero() {
        // 4 frames across 8 columns: bucket of 1 frame, columns 4..8 are empty.
        let block = vec![1.0f32; 2 * 4];
        let amps = extract_amplitudes(&block, 2, 8);
        assert_eq!(&amps[..4], &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(&amps[4..], &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn publish_drops_when_consumer_is_behind() {
        let (mut extractor, rx) = AmplitudeExtractor::new(4);
        let block = vec![0.1f32; 64];
        assert_eq!(extractor.publish(&block, 2), Offer::Delivered);
        assert_eq!(extractor.publish(&block, 2), Offer::Dropped);
        assert_eq!(rx.dropped(), 1);
        assert_eq!(rx.try_recv().map(|v| v.len()), Some(4));
        assert_eq!(extractor.publish(&block, 2), Offer::Delivered);
    }
}

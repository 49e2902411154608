//! Internet radio playback and the audio side of the visualizer.
//!
//! A playback job fetches and decodes the station's MP3 stream on its own
//! thread, resamples it to the output device rate, applies a short fade-in and
//! feeds the CPAL output queue. The output callback hands each block it plays
//! to the [`AmplitudeExtractor`], which publishes per-column loudness for the
//! [`VisualizerEnvelope`].

mod amplitude;
mod envelope;
mod output;
mod resample;
mod stream;

pub use amplitude::{extract_amplitudes, AmplitudeExtractor};
pub use envelope::VisualizerEnvelope;
pub use output::AudioOutput;
pub use stream::{open_with_retries, StreamDecoder, StreamError};

use crate::config::StreamConfig;
use crate::diagnostics::DiagnosticLog;
use crate::lock::lock_or_recover;
use crate::mailbox::MailboxReceiver;
use crossbeam_channel::Sender;
use output::{stereo_to_device, SharedQueue};
use resample::StereoResampler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use stream::FadeIn;

/// Queue depth the decoder keeps ahead of the output callback.
const QUEUE_AHEAD: Duration = Duration::from_millis(500);
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(10);

/// Identifies one `play` call. Replaying the same station gets a new id.
pub type PlaybackId = u64;

/// Progress of a playback job, tagged with the job it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Started { job: PlaybackId },
    Failed { job: PlaybackId, error: String },
    Ended { job: PlaybackId },
}

impl AudioEvent {
    pub fn job(&self) -> PlaybackId {
        match self {
            AudioEvent::Started { job }
            | AudioEvent::Failed { job, .. }
            | AudioEvent::Ended { job } => *job,
        }
    }
}

/// What the controller needs from the audio side.
pub trait Playback {
    /// Stop whatever plays and start `url`. Progress arrives as [`AudioEvent`]s
    /// tagged with the returned id; events with any other id are stale.
    fn play(&mut self, station: usize, url: &str) -> PlaybackId;
    fn stop(&mut self);
}

struct PlaybackJob {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackJob {
    fn cancel(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        // The worker may sit in a blocking HTTP read; it exits on its own once
        // the read returns and it sees the flag.
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}

/// Owns the output device and at most one playback job.
pub struct AudioEngine {
    config: StreamConfig,
    diag: DiagnosticLog,
    events: Sender<AudioEvent>,
    output: Option<AudioOutput>,
    extractor: Option<AmplitudeExtractor>,
    job: Option<PlaybackJob>,
    last_job: PlaybackId,
}

impl AudioEngine {
    /// Engine plus the amplitude receiver the visualizer drains each tick.
    /// The output device is opened lazily on first play.
    pub fn new(
        config: StreamConfig,
        width: usize,
        diag: DiagnosticLog,
        events: Sender<AudioEvent>,
    ) -> (Self, MailboxReceiver<Vec<f32>>) {
        let (extractor, amplitudes) = AmplitudeExtractor::new(width);
        (
            Self {
                config,
                diag,
                events,
                output: None,
                extractor: Some(extractor),
                job: None,
                last_job: 0,
            },
            amplitudes,
        )
    }

    fn ensure_output(&mut self) -> Result<&AudioOutput, String> {
        if self.output.is_none() {
            let Some(extractor) = self.extractor.take() else {
                return Err("audio output unavailable".to_string());
            };
            match AudioOutput::open(self.config.output_device.as_deref(), extractor) {
                Ok(output) => {
                    self.diag.push(format!(
                        "audio output opened at {} Hz, {} channels",
                        output.sample_rate(),
                        output.channels()
                    ));
                    self.output = Some(output);
                }
                Err(err) => return Err(format!("audio output: {err:#}")),
            }
        }
        self.output
            .as_ref()
            .ok_or_else(|| "audio output unavailable".to_string())
    }
}

impl Playback for AudioEngine {
    fn play(&mut self, station: usize, url: &str) -> PlaybackId {
        self.stop();
        self.last_job += 1;
        let job = self.last_job;
        let (queue, sample_rate, channels) = match self.ensure_output() {
            Ok(output) => (output.queue(), output.sample_rate(), output.channels()),
            Err(error) => {
                self.diag.push(format!("audio error: {error}"));
                let _ = self.events.send(AudioEvent::Failed { job, error });
                return job;
            }
        };

        let stop_flag = Arc::new(AtomicBool::new(false));
        self.diag.push(format!("audio job {job}: station {station}"));
        let worker = PlaybackWorker {
            job,
            url: url.to_string(),
            config: self.config.clone(),
            queue,
            device_rate: sample_rate,
            device_channels: channels,
            stop_flag: Arc::clone(&stop_flag),
            diag: self.diag.clone(),
            events: self.events.clone(),
        };
        let handle = thread::spawn(move || worker.run());
        self.job = Some(PlaybackJob {
            stop_flag,
            handle: Some(handle),
        });
        job
    }

    fn stop(&mut self) {
        if let Some(mut job) = self.job.take() {
            job.cancel();
        }
        if let Some(output) = &self.output {
            output.clear();
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

struct PlaybackWorker {
    job: PlaybackId,
    url: String,
    config: StreamConfig,
    queue: SharedQueue,
    device_rate: u32,
    device_channels: usize,
    stop_flag: Arc<AtomicBool>,
    diag: DiagnosticLog,
    events: Sender<AudioEvent>,
}

impl PlaybackWorker {
    fn stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    /// Report progress unless the job was superseded. A stop racing this check
    /// is caught by the consumer's job-id filter.
    fn emit(&self, event: AudioEvent) {
        if !self.stopped() {
            let _ = self.events.send(event);
        }
    }

    fn run(self) {
        let job = self.job;
        let mut decoder = match open_with_retries(
            &self.url,
            self.config.retries,
            Duration::from_millis(self.config.retry_delay_ms),
            &self.stop_flag,
            &self.diag,
        ) {
            Ok(decoder) => decoder,
            Err(StreamError::Cancelled) => return,
            Err(err) => {
                self.diag.push(format!("audio error: {err}"));
                self.emit(AudioEvent::Failed {
                    job,
                    error: err.to_string(),
                });
                return;
            }
        };

        let stream_rate = decoder.sample_rate();
        self.diag.push(format!(
            "stream {} decoding at {stream_rate} Hz",
            self.url
        ));
        self.emit(AudioEvent::Started { job });

        let mut resampler = StereoResampler::new(stream_rate, self.device_rate);
        let mut fade = FadeIn::new(
            self.device_rate,
            Duration::from_millis(self.config.fade_in_ms),
        );
        let max_queued = (self.device_rate as f64
            * QUEUE_AHEAD.as_secs_f64()
            * self.device_channels as f64) as usize;

        while !self.stopped() {
            let block = match decoder.next_block() {
                Ok(Some(block)) => block,
                Ok(None) => {
                    self.diag.push(format!("stream {} ended", self.url));
                    self.emit(AudioEvent::Ended { job });
                    return;
                }
                Err(err) => {
                    self.diag.push(format!("audio error: {err}"));
                    self.emit(AudioEvent::Failed {
                        job,
                        error: err.to_string(),
                    });
                    return;
                }
            };
            let mut stereo = resampler.process(&block);
            fade.apply(&mut stereo);
            let samples = stereo_to_device(&stereo, self.device_channels);
            self.enqueue(samples, max_queued);
        }
    }

    /// Append to the output queue once there is room. The stop flag is read
    /// under the queue lock: `AudioEngine::stop` sets it before clearing the
    /// queue, so a superseded job can never append after that clear.
    fn enqueue(&self, samples: Vec<f32>, max_queued: usize) {
        loop {
            {
                let mut queue = lock_or_recover(&self.queue, "playback_enqueue");
                if self.stopped() {
                    return;
                }
                if queue.len() < max_queued {
                    queue.extend(samples);
                    return;
                }
            }
            thread::sleep(QUEUE_FULL_BACKOFF);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn worker(queue: SharedQueue, stop_flag: Arc<AtomicBool>, events: Sender<AudioEvent>) -> PlaybackWorker {
        PlaybackWorker {
            job: 7,
            url: "http://127.0.0.1:9/none.mp3".to_string(),
            config: StreamConfig {
                retries: 0,
                retry_delay_ms: 0,
                fade_in_ms: 0,
                output_device: None,
            },
            queue,
            device_rate: 48_000,
            device_channels: 2,
            stop_flag,
            diag: DiagnosticLog::new(16),
            events,
        }
    }

    #[test]
    fn stopped_worker_never_appends_to_the_queue() {
        let queue: SharedQueue = Arc::new(Mutex::new(VecDeque::new()));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (tx, _rx) = unbounded();
        let w = worker(Arc::clone(&queue), Arc::clone(&stop_flag), tx);
        w.enqueue(vec![0.5; 4], 64);
        assert_eq!(lock_or_recover(&queue, "test").len(), 4);

        stop_flag.store(true, Ordering::SeqCst);
        lock_or_recover(&queue, "test").clear();
        w.enqueue(vec![0.5; 4], 64);
        assert!(lock_or_recover(&queue, "test").is_empty());
    }

    #[test]
    fn stop_while_waiting_for_room_discards_the_block() {
        let queue: SharedQueue = Arc::new(Mutex::new(VecDeque::from(vec![0.0; 8])));
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (tx, _rx) = unbounded();
        let w = worker(Arc::clone(&queue), Arc::clone(&stop_flag), tx);
        let waiting = thread::spawn(move || w.enqueue(vec![0.9; 4], 8));
        thread::sleep(Duration::from_millis(30));
        // Same order as AudioEngine::stop: flag first, then clear.
        stop_flag.store(true, Ordering::SeqCst);
        lock_or_recover(&queue, "test").clear();
        waiting.join().expect("enqueue returns");
        assert!(lock_or_recover(&queue, "test").is_empty());
    }

    #[test]
    fn superseded_worker_reports_nothing() {
        let queue: SharedQueue = Arc::new(Mutex::new(VecDeque::new()));
        let (tx, rx) = unbounded();
        let w = worker(queue, Arc::new(AtomicBool::new(true)), tx);
        w.emit(AudioEvent::Failed {
            job: 7,
            error: "late".to_string(),
        });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn events_expose_their_job() {
        assert_eq!(AudioEvent::Started { job: 3 }.job(), 3);
        assert_eq!(
            AudioEvent::Failed {
                job: 4,
                error: String::new()
            }
            .job(),
            4
        );
        assert_eq!(AudioEvent::Ended { job: 5 }.job(), 5);
    }
}

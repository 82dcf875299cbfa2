//! The monitoring loop
//!
//! Each iteration opens a scoped capture handle, calibrates against
//! ambient noise, records one phrase bounded by the onset timeout, sends
//! it to the transcription service, and scans the transcript for distress
//! keywords. The loop has no shutdown path of its own; it runs until the
//! process is interrupted or a fatal (device/encoding) error propagates.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::alert::AlertSink;
use crate::audio::{AudioCapture, Calibration, PhraseDetector};
use crate::config::Config;
use crate::error::Result;
use crate::keywords::KeywordSet;
use crate::transcribe::{TranscribeClient, TranscribeOutcome};

/// How long to block on the capture channel per poll
const RECEIVE_POLL: Duration = Duration::from_millis(100);

/// Consecutive empty polls mid-phrase before the phrase is flushed
const MAX_STALLED_POLLS: u32 = 10;

/// Distress-keyword voice monitor
pub struct Monitor<S: AlertSink> {
    config: Config,
    keywords: KeywordSet,
    client: TranscribeClient,
    sink: S,
}

impl<S: AlertSink> Monitor<S> {
    pub fn new(config: Config, keywords: KeywordSet, client: TranscribeClient, sink: S) -> Self {
        Self {
            config,
            keywords,
            client,
            sink,
        }
    }

    /// Run the monitor loop indefinitely.
    ///
    /// Only fatal errors return; the three recoverable outcomes
    /// (no speech, unintelligible audio, service failure) are logged and
    /// the loop continues without backoff.
    pub fn run(&mut self) -> Result<()> {
        println!("Voice monitoring activated. Listening for distress keywords...");
        let languages: Vec<String> = self
            .keywords
            .languages()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("Supported languages: {}", languages.join(", "));

        info!(
            "Monitoring {} keywords via {}",
            self.keywords.len(),
            self.client.endpoint()
        );

        loop {
            self.run_iteration()?;
        }
    }

    /// One pass: capture, transcribe, scan
    fn run_iteration(&mut self) -> Result<()> {
        // Device is opened and released within this scope on every exit path
        let mut capture = AudioCapture::open(self.config.audio.clone())?;
        capture.start()?;
        let sample_rate = capture.actual_sample_rate();

        let threshold = calibrate(&capture, &self.config);
        let phrase = capture_phrase(&capture, &self.config, sample_rate, threshold);
        capture.stop();

        let outcome = match phrase {
            Some(samples) => self.client.transcribe(&samples, sample_rate)?,
            None => TranscribeOutcome::NoSpeechDetected,
        };

        self.handle_outcome(outcome);
        Ok(())
    }

    /// Apply one iteration's outcome: echo, scan, alert.
    ///
    /// At most one alert fires per outcome; the first keyword in list
    /// order wins and scanning stops there.
    pub fn handle_outcome(&mut self, outcome: TranscribeOutcome) {
        match outcome {
            TranscribeOutcome::Transcribed(text) => {
                let text = text.to_lowercase();
                println!("Heard: {}", text);

                if let Some(keyword) = self.keywords.first_match(&text) {
                    println!("Distress keyword detected: {}", keyword.text());
                    self.sink.trigger(keyword);
                }
            }
            TranscribeOutcome::NoSpeechDetected => {
                println!("No speech detected.");
            }
            TranscribeOutcome::Unintelligible => {
                println!("Couldn't understand audio.");
            }
            TranscribeOutcome::ServiceError(detail) => {
                println!("API error: {}", detail);
            }
        }
    }
}

/// Sample ambient noise and derive the speech energy threshold
fn calibrate(capture: &AudioCapture, config: &Config) -> f32 {
    capture.drain();

    let mut calibration = Calibration::new();
    let deadline = Instant::now() + Duration::from_secs_f32(config.listen.calibration_secs);

    while Instant::now() < deadline {
        if let Some(frame) = capture.receive_timeout(RECEIVE_POLL) {
            calibration.add_frame(&frame);
        }
    }

    debug!("Calibrated over {} frames", calibration.frames());
    calibration.threshold(&config.listen)
}

/// Capture one phrase, or None if no speech onset arrives in time
fn capture_phrase(
    capture: &AudioCapture,
    config: &Config,
    sample_rate: u32,
    threshold: f32,
) -> Option<Vec<f32>> {
    let mut detector = PhraseDetector::new(&config.listen, sample_rate, threshold);
    let onset_deadline = Instant::now() + Duration::from_secs_f32(config.listen.onset_timeout_secs);
    let mut stalled_polls = 0;

    loop {
        if !detector.in_phrase() && Instant::now() > onset_deadline {
            return None;
        }

        let frame = match capture.receive_timeout(RECEIVE_POLL) {
            Some(frame) => {
                stalled_polls = 0;
                frame
            }
            None => {
                // A silent channel mid-phrase means the stream stopped
                // delivering; take what we have rather than spin forever.
                if detector.in_phrase() {
                    stalled_polls += 1;
                    if stalled_polls >= MAX_STALLED_POLLS {
                        return detector.flush();
                    }
                }
                continue;
            }
        };

        if let Some(phrase) = detector.feed(&frame) {
            return Some(phrase);
        }
    }
}

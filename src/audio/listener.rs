//! Ambient-noise calibration and phrase endpointing
//!
//! Both pieces are pure over f32 frames so they can be tested without a
//! capture device; the monitor loop feeds them chunks pulled off the
//! capture channel.

use tracing::{debug, trace};

use crate::config::ListenConfig;

/// RMS energy of a frame of samples
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Accumulates ambient frame energies and derives the speech threshold.
///
/// The threshold is the mean ambient energy scaled by the configured
/// ratio, clamped below by `min_energy` so a dead-quiet room does not
/// produce a threshold that any breath would cross.
pub struct Calibration {
    energies: Vec<f32>,
}

impl Calibration {
    pub fn new() -> Self {
        Self {
            energies: Vec::new(),
        }
    }

    /// Record one frame of ambient audio
    pub fn add_frame(&mut self, samples: &[f32]) {
        if !samples.is_empty() {
            self.energies.push(rms_energy(samples));
        }
    }

    /// Number of frames observed so far
    pub fn frames(&self) -> usize {
        self.energies.len()
    }

    /// Derive the speech energy threshold
    pub fn threshold(&self, config: &ListenConfig) -> f32 {
        if self.energies.is_empty() {
            return config.min_energy;
        }

        let ambient = self.energies.iter().sum::<f32>() / self.energies.len() as f32;
        let threshold = (ambient * config.energy_ratio).max(config.min_energy);
        debug!(
            "Ambient calibration: {} frames, mean energy {:.5}, threshold {:.5}",
            self.energies.len(),
            ambient,
            threshold
        );
        threshold
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

/// Endpointing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhraseState {
    /// Waiting for frame energy to cross the threshold
    WaitingForOnset,
    /// Accumulating a phrase
    InPhrase,
}

/// Phrase endpointing state machine.
///
/// Feed it capture frames; it buffers a short pre-roll while waiting for
/// speech onset, then accumulates samples until a trailing-silence run or
/// the hard duration cap ends the phrase. Bursts shorter than the minimum
/// speech duration are discarded and the detector goes back to waiting,
/// so a door slam does not become a transcription request.
pub struct PhraseDetector {
    threshold: f32,
    state: PhraseState,
    phrase: Vec<f32>,
    /// Samples of sub-threshold audio seen since the last loud frame
    silence_run: usize,
    pre_roll: Vec<f32>,
    pre_roll_samples: usize,
    min_speech_samples: usize,
    trailing_silence_samples: usize,
    max_phrase_samples: usize,
}

impl PhraseDetector {
    pub fn new(config: &ListenConfig, sample_rate: u32, threshold: f32) -> Self {
        let rate = sample_rate as f32;
        Self {
            threshold,
            state: PhraseState::WaitingForOnset,
            phrase: Vec::new(),
            silence_run: 0,
            pre_roll: Vec::new(),
            pre_roll_samples: (0.2 * rate) as usize, // 200ms pre-roll
            min_speech_samples: (config.min_speech_secs * rate) as usize,
            trailing_silence_samples: (config.trailing_silence_secs * rate) as usize,
            max_phrase_samples: (config.max_phrase_secs * rate) as usize,
        }
    }

    /// The energy threshold this detector listens with
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// True once speech onset has been detected
    pub fn in_phrase(&self) -> bool {
        self.state == PhraseState::InPhrase
    }

    /// Feed one frame of audio. Returns the completed phrase when the
    /// trailing-silence run or the duration cap ends it.
    pub fn feed(&mut self, frame: &[f32]) -> Option<Vec<f32>> {
        let loud = rms_energy(frame) > self.threshold;

        match self.state {
            PhraseState::WaitingForOnset => {
                if loud {
                    trace!("Speech onset (threshold {:.5})", self.threshold);
                    self.state = PhraseState::InPhrase;
                    self.phrase = std::mem::take(&mut self.pre_roll);
                    self.phrase.extend(frame);
                    self.silence_run = 0;
                } else {
                    self.buffer_pre_roll(frame);
                }
                None
            }
            PhraseState::InPhrase => {
                self.phrase.extend(frame);

                if loud {
                    self.silence_run = 0;
                } else {
                    self.silence_run += frame.len();
                }

                if self.phrase.len() >= self.max_phrase_samples {
                    trace!("Phrase completion forced (duration cap)");
                    return Some(self.take_phrase());
                }

                if self.silence_run >= self.trailing_silence_samples {
                    let spoken = self.phrase.len() - self.silence_run;
                    if spoken < self.min_speech_samples {
                        trace!("Discarding short burst ({} samples)", spoken);
                        self.reset_to_waiting();
                        return None;
                    }
                    return Some(self.take_phrase());
                }

                None
            }
        }
    }

    /// Return the accumulated phrase if the stream ends mid-phrase
    pub fn flush(&mut self) -> Option<Vec<f32>> {
        if self.state == PhraseState::InPhrase && self.phrase.len() >= self.min_speech_samples {
            return Some(self.take_phrase());
        }
        self.reset_to_waiting();
        None
    }

    fn take_phrase(&mut self) -> Vec<f32> {
        let phrase = std::mem::take(&mut self.phrase);
        self.reset_to_waiting();
        phrase
    }

    fn reset_to_waiting(&mut self) {
        self.state = PhraseState::WaitingForOnset;
        self.phrase.clear();
        self.silence_run = 0;
        self.pre_roll.clear();
    }

    fn buffer_pre_roll(&mut self, frame: &[f32]) {
        self.pre_roll.extend(frame);
        if self.pre_roll.len() > self.pre_roll_samples {
            let excess = self.pre_roll.len() - self.pre_roll_samples;
            self.pre_roll.drain(0..excess);
        }
    }
}

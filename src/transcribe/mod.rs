//! Cloud transcription service integration

pub mod client;

pub use client::TranscribeClient;

/// Outcome of one monitor iteration's attempt to obtain a transcript.
///
/// The three failure variants are the recoverable kinds: the loop logs
/// them and moves on. Everything else (device failures, WAV encoding)
/// is an `Err` and terminates the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscribeOutcome {
    /// The service returned recognized text
    Transcribed(String),
    /// No speech onset within the capture timeout; the service was never called
    NoSpeechDetected,
    /// The service could not extract intelligible speech from the audio
    Unintelligible,
    /// Request-level failure: network, auth, quota, malformed response
    ServiceError(String),
}

//! Custom error types for the voice monitor

use thiserror::Error;

/// Main error type for the voice monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Transcription error: {0}")]
    Transcribe(#[from] TranscribeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Audio-related errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to get device configuration: {0}")]
    DeviceConfig(String),

    #[error("Failed to build audio stream: {0}")]
    StreamBuild(String),

    #[error("Stream playback error: {0}")]
    StreamPlay(String),
}

/// Transcription errors that are fatal to the process.
///
/// Recoverable service failures (network, HTTP status, unparseable
/// response body) are not errors; they surface as
/// [`TranscribeOutcome::ServiceError`](crate::transcribe::TranscribeOutcome)
/// variants and the monitor loop continues.
#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("Failed to encode audio as WAV: {0}")]
    Encode(String),

    #[error("Invalid audio data for transcription")]
    InvalidAudioData,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, MonitorError>;

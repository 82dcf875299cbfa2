//! Configuration structures for the voice monitor

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub listen: ListenConfig,
    pub transcription: TranscriptionConfig,
    pub keywords: KeywordsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject values the monitor cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.onset_timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "listen.onset_timeout_secs".to_string(),
                value: self.listen.onset_timeout_secs.to_string(),
            });
        }
        if self.listen.energy_ratio <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "listen.energy_ratio".to_string(),
                value: self.listen.energy_ratio.to_string(),
            });
        }
        if self.listen.max_phrase_secs <= self.listen.min_speech_secs {
            return Err(ConfigError::InvalidValue {
                field: "listen.max_phrase_secs".to_string(),
                value: self.listen.max_phrase_secs.to_string(),
            });
        }
        if self.transcription.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "transcription.endpoint".to_string(),
                value: String::new(),
            });
        }
        Ok(())
    }
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Target sample rate (Hz)
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Buffer size in samples
    pub buffer_size: u32,
    /// Audio device name (None = default device)
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            buffer_size: 512,
            device: None,
        }
    }
}

/// Ambient calibration and phrase endpointing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Ambient noise sampling duration before each capture (seconds)
    pub calibration_secs: f32,
    /// Speech threshold as a multiple of the ambient energy level
    pub energy_ratio: f32,
    /// Floor for the speech threshold, for very quiet rooms
    pub min_energy: f32,
    /// Maximum wait for speech onset before giving up on the iteration (seconds)
    pub onset_timeout_secs: f32,
    /// Bursts shorter than this are discarded as non-speech (seconds)
    pub min_speech_secs: f32,
    /// Silence run that ends a phrase (seconds)
    pub trailing_silence_secs: f32,
    /// Hard cap on phrase duration (seconds)
    pub max_phrase_secs: f32,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            calibration_secs: 1.0,
            energy_ratio: 1.5,
            min_energy: 0.01,
            onset_timeout_secs: 5.0,
            min_speech_secs: 0.3,
            trailing_silence_secs: 0.8,
            max_phrase_secs: 10.0,
        }
    }
}

/// Cloud transcription service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// OpenAI-compatible transcriptions endpoint
    pub endpoint: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Optional language hint (e.g. "en", "sw"); None lets the service detect
    pub language: Option<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            model: "whisper-1".to_string(),
            language: None,
        }
    }
}

/// Keyword store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    /// Which keyword set to monitor
    pub set: KeywordSetChoice,
}

/// Selectable keyword sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordSetChoice {
    /// English and Kiswahili lists, English first
    #[default]
    Bilingual,
    /// English list only
    English,
}

impl std::fmt::Display for KeywordSetChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeywordSetChoice::Bilingual => write!(f, "bilingual"),
            KeywordSetChoice::English => write!(f, "english"),
        }
    }
}

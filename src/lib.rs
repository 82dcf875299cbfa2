//! Distress-Keyword Voice Monitor
//!
//! A Rust-based monitor that records microphone audio, transcribes it via
//! a cloud speech-recognition service, and scans transcripts for distress
//! keywords in English and Kiswahili, alerting on the first match.
//!
//! # Architecture
//!
//! The system is organized into the following modules:
//!
//! - `audio`: Scoped capture, ambient calibration, phrase endpointing
//! - `transcribe`: Cloud transcription client and outcome type
//! - `keywords`: Static distress keyword store
//! - `monitor`: The blocking capture-transcribe-scan loop
//! - `alert`: Alert sink seam and default console sink
//! - `config`: Configuration structures
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use sauti_guard::{
//!     Config, ConsoleAlertSink, KeywordSet, Monitor, TranscribeClient,
//! };
//!
//! let config = Config::default();
//! let keywords = KeywordSet::bilingual();
//! let client = TranscribeClient::new(config.transcription.clone(), None);
//!
//! let mut monitor = Monitor::new(config, keywords, client, ConsoleAlertSink);
//! monitor.run().unwrap();
//! ```

pub mod alert;
pub mod audio;
pub mod config;
pub mod error;
pub mod keywords;
pub mod monitor;
pub mod transcribe;

// Re-exports for convenience
pub use alert::{AlertSink, ConsoleAlertSink};
pub use audio::{AudioCapture, Calibration, PhraseDetector};
pub use config::{
    AudioConfig, Config, KeywordSetChoice, KeywordsConfig, ListenConfig, TranscriptionConfig,
};
pub use error::{AudioError, ConfigError, MonitorError, Result, TranscribeError};
pub use keywords::{Keyword, KeywordSet, Language};
pub use monitor::Monitor;
pub use transcribe::{TranscribeClient, TranscribeOutcome};

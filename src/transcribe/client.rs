//! Blocking HTTP client for the transcription service
//!
//! Captured phrases are WAV-encoded and POSTed as a multipart form to an
//! OpenAI-compatible `audio/transcriptions` endpoint. The client carries
//! no request timeout: the capture stage is the only per-iteration bound,
//! and a hanging service stalls the loop.

use std::io::Cursor;
use std::time::Instant;

use reqwest::blocking::{multipart, Client};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TranscriptionConfig;
use crate::error::{Result, TranscribeError};

use super::TranscribeOutcome;

/// Client for an OpenAI-compatible transcription endpoint
pub struct TranscribeClient {
    http: Client,
    config: TranscriptionConfig,
    api_key: Option<String>,
}

impl TranscribeClient {
    /// Create a client. `api_key` is sent as a bearer token when present;
    /// local OpenAI-compatible servers typically need none.
    pub fn new(config: TranscriptionConfig, api_key: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(None)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            config,
            api_key,
        }
    }

    /// The endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Submit one captured phrase for transcription.
    ///
    /// Samples must be mono f32 at `sample_rate`. Service-level failures
    /// come back as [`TranscribeOutcome::ServiceError`]; only local
    /// encoding problems are `Err`.
    pub fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<TranscribeOutcome> {
        if samples.is_empty() {
            return Err(TranscribeError::InvalidAudioData.into());
        }

        let wav = encode_wav(samples, sample_rate)?;
        debug!(
            "Submitting {} samples ({:.2}s) as {} WAV bytes",
            samples.len(),
            samples.len() as f32 / sample_rate as f32,
            wav.len()
        );

        let part = match multipart::Part::bytes(wav)
            .file_name("phrase.wav")
            .mime_str("audio/wav")
        {
            Ok(part) => part,
            Err(e) => return Ok(TranscribeOutcome::ServiceError(e.to_string())),
        };

        let mut form = multipart::Form::new()
            .text("model", self.config.model.clone())
            .part("file", part);
        if let Some(ref language) = self.config.language {
            form = form.text("language", language.clone());
        }

        let mut request = self.http.post(&self.config.endpoint).multipart(form);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let started = Instant::now();
        let response = match request.send() {
            Ok(response) => response,
            Err(e) => return Ok(TranscribeOutcome::ServiceError(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = service_error_detail(status, &body);
            warn!("Transcription request failed: {}", detail);
            return Ok(TranscribeOutcome::ServiceError(detail));
        }

        let payload: Value = match response.json() {
            Ok(payload) => payload,
            Err(e) => return Ok(TranscribeOutcome::ServiceError(e.to_string())),
        };

        let text = payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();

        debug!(
            "Transcription response in {:.2}s: {} chars",
            started.elapsed().as_secs_f32(),
            text.len()
        );

        if text.is_empty() {
            Ok(TranscribeOutcome::Unintelligible)
        } else {
            Ok(TranscribeOutcome::Transcribed(text.to_string()))
        }
    }
}

/// Encode mono f32 samples as a 16-bit PCM WAV file in memory
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)
            .map_err(|e| TranscribeError::Encode(e.to_string()))?;
        for &sample in samples {
            let clipped = sample.clamp(-1.0, 1.0);
            let amplitude = (clipped * i16::MAX as f32) as i16;
            writer
                .write_sample(amplitude)
                .map_err(|e| TranscribeError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| TranscribeError::Encode(e.to_string()))?;
    }

    Ok(buffer.into_inner())
}

fn service_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    // Service error payloads often carry {"error": {"message": ...}}
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        status.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranscriptionConfig;

    #[test]
    fn test_encode_wav_header_and_length() {
        let samples = vec![0.0, 0.5, -0.5, 1.0, -1.0];
        let wav = encode_wav(&samples, 16000).unwrap();

        // RIFF header plus one 16-bit sample per input sample
        assert!(wav.len() >= 44 + samples.len() * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
    }

    #[test]
    fn test_empty_samples_rejected() {
        let client = TranscribeClient::new(TranscriptionConfig::default(), None);
        assert!(client.transcribe(&[], 16000).is_err());
    }

    #[test]
    fn test_service_error_detail_extracts_message() {
        let body = r#"{"error": {"message": "quota exceeded", "type": "insufficient_quota"}}"#;
        let detail = service_error_detail(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(detail, "quota exceeded");
    }

    #[test]
    fn test_service_error_detail_falls_back_to_body() {
        let detail =
            service_error_detail(reqwest::StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert_eq!(detail, "upstream unavailable");

        let detail = service_error_detail(reqwest::StatusCode::BAD_GATEWAY, "");
        assert_eq!(detail, "502 Bad Gateway");
    }
}

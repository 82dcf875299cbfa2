//! Integration tests for sauti-guard

use std::cell::RefCell;
use std::rc::Rc;

use sauti_guard::{
    AlertSink, Calibration, Config, Keyword, KeywordSet, ListenConfig, Monitor, PhraseDetector,
    TranscribeClient, TranscribeOutcome,
};

/// Generate synthetic audio that simulates speech
fn generate_speech(sample_rate: u32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            // Mix of frequencies to simulate speech formants
            let f1 = 300.0;
            let f2 = 1000.0;
            let f3 = 2500.0;

            amplitude
                * (0.5 * (2.0 * std::f32::consts::PI * f1 * t).sin()
                    + 0.3 * (2.0 * std::f32::consts::PI * f2 * t).sin()
                    + 0.2 * (2.0 * std::f32::consts::PI * f3 * t).sin())
        })
        .collect()
}

/// Generate silence with minimal noise
fn generate_silence(sample_rate: u32, duration_secs: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    vec![0.0001; num_samples]
}

/// Sink that records every triggered keyword
struct RecordingSink {
    triggered: Rc<RefCell<Vec<String>>>,
}

impl AlertSink for RecordingSink {
    fn trigger(&mut self, keyword: &Keyword) {
        self.triggered.borrow_mut().push(keyword.text().to_string());
    }
}

fn make_monitor(triggered: Rc<RefCell<Vec<String>>>) -> Monitor<RecordingSink> {
    let config = Config::default();
    let client = TranscribeClient::new(config.transcription.clone(), None);
    Monitor::new(
        config,
        KeywordSet::bilingual(),
        client,
        RecordingSink { triggered },
    )
}

#[test]
fn test_config_loading() {
    let config = Config::default();

    assert_eq!(config.audio.sample_rate, 16000);
    assert_eq!(config.listen.onset_timeout_secs, 5.0);
    assert_eq!(config.listen.trailing_silence_secs, 0.8);
    assert_eq!(config.transcription.model, "whisper-1");
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
        [audio]
        sample_rate = 48000

        [listen]
        onset_timeout_secs = 8.0
        energy_ratio = 2.0

        [transcription]
        endpoint = "http://localhost:8080/v1/audio/transcriptions"

        [keywords]
        set = "english"
    "#;

    let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.audio.sample_rate, 48000);
    assert_eq!(config.listen.onset_timeout_secs, 8.0);
    assert_eq!(config.listen.energy_ratio, 2.0);
    assert_eq!(
        config.transcription.endpoint,
        "http://localhost:8080/v1/audio/transcriptions"
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_match_iff_keyword_present() {
    let set = KeywordSet::bilingual();

    // Every keyword, embedded in a sentence, must match itself
    for keyword in set.iter() {
        let transcript = format!("something {} something", keyword.text());
        let matched = set.first_match(&transcript);
        assert!(
            matched.is_some(),
            "keyword '{}' should match",
            keyword.text()
        );
    }

    // No keyword, no match
    assert!(set.first_match("bright sunny day at the beach").is_none());
}

#[test]
fn test_first_match_wins_with_multiple_keywords() {
    let set = KeywordSet::bilingual();

    // "stop" precedes "pain" in the English list; both are present
    let matched = set.first_match("the pain won't stop");
    assert_eq!(matched.map(|k| k.text()), Some("stop"));

    // An English keyword beats an earlier-positioned Kiswahili word in
    // the transcript because scan order is list order, not text order
    let matched = set.first_match("wezi walikuja help");
    assert_eq!(matched.map(|k| k.text()), Some("help"));
}

#[test]
fn test_end_to_end_alert_for_bilingual_transcript() {
    let triggered = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = make_monitor(triggered.clone());

    monitor.handle_outcome(TranscribeOutcome::Transcribed(
        "please help me there are wezi outside".to_string(),
    ));

    // Exactly one alert, for the first match by list order
    assert_eq!(*triggered.borrow(), vec!["help".to_string()]);
}

#[test]
fn test_end_to_end_no_alert_without_keyword() {
    let triggered = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = make_monitor(triggered.clone());

    monitor.handle_outcome(TranscribeOutcome::Transcribed(
        "hakuna shida leo".to_string(),
    ));

    assert!(triggered.borrow().is_empty());
}

#[test]
fn test_uppercase_transcript_still_matches() {
    let triggered = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = make_monitor(triggered.clone());

    monitor.handle_outcome(TranscribeOutcome::Transcribed(
        "HELP ME PLEASE".to_string(),
    ));

    assert_eq!(*triggered.borrow(), vec!["help".to_string()]);
}

#[test]
fn test_at_most_one_alert_per_iteration() {
    let triggered = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = make_monitor(triggered.clone());

    monitor.handle_outcome(TranscribeOutcome::Transcribed(
        "help stop emergency saidia polisi".to_string(),
    ));

    assert_eq!(triggered.borrow().len(), 1);
}

#[test]
fn test_repeated_transcripts_alert_each_time() {
    // The loop keeps no cross-iteration state: no de-duplication
    let triggered = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = make_monitor(triggered.clone());

    monitor.handle_outcome(TranscribeOutcome::Transcribed("help".to_string()));
    monitor.handle_outcome(TranscribeOutcome::Transcribed("help".to_string()));

    assert_eq!(triggered.borrow().len(), 2);
}

#[test]
fn test_recoverable_outcomes_continue_without_alert() {
    let triggered = Rc::new(RefCell::new(Vec::new()));
    let mut monitor = make_monitor(triggered.clone());

    monitor.handle_outcome(TranscribeOutcome::NoSpeechDetected);
    monitor.handle_outcome(TranscribeOutcome::Unintelligible);
    monitor.handle_outcome(TranscribeOutcome::ServiceError(
        "quota exceeded".to_string(),
    ));

    assert!(triggered.borrow().is_empty());

    // The monitor still works on the next outcome
    monitor.handle_outcome(TranscribeOutcome::Transcribed("saidia".to_string()));
    assert_eq!(*triggered.borrow(), vec!["saidia".to_string()]);
}

#[test]
fn test_phrase_detection_over_synthetic_audio() {
    let sample_rate = 16000;
    let config = ListenConfig {
        min_speech_secs: 0.1,
        trailing_silence_secs: 0.3,
        ..Default::default()
    };

    // Calibrate against a quiet lead-in
    let ambient = generate_silence(sample_rate, 0.5);
    let mut calibration = Calibration::new();
    for frame in ambient.chunks(320) {
        calibration.add_frame(frame);
    }
    let threshold = calibration.threshold(&config);

    let mut detector = PhraseDetector::new(&config, sample_rate, threshold);

    // Silence, speech, silence: exactly one phrase comes out
    let mut audio = Vec::new();
    audio.extend(generate_silence(sample_rate, 0.3));
    audio.extend(generate_speech(sample_rate, 0.8, 0.3));
    audio.extend(generate_silence(sample_rate, 0.6));

    let mut phrases = Vec::new();
    for frame in audio.chunks(320) {
        if let Some(phrase) = detector.feed(frame) {
            phrases.push(phrase);
        }
    }

    assert_eq!(phrases.len(), 1, "expected exactly one phrase");
    // The phrase covers at least the spoken portion
    assert!(phrases[0].len() >= (0.8 * sample_rate as f32) as usize);
}

#[test]
fn test_silence_only_produces_no_phrase() {
    let sample_rate = 16000;
    let config = ListenConfig::default();

    let mut detector = PhraseDetector::new(&config, sample_rate, 0.05);

    let audio = generate_silence(sample_rate, 2.0);
    for frame in audio.chunks(320) {
        assert!(detector.feed(frame).is_none());
    }
    assert!(!detector.in_phrase());
    assert!(detector.flush().is_none());
}

#[test]
fn test_keyword_set_choice_maps_to_sets() {
    let bilingual = KeywordSet::bilingual();
    let english = KeywordSet::english();

    assert!(bilingual.len() > english.len());
    assert!(english.first_match("saidia").is_none());
    assert!(bilingual.first_match("saidia").is_some());
}

//! Distress-Keyword Voice Monitor CLI

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use sauti_guard::{
    AudioCapture, Config, ConsoleAlertSink, KeywordSet, KeywordSetChoice, Monitor,
    TranscribeClient,
};

/// Distress-Keyword Voice Monitor
#[derive(Parser)]
#[command(name = "sauti-guard")]
#[command(about = "Monitors microphone audio for distress keywords", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring for distress keywords
    Run {
        /// Audio input device name (uses default if not specified)
        #[arg(short, long)]
        device: Option<String>,

        /// Transcription endpoint URL
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Transcription model identifier
        #[arg(short, long)]
        model: Option<String>,

        /// Language hint for the service (e.g. en, sw)
        #[arg(short, long)]
        language: Option<String>,

        /// Keyword set (bilingual, english)
        #[arg(short, long)]
        keywords: Option<String>,
    },

    /// List available audio input devices
    Devices,

    /// Record audio to a WAV file (for testing)
    Record {
        /// Output WAV file path
        #[arg(short, long, default_value = "recording.wav")]
        output: PathBuf,

        /// Recording duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u32,

        /// Audio input device name
        #[arg(short = 'D', long)]
        device: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging - quiet by default, use -v for more
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    // Load configuration
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Run {
            device,
            endpoint,
            model,
            language,
            keywords,
        } => {
            // Apply CLI overrides
            if let Some(device) = device {
                config.audio.device = Some(device);
            }
            if let Some(endpoint) = endpoint {
                config.transcription.endpoint = endpoint;
            }
            if let Some(model) = model {
                config.transcription.model = model;
            }
            if let Some(language) = language {
                config.transcription.language = Some(language);
            }
            if let Some(keywords) = keywords {
                config.keywords.set = match keywords.as_str() {
                    "english" => KeywordSetChoice::English,
                    _ => KeywordSetChoice::Bilingual,
                };
            }

            run_monitor(config)
        }
        Commands::Devices => list_devices(),
        Commands::Record {
            output,
            duration,
            device,
        } => {
            if let Some(device) = device {
                config.audio.device = Some(device);
            }
            record_audio(config, output, duration)
        }
    }
}

/// Run the monitor loop until the process is interrupted
fn run_monitor(config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let keywords = match config.keywords.set {
        KeywordSetChoice::Bilingual => KeywordSet::bilingual(),
        KeywordSetChoice::English => KeywordSet::english(),
    };

    // A key is optional: local OpenAI-compatible servers run without one
    let api_key = std::env::var("OPENAI_API_KEY").ok();
    if api_key.is_none() {
        info!("No OPENAI_API_KEY set; sending requests without Authorization header");
    }

    let client = TranscribeClient::new(config.transcription.clone(), api_key);
    let mut monitor = Monitor::new(config, keywords, client, ConsoleAlertSink);

    monitor.run()?;
    Ok(())
}

/// List available audio input devices
fn list_devices() -> Result<()> {
    let devices = AudioCapture::list_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found");
    } else {
        println!("Available audio input devices:");
        for (i, name) in devices.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }

    Ok(())
}

/// Record audio to a WAV file
fn record_audio(config: Config, output_path: PathBuf, duration_secs: u32) -> Result<()> {
    info!("Recording audio to: {}", output_path.display());

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut capture = AudioCapture::open(config.audio)?;
    let sample_rate = capture.actual_sample_rate();
    let mut samples: Vec<f32> = Vec::new();
    let target_samples = (sample_rate * duration_secs) as usize;

    capture.start()?;

    println!(
        "Recording for {} seconds... Press Ctrl+C to stop early",
        duration_secs
    );

    while running.load(Ordering::SeqCst) && samples.len() < target_samples {
        if let Some(chunk) = capture.receive_timeout(Duration::from_millis(100)) {
            samples.extend(chunk);
        }

        // Progress indicator
        let elapsed = samples.len() as f32 / sample_rate as f32;
        print!("\rRecording: {:.1}s / {}s", elapsed, duration_secs);
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }
    println!();

    capture.stop();

    // Write WAV file
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer =
        hound::WavWriter::create(&output_path, spec).context("Failed to create WAV file")?;

    for sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    println!("Recording saved to: {}", output_path.display());

    Ok(())
}

//! Audio capture module using cpal
//!
//! Capture handles are scoped: the monitor opens one per iteration and
//! releases it (via `Drop`) before the next, so the device is never held
//! across iterations.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, SampleRate, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::AudioConfig;
use crate::error::{AudioError, Result};

/// Audio sample type alias
pub type AudioSample = f32;

/// Scoped handle to an audio input device
pub struct AudioCapture {
    config: AudioConfig,
    device: Device,
    stream: Option<Stream>,
    sample_sender: Sender<Vec<AudioSample>>,
    sample_receiver: Receiver<Vec<AudioSample>>,
    is_running: Arc<AtomicBool>,
    actual_sample_rate: u32,
}

impl AudioCapture {
    /// Open the configured (or default) input device and resolve a stream
    /// configuration for it. The stream is not started yet.
    pub fn open(config: AudioConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = if let Some(ref device_name) = config.device {
            find_device_by_name(&host, device_name)?
        } else {
            host.default_input_device()
                .ok_or(AudioError::NoInputDevice)?
        };

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        debug!("Using audio input device: {}", device_name);

        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        // Prefer the configured channel count; fall back to whatever the
        // device offers. Sample rate stays within the supported range.
        let mut best_config = None;
        for cfg in supported_configs {
            debug!(
                "Supported config: channels={}, sample_rate={:?}-{:?}",
                cfg.channels(),
                cfg.min_sample_rate(),
                cfg.max_sample_rate()
            );

            if cfg.channels() == config.channels {
                let target_rate = SampleRate(config.sample_rate);
                if cfg.min_sample_rate() <= target_rate && target_rate <= cfg.max_sample_rate() {
                    best_config = Some(cfg.with_sample_rate(target_rate));
                } else {
                    best_config = Some(cfg.with_max_sample_rate());
                }
                break;
            }
            if best_config.is_none() {
                best_config = Some(cfg.with_max_sample_rate());
            }
        }

        let supported_config = best_config.ok_or_else(|| {
            AudioError::DeviceConfig("No suitable audio configuration found".to_string())
        })?;

        let actual_sample_rate = supported_config.sample_rate().0;
        debug!(
            "Audio config: {} channels @ {} Hz (target: {} Hz)",
            supported_config.channels(),
            actual_sample_rate,
            config.sample_rate
        );

        let (sender, receiver) = bounded(100); // Buffer up to 100 chunks

        Ok(Self {
            config,
            device,
            stream: None,
            sample_sender: sender,
            sample_receiver: receiver,
            is_running: Arc::new(AtomicBool::new(false)),
            actual_sample_rate,
        })
    }

    /// List available audio input device names
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Sample rate the device actually delivers
    pub fn actual_sample_rate(&self) -> u32 {
        self.actual_sample_rate
    }

    /// Start capturing audio
    pub fn start(&mut self) -> Result<()> {
        let config = StreamConfig {
            channels: self.config.channels,
            sample_rate: SampleRate(self.actual_sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.config.buffer_size),
        };

        let sender = self.sample_sender.clone();
        let is_running = self.is_running.clone();
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        return;
                    }

                    // Mix down to mono if stereo
                    let samples: Vec<f32> = if channels > 1 {
                        data.chunks(channels)
                            .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
                            .collect()
                    } else {
                        data.to_vec()
                    };

                    if sender.try_send(samples).is_err() {
                        warn!("Audio buffer overflow - dropping samples");
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        self.is_running.store(true, Ordering::Relaxed);
        self.stream = Some(stream);

        debug!("Audio capture started");
        Ok(())
    }

    /// Stop capturing audio
    pub fn stop(&mut self) {
        self.is_running.store(false, Ordering::Relaxed);
        self.stream = None;
        debug!("Audio capture stopped");
    }

    /// Check if capture is running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Try to receive audio samples (non-blocking)
    pub fn try_receive(&self) -> Option<Vec<AudioSample>> {
        self.sample_receiver.try_recv().ok()
    }

    /// Receive audio samples (blocking with timeout)
    pub fn receive_timeout(&self, timeout: std::time::Duration) -> Option<Vec<AudioSample>> {
        self.sample_receiver.recv_timeout(timeout).ok()
    }

    /// Drop any samples buffered so far
    pub fn drain(&self) {
        while self.sample_receiver.try_recv().is_ok() {}
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn find_device_by_name(host: &Host, name: &str) -> Result<Device> {
    let devices = host
        .input_devices()
        .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

    for device in devices {
        if let Ok(device_name) = device.name() {
            if device_name.contains(name) {
                info!("Matched input device: {}", device_name);
                return Ok(device);
            }
        }
    }

    Err(AudioError::DeviceNotFound(name.to_string()).into())
}

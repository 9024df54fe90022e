//! Audio output engine using cpal
//!
//! Manages the output device and stream for live contexts.

use crate::{GraphError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;

/// Audio output engine
pub struct AudioEngine {
    device: Device,
    config: StreamConfig,
    /// Output stream (when active)
    stream: Mutex<Option<Stream>>,
    sample_rate: u32,
}

impl AudioEngine {
    /// Open the default output device, requesting an interleaved stereo
    /// stream at the device's native rate.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| GraphError::Device("no output device available".to_string()))?;

        let default = device
            .default_output_config()
            .map_err(|e| GraphError::Device(format!("failed to get default config: {e}")))?;

        let sample_rate = default.sample_rate().0;
        let mut config: StreamConfig = default.into();
        config.channels = 2;

        Ok(AudioEngine {
            device,
            config,
            stream: Mutex::new(None),
            sample_rate,
        })
    }

    /// Sample rate of the output device in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Start the output stream; `callback` fills interleaved stereo blocks
    /// (L, R, L, R, ...).
    pub fn start<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| callback(data),
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| GraphError::Device(format!("failed to build stream: {e}")))?;

        stream
            .play()
            .map_err(|e| GraphError::Device(format!("failed to start stream: {e}")))?;

        *self.stream.lock() = Some(stream);

        Ok(())
    }

    /// Pause and drop the output stream.
    pub fn stop(&self) -> Result<()> {
        if let Some(stream) = self.stream.lock().take() {
            stream
                .pause()
                .map_err(|e| GraphError::Device(format!("failed to stop stream: {e}")))?;
        }
        Ok(())
    }

    /// Whether the output stream is running.
    pub fn is_running(&self) -> bool {
        self.stream.lock().is_some()
    }
}

//! Decoded PCM audio data

use std::sync::Arc;

/// Decoded audio data: interleaved `f32` samples plus the format needed to
/// play them back. Cloning is cheap; the sample data is shared.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    data: Arc<Vec<f32>>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Wrap interleaved samples. A channel count of zero is treated as mono.
    pub fn from_interleaved(data: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        AudioBuffer {
            data: Arc::new(data),
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (1 = mono, 2 = stereo).
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved sample data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.data.len() / self.channels as usize
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}
